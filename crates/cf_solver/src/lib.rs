// crates/cf_solver/src/lib.rs

//! CutFlow 求解核心
//!
//! 在规则结构网格上以"切割单元"方式嵌入任意固体边界的
//! 不可压缩流求解核心，由两部分组成：
//!
//! 1. **界面几何/通量引擎**: 由体积分数与面开度分数重构界面
//!    几何（[`geometry`]），提供切割面感知的插值（[`interp`]）、
//!    分数一致性清理（[`cleanup`]）、界面边界条件与法向梯度
//!    （[`boundary`]）、界面扩散通量与合力诊断（[`flux`]）、
//!    小单元守恒输运（[`tracer`]、[`advection`]）
//! 2. **分步投影管线**: 预测-投影-修正的时间积分
//!    （[`pipeline`]），压力投影（[`project`]）与隐式粘性
//!    （[`viscosity`]）作为可替换协作者注入
//!
//! # 约定
//!
//! - 分数约定：`cs = 1` 全流体、`cs = 0` 全固体；面开度同向
//! - 界面法向指向固体一侧
//! - 全部归约按固定行序折叠，结果与线程数无关

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod advection;
pub mod boundary;
pub mod cleanup;
pub mod fields;
pub mod flux;
pub mod geometry;
pub mod interp;
pub mod pipeline;
pub mod project;
pub mod tracer;
pub mod viscosity;

pub use advection::{advect, tracer_fluxes};
pub use boundary::{dirichlet_gradient, embed_gradient, EmbedBc};
pub use cleanup::fractions_cleanup;
pub use fields::{EmbedFields, FieldMeta};
pub use flux::{embed_flux, embed_force, embed_vorticity, FluxScheme, Upwind};
pub use geometry::{
    embed_geometry, embed_interpolate, facet_normal, line_alpha, line_length_center,
    InterfaceGeometry,
};
pub use interp::{center_gradient, face_gradient, face_value};
pub use pipeline::centered::Simulation;
pub use pipeline::schedule::{Phase, Scheduler};
pub use pipeline::SolverParams;
pub use project::{ProjectionSolver, RelaxProjection, SolveStats};
pub use tracer::update_tracer;
pub use viscosity::{JacobiViscosity, ViscositySolver};
