// crates/cf_solver/src/advection.rs

//! 单元中心场的对流更新
//!
//! 把 [`FluxScheme`] 给出的面通量组装成完整的面通量场，
//! 经 [`update_tracer`] 做切割单元感知的守恒更新。
//! 速度分量与示踪剂共用此入口。
//!
//! 源项 `src` 只交给通量格式的半步面值外推（动量方程传
//! 压力梯度场），不在这里叠加到单元：分步法里单元中心的
//! `dt * g` 更新由投影后的速度修正统一施加一次。

use crate::fields::{EmbedFields, FieldMeta};
use crate::flux::FluxScheme;
use crate::tracer::update_tracer;
use cf_grid::{Axis, CellField, FaceVector, Grid};

/// 计算场 `s` 在所有面上的对流通量
#[allow(clippy::too_many_arguments)]
pub fn tracer_fluxes(
    ef: &EmbedFields,
    uf: &FaceVector,
    s: &CellField,
    meta: &FieldMeta,
    scheme: &dyn FluxScheme,
    src: Option<&CellField>,
    dt: f64,
    grid: &Grid,
) -> FaceVector {
    let mut flux = FaceVector::zeros(grid);
    for axis in Axis::ALL {
        let f = flux.comp_mut(axis);
        let (fmx, fmy) = f.dims();
        for j in 0..fmy as i32 {
            for i in 0..fmx as i32 {
                // 面的存储索引直接作为基点，轴向旋转由 off 处理
                let v = scheme.face_flux(ef, uf, s, meta, src, axis, i, j, dt, grid.delta);
                f.set(i, j, v);
            }
        }
    }
    flux
}

/// 对流更新：通量组装 + 守恒更新
#[allow(clippy::too_many_arguments)]
pub fn advect(
    ef: &EmbedFields,
    s: &mut CellField,
    meta: &FieldMeta,
    uf: &FaceVector,
    scheme: &dyn FluxScheme,
    dt: f64,
    grid: &Grid,
    src: Option<&CellField>,
) {
    let flux = tracer_fluxes(ef, uf, s, meta, scheme, src, dt, grid);
    update_tracer(ef, s, uf, &flux, dt, grid.delta);
}
