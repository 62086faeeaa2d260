// crates/cf_grid/src/lib.rs

//! CutFlow 网格层
//!
//! 提供嵌入边界求解核心所消费的"场/网格接口"：
//!
//! - [`grid`]: 均匀二维结构网格（带 2 层虚单元）
//! - [`field`]: 单元中心标量场、面交错标量场、矢量场，
//!   以及整型偏移的模板访问
//!
//! # 设计原则
//!
//! 1. **地址不外泄**: 所有访问经过 (i, j) 逻辑索引，
//!    存储可在步间整体替换而不影响调用方
//! 2. **确定性归约**: 归约按行序折叠部分和，
//!    并行分解不改变结果
//! 3. **矢量场 = 独立标量场元组**: 各分量独立持有，无别名风险

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod grid;

pub use field::{off, Axis, CellField, FaceVector, VectorField};
pub use grid::{Grid, DIM, NG};
