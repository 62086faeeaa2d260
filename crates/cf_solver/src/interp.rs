// crates/cf_solver/src/interp.rs

//! 切割面插值算子
//!
//! 面梯度/面值的标准两点公式在切割面附近会跨过固体，
//! 需要沿横向偏转模板。本模块提供：
//!
//! - [`face_gradient`] / [`face_value`]: 带切割面修正的调度入口
//! - [`center_gradient`]: 单元中心梯度（按面开度降阶）
//!
//! # 横向偏转
//!
//! 当面开度 $0 < f_s < 1$ 时，以界面占比 $f_s$ 在
//! 正对模板与横向偏移模板之间线性加权。横向方向取面两侧
//! 横向开度差的符号，偏向流体更开的一侧。被固体阻断的
//! 横向模板退回标准两点公式。

use crate::fields::{EmbedFields, FieldMeta};
use cf_foundation::float::isign;
use cf_grid::{Axis, CellField};

/// 体积分数加权的两单元平均
///
/// 对固体一侧衰减的场（速度等），简单算术平均会偏向固体值；
/// 以 `1.5 + cs` 为权做加权平均。
#[inline]
fn cs_avg(cs: &CellField, s: &CellField, axis: Axis, i: i32, j: i32, l: i32, t: i32) -> f64 {
    let c0 = cs.at(axis, i, j, l, t);
    let c1 = cs.at(axis, i, j, l - 1, t);
    (s.at(axis, i, j, l, t) * (1.5 + c0) + s.at(axis, i, j, l - 1, t) * (1.5 + c1))
        / (c0 + c1 + 3.0)
}

/// 横向偏移模板是否可用
///
/// 偏移面本身要足够开（> 1/2），且连接两排模板的横向面与
/// 两侧单元均不为固体。
fn face_condition(ef: &EmbedFields, axis: Axis, i: i32, j: i32, t: i32) -> bool {
    let ts = if t < 0 { t + 1 } else { t };
    ef.fs.along(axis, i, j, 0, t) > 0.5
        && ef.fs.transverse(axis, i, j, 0, ts) != 0.0
        && ef.fs.transverse(axis, i, j, -1, ts) != 0.0
        && ef.cs.at(axis, i, j, 0, t) != 0.0
        && ef.cs.at(axis, i, j, -1, t) != 0.0
}

/// 切割面梯度：横向加权的两点差分
fn embed_face_gradient(
    ef: &EmbedFields,
    s: &CellField,
    axis: Axis,
    i: i32,
    j: i32,
    delta: f64,
) -> f64 {
    let f = ef.fs.along(axis, i, j, 0, 0);
    let t = isign(ef.fs.along(axis, i, j, 0, 1) - ef.fs.along(axis, i, j, 0, -1));
    if face_condition(ef, axis, i, j, t) {
        ((1.0 + f) * (s.at(axis, i, j, 0, 0) - s.at(axis, i, j, -1, 0))
            + (1.0 - f) * (s.at(axis, i, j, 0, t) - s.at(axis, i, j, -1, t)))
            / (2.0 * delta)
    } else {
        (s.at(axis, i, j, 0, 0) - s.at(axis, i, j, -1, 0)) / delta
    }
}

/// 切割面值：横向加权的分数平均
fn embed_face_value(ef: &EmbedFields, s: &CellField, axis: Axis, i: i32, j: i32) -> f64 {
    let f = ef.fs.along(axis, i, j, 0, 0);
    let t = isign(ef.fs.along(axis, i, j, 0, 1) - ef.fs.along(axis, i, j, 0, -1));
    if face_condition(ef, axis, i, j, t) {
        ((1.0 + f) * cs_avg(ef.cs, s, axis, i, j, 0, 0)
            + (1.0 - f) * cs_avg(ef.cs, s, axis, i, j, 0, t))
            / 2.0
    } else {
        cs_avg(ef.cs, s, axis, i, j, 0, 0)
    }
}

/// 面 `(axis, i, j)` 处的法向梯度
///
/// 面完整或场未启用切割面修正时为标准两点差分。
/// 面索引约定同 [`cf_grid::FaceVector`]：`(i, j)` 为单元
/// `(i, j)` 的负向面。
pub fn face_gradient(
    ef: &EmbedFields,
    s: &CellField,
    meta: &FieldMeta,
    axis: Axis,
    i: i32,
    j: i32,
    delta: f64,
) -> f64 {
    let f = ef.fs.along(axis, i, j, 0, 0);
    if meta.third && f > 0.0 && f < 1.0 {
        embed_face_gradient(ef, s, axis, i, j, delta)
    } else {
        (s.at(axis, i, j, 0, 0) - s.at(axis, i, j, -1, 0)) / delta
    }
}

/// 面 `(axis, i, j)` 处的插值场值
pub fn face_value(
    ef: &EmbedFields,
    s: &CellField,
    meta: &FieldMeta,
    axis: Axis,
    i: i32,
    j: i32,
) -> f64 {
    let f = ef.fs.along(axis, i, j, 0, 0);
    if meta.third && f > 0.0 && f < 1.0 {
        embed_face_value(ef, s, axis, i, j)
    } else {
        cs_avg(ef.cs, s, axis, i, j, 0, 0)
    }
}

/// 单元中心梯度（按面开度降阶）
///
/// 两侧面都开：中心差分；仅一侧开：单侧差分；全封闭：零。
pub fn center_gradient(
    ef: &EmbedFields,
    s: &CellField,
    axis: Axis,
    i: i32,
    j: i32,
    delta: f64,
) -> f64 {
    let f0 = ef.fs.along(axis, i, j, 0, 0);
    let f1 = ef.fs.along(axis, i, j, 1, 0);
    if f0 != 0.0 && f1 != 0.0 {
        (s.at(axis, i, j, 1, 0) - s.at(axis, i, j, -1, 0)) / (2.0 * delta)
    } else if f1 != 0.0 {
        (s.at(axis, i, j, 1, 0) - s.at(axis, i, j, 0, 0)) / delta
    } else if f0 != 0.0 {
        (s.at(axis, i, j, 0, 0) - s.at(axis, i, j, -1, 0)) / delta
    } else {
        0.0
    }
}
