// crates/cf_solver/src/flux.rs

//! 通量算子
//!
//! - [`embed_flux`]: 切割单元经嵌入界面的扩散通量，
//!   供粘性求解与示踪剂扩散在各自的线性迭代里耦合
//! - [`FluxScheme`]: 面对流通量格式的协作者接口，
//!   附一阶迎风参考实现 [`Upwind`]

use crate::boundary::{dirichlet_gradient, EmbedBc};
use crate::fields::{EmbedFields, FieldMeta};
use crate::geometry::embed_geometry;
use cf_foundation::float::SEPS;
use cf_grid::{Axis, CellField, FaceVector};

/// 切割单元经嵌入界面的扩散通量
///
/// 返回 `(val, coef)`：界面对单元 `(i, j)` 演化的扩散贡献为
/// `-(val + coef * s[i, j])`，与面通量散度同量纲。迭代求解时
/// `val` 进右端项（`n -= val * Δ²`）、`coef` 进对角元
/// （`d += coef * Δ²`），两者合并后把单元值拉向界面条件。
///
/// 界面粘性系数取单元四个面上 `mu` 的平均，以面开度 `fm`
/// 的和归一。Dirichlet 条件经 [`dirichlet_gradient`] 重构
/// 法向梯度；Neumann 条件直接使用给定梯度。非切割单元与
/// 齐次 Neumann 返回零。
pub fn embed_flux(
    ef: &EmbedFields,
    s: &CellField,
    mu: &FaceVector,
    fm: &FaceVector,
    i: i32,
    j: i32,
    bc: EmbedBc,
    delta: f64,
) -> (f64, f64) {
    let c = ef.cs.get(i, j);
    if c <= 0.0 || c >= 1.0 {
        return (0.0, 0.0);
    }
    if bc == EmbedBc::ZERO_FLUX {
        return (0.0, 0.0);
    }

    let geom = embed_geometry(ef.cs, ef.fs, i, j);
    let area = geom.area;

    let (grad, coef) = match bc {
        EmbedBc::Dirichlet(value) => {
            dirichlet_gradient(ef, s, i, j, geom.normal, geom.centroid, value, delta)
        }
        EmbedBc::Neumann(amount) => (amount, 0.0),
    };

    let mut mua = 0.0;
    let mut fa = 0.0;
    for axis in Axis::ALL {
        mua += mu.along(axis, i, j, 0, 0) + mu.along(axis, i, j, 1, 0);
        fa += fm.along(axis, i, j, 0, 0) + fm.along(axis, i, j, 1, 0);
    }
    let w = mua / (fa + SEPS);

    (-w * grad * area / delta, -w * coef * area / delta)
}

/// 嵌入界面上的压力与粘性合力
///
/// 对所有切割单元累加界面片贡献（行序求和，结果确定）：
/// 压力力 $\int p \vec{n} \, dA$ 以质心插值的压力近似，
/// 粘性力由界面法向速度梯度的二维张量缩并给出。`n` 指向
/// 固体，得到的是流体作用在嵌入体上的力。
pub fn embed_force(
    ef: &EmbedFields,
    p: &CellField,
    u: &cf_grid::VectorField,
    mu: &FaceVector,
    fm: &FaceVector,
    bc: [EmbedBc; 2],
    grid: &cf_grid::Grid,
) -> (glam::DVec2, glam::DVec2) {
    let mut fp = glam::DVec2::ZERO;
    let mut fmu = glam::DVec2::ZERO;
    let (mx, my) = ef.cs.dims();
    for j in 0..my as i32 {
        for i in 0..mx as i32 {
            let c = ef.cs.get(i, j);
            if c <= 0.0 || c >= 1.0 {
                continue;
            }
            let geom = crate::geometry::embed_geometry(ef.cs, ef.fs, i, j);
            let area = geom.area * grid.delta;
            let n = geom.normal;

            let pn = area * crate::geometry::embed_interpolate(ef.cs, p, i, j, geom.centroid);
            fp += pn * n;

            let mut mua = 0.0;
            let mut fa = 0.0;
            for axis in Axis::ALL {
                mua += mu.along(axis, i, j, 0, 0) + mu.along(axis, i, j, 1, 0);
                fa += fm.along(axis, i, j, 0, 0) + fm.along(axis, i, j, 1, 0);
            }
            // 无粘时不做界面梯度重构
            if mua != 0.0 {
                let w = mua / (fa + SEPS);
                let dudn =
                    crate::boundary::embed_gradient(ef, u, i, j, n, geom.centroid, bc, grid.delta);
                fmu.x -= area * w * (dudn.x * (n.x * n.x + 1.0) + dudn.y * n.x * n.y);
                fmu.y -= area * w * (dudn.y * (n.y * n.y + 1.0) + dudn.x * n.x * n.y);
            }
        }
    }
    (fp, fmu)
}

/// 切割单元界面处的涡量
///
/// 由界面法向速度梯度的切向分量给出；非切割单元返回零。
pub fn embed_vorticity(
    ef: &EmbedFields,
    u: &cf_grid::VectorField,
    i: i32,
    j: i32,
    bc: [EmbedBc; 2],
    delta: f64,
) -> f64 {
    let c = ef.cs.get(i, j);
    if c <= 0.0 || c >= 1.0 {
        return 0.0;
    }
    let geom = crate::geometry::embed_geometry(ef.cs, ef.fs, i, j);
    let n = geom.normal;
    let dudn = crate::boundary::embed_gradient(ef, u, i, j, n, geom.centroid, bc, delta);
    dudn.y * n.x - dudn.x * n.y
}

/// 面对流通量格式
///
/// 给定面法向体积通量 `uf` 与被输运场 `s`，返回面
/// `(axis, i, j)` 上的对流通量 `uf * s_face`。面索引约定同
/// [`FaceVector`]。高阶格式（迎风外推、横向修正）作为协作者
/// 注入，参考实现为一阶迎风。
///
/// `src` 是被输运场的单元中心源项（动量方程传压力梯度场），
/// 只进入半时间层的面值外推（二阶格式以 `dt/4` 权重折入相邻
/// 两单元的源项），绝不直接叠加到单元值：单元中心的源项更新
/// 由时间积分器在投影后统一施加一次。
pub trait FluxScheme {
    /// 计算单个面上的对流通量
    #[allow(clippy::too_many_arguments)]
    fn face_flux(
        &self,
        ef: &EmbedFields,
        uf: &FaceVector,
        s: &CellField,
        meta: &FieldMeta,
        src: Option<&CellField>,
        axis: Axis,
        i: i32,
        j: i32,
        dt: f64,
        delta: f64,
    ) -> f64;
}

/// 一阶迎风通量
///
/// 不做半步面值重构，源项 `src` 对一阶面值无贡献。
#[derive(Debug, Clone, Copy, Default)]
pub struct Upwind;

impl FluxScheme for Upwind {
    fn face_flux(
        &self,
        _ef: &EmbedFields,
        uf: &FaceVector,
        s: &CellField,
        _meta: &FieldMeta,
        _src: Option<&CellField>,
        axis: Axis,
        i: i32,
        j: i32,
        _dt: f64,
        _delta: f64,
    ) -> f64 {
        let u = uf.along(axis, i, j, 0, 0);
        let sv = if u >= 0.0 {
            s.at(axis, i, j, -1, 0)
        } else {
            s.at(axis, i, j, 0, 0)
        };
        u * sv
    }
}
