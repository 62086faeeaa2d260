// crates/cf_solver/src/geometry.rs

//! 界面几何引擎
//!
//! 由切割单元的体积分数与周围面开度分数重构单元内固液界面的
//! 线性（二维）近似：法向、偏移、界面长度与质心。
//!
//! # 坐标约定
//!
//! 所有重构在单元局部坐标进行：单元为 $[-1/2, 1/2]^2$，
//! 界面为直线 $\vec{m} \cdot \vec{x} = \alpha$，其中 $\vec{m}$
//! 按 L1 范数归一化（$|m_x| + |m_y| = 1$）。长度与质心为相对量，
//! 物理量需乘以 $\Delta^{d-1}$ 或 $\Delta$。
//!
//! # 退化处理
//!
//! 完全流体/固体单元返回零面积的退化结果；调用方应先检查
//! `0 < cs < 1`。几何退化一律降阶处理，绝不报错。

use cf_foundation::float::clamp01;
use cf_grid::{CellField, FaceVector};
use glam::DVec2;

/// 近轴向法向的退化阈值
const NEAR_AXIS: f64 = 1e-4;

/// 切割单元界面几何
#[derive(Debug, Clone, Copy)]
pub struct InterfaceGeometry {
    /// 单位法向（L2 归一化，指向固体一侧）
    pub normal: DVec2,
    /// L1 归一化法向（重构坐标）
    pub m: DVec2,
    /// 界面偏移：$\vec{m} \cdot \vec{x} = \alpha$
    pub alpha: f64,
    /// 界面长度（相对单元尺寸）
    pub area: f64,
    /// 界面质心（单元局部坐标）
    pub centroid: DVec2,
}

impl InterfaceGeometry {
    /// 退化（零面积）结果
    pub const EMPTY: Self = Self {
        normal: DVec2::ZERO,
        m: DVec2::ZERO,
        alpha: 0.0,
        area: 0.0,
        centroid: DVec2::ZERO,
    };
}

/// 由面开度分数差分估计界面法向（L1 归一化）
///
/// 各轴取两侧面开度之差；全部为零时（面分数信息缺失）退化为
/// 各向同性法向 `1/DIM`。
pub fn facet_normal(fs: &FaceVector, i: i32, j: i32) -> DVec2 {
    let nx = fs.x.get(i, j) - fs.x.get(i + 1, j);
    let ny = fs.y.get(i, j) - fs.y.get(i, j + 1);
    let nn = nx.abs() + ny.abs();
    if nn > 0.0 {
        DVec2::new(nx / nn, ny / nn)
    } else {
        DVec2::splat(0.5)
    }
}

/// 线重构原语：由体积分数与 L1 法向求界面偏移 alpha
///
/// 半平面 $\vec{m} \cdot \vec{x} \le \alpha$ 与单元的交集面积
/// 等于 `c`。
pub fn line_alpha(c: f64, m: DVec2) -> f64 {
    let mut n1 = m.x.abs();
    let mut n2 = m.y.abs();
    if n1 > n2 {
        std::mem::swap(&mut n1, &mut n2);
    }
    let c = clamp01(c);
    let v1 = n1 / 2.0;

    let mut alpha = if c <= v1 / n2 {
        (2.0 * c * n1 * n2).sqrt()
    } else if c <= 1.0 - v1 / n2 {
        c * n2 + v1
    } else {
        n1 + n2 - (2.0 * n1 * n2 * (1.0 - c)).sqrt()
    };

    if m.x < 0.0 {
        alpha += m.x;
    }
    if m.y < 0.0 {
        alpha += m.y;
    }
    alpha - (m.x + m.y) / 2.0
}

/// 线重构原语：界面线段的长度与质心
///
/// 输入为 L1 归一化法向与 [`line_alpha`] 给出的偏移；
/// 返回 (长度, 质心)，质心在单元局部坐标 $[-1/2, 1/2]^2$。
/// 界面不与单元相交时返回零。
pub fn line_length_center(m: DVec2, alpha: f64) -> (f64, DVec2) {
    // 平移到 [0,1]^2 坐标，法向取正（负分量镜像）
    let mut n = m;
    let mut alpha = alpha + (m.x + m.y) / 2.0;
    if n.x < 0.0 {
        alpha -= n.x;
        n.x = -n.x;
    }
    if n.y < 0.0 {
        alpha -= n.y;
        n.y = -n.y;
    }

    if alpha <= 0.0 || alpha >= n.x + n.y {
        return (0.0, DVec2::ZERO);
    }

    // 近轴向退化：界面几乎平行于某条轴
    if n.x < NEAR_AXIS {
        let mut y = alpha / n.y;
        if m.y < 0.0 {
            y = 1.0 - y;
        }
        return (1.0, DVec2::new(0.0, y - 0.5));
    }
    if n.y < NEAR_AXIS {
        let mut x = alpha / n.x;
        if m.x < 0.0 {
            x = 1.0 - x;
        }
        return (1.0, DVec2::new(x - 0.5, 0.0));
    }

    // 与单位正方形边界的两个交点
    let a = if alpha >= n.x {
        DVec2::new(1.0, (alpha - n.x) / n.y)
    } else {
        DVec2::new(alpha / n.x, 0.0)
    };
    let b = if alpha >= n.y {
        DVec2::new((alpha - n.y) / n.x, 1.0)
    } else {
        DVec2::new(0.0, alpha / n.y)
    };

    let length = (a - b).length();
    let mut center = 0.5 * (a + b);
    if m.x < 0.0 {
        center.x = 1.0 - center.x;
    }
    if m.y < 0.0 {
        center.y = 1.0 - center.y;
    }
    (length, center - DVec2::splat(0.5))
}

/// 组装切割单元的完整界面几何
///
/// 法向估计（面分数差分）→ 线重构（alpha、长度、质心）→
/// 法向 L2 归一化。非切割单元返回 [`InterfaceGeometry::EMPTY`]。
pub fn embed_geometry(cs: &CellField, fs: &FaceVector, i: i32, j: i32) -> InterfaceGeometry {
    let c = cs.get(i, j);
    if c <= 0.0 || c >= 1.0 {
        return InterfaceGeometry::EMPTY;
    }
    let m = facet_normal(fs, i, j);
    let alpha = line_alpha(c, m);
    let (area, centroid) = line_length_center(m, alpha);
    let len = m.length();
    let normal = if len > 0.0 { m / len } else { m };
    InterfaceGeometry {
        normal,
        m,
        alpha,
        area,
        centroid,
    }
}

/// 在界面点处双线性插值单元中心场
///
/// `p` 为单元局部坐标的插值点。对角邻居落在固体内时退化为
/// 逐轴的单侧线性外插。
pub fn embed_interpolate(cs: &CellField, s: &CellField, i: i32, j: i32, p: DVec2) -> f64 {
    let si = cf_foundation::float::isign(p.x);
    let sj = cf_foundation::float::isign(p.y);
    let fx = p.x.abs();
    let fy = p.y.abs();

    if cs.get(i + si, j) != 0.0 && cs.get(i, j + sj) != 0.0 && cs.get(i + si, j + sj) != 0.0 {
        // 完整的双线性模板
        (s.get(i, j) * (1.0 - fx) + s.get(i + si, j) * fx) * (1.0 - fy)
            + (s.get(i, j + sj) * (1.0 - fx) + s.get(i + si, j + sj) * fx) * fy
    } else {
        // 退化：逐轴单侧估计
        let mut val = s.get(i, j);
        if cs.get(i + si, j) != 0.0 {
            val += fx * (s.get(i + si, j) - s.get(i, j));
        } else if cs.get(i - si, j) != 0.0 {
            val += fx * (s.get(i, j) - s.get(i - si, j));
        }
        if cs.get(i, j + sj) != 0.0 {
            val += fy * (s.get(i, j + sj) - s.get(i, j));
        } else if cs.get(i, j - sj) != 0.0 {
            val += fy * (s.get(i, j) - s.get(i, j - sj));
        }
        val
    }
}
