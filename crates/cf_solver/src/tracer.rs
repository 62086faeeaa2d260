// crates/cf_solver/src/tracer.rs

//! 切割单元守恒输运更新
//!
//! 小体积切割单元（$c_s \ll 1$）的显式通量更新受局部 CFL 限制：
//! 全局时间步对它们可能超限并产生过冲。[`update_tracer`] 采用
//! 两遍策略：
//!
//! 1. 每个切割单元按自身稳定的最大子步更新，超出部分折算为
//!    "过剩量"暂存
//! 2. 过剩量按 $c_m^2$ 权重守恒地再分配到 3x3 邻域
//!
//! 全程保持离散守恒量 $\sum f \cdot c_m$ 不变（度量场恒等
//! $c_m = c_s$；域边界单元的再分配要求虚单元分数为零，
//! 即域外视为固体，否则权重会落到域外）。

use crate::fields::EmbedFields;
use cf_foundation::float::{safe_div, SEPS};
use cf_grid::{Axis, CellField, FaceVector};

/// 切割单元感知的示踪剂通量更新
///
/// `flux` 为各面上的对流通量（已含面开度权），`uf` 为面法向
/// 体积通量（用于局部 CFL 估计）。`f` 的内部区域被就地更新；
/// 虚单元不变，调用方在更新后负责重填。
pub fn update_tracer(
    ef: &EmbedFields,
    f: &mut CellField,
    uf: &FaceVector,
    flux: &FaceVector,
    dt: f64,
    delta: f64,
) {
    let (mx, my) = f.dims();
    let (mx, my) = (mx as i32, my as i32);

    // 过剩量场（虚单元为零，3x3 汇聚时直接可读）
    let mut e = CellField::zeros(mx as usize, my as usize);

    // 第一遍：逐单元按局部稳定性更新
    for j in 0..my {
        for i in 0..mx {
            let c = ef.cs.get(i, j);
            if c <= 0.0 {
                continue;
            }

            let mut div = 0.0;
            for axis in Axis::ALL {
                div += flux.along(axis, i, j, 0, 0) - flux.along(axis, i, j, 1, 0);
            }

            if c >= 1.0 {
                f.add(i, j, dt * div / delta);
                continue;
            }

            // 切割单元：局部最大稳定子步
            let mut umax: f64 = 0.0;
            for axis in Axis::ALL {
                umax = umax
                    .max(uf.along(axis, i, j, 0, 0).abs())
                    .max(uf.along(axis, i, j, 1, 0).abs());
            }
            let cm = c;
            let dtmax = delta * cm / (umax + SEPS);
            let rate = safe_div(div, delta * cm);
            if dt <= dtmax {
                f.add(i, j, dt * rate);
            } else {
                f.add(i, j, dtmax * rate);
                // 剩余质量折算为过剩量，按 cm^2 归一
                let mut scs = 0.0;
                for dj in -1..=1 {
                    for di in -1..=1 {
                        let cn = ef.cs.get(i + di, j + dj);
                        scs += cn * cn;
                    }
                }
                e.set(i, j, safe_div((dt - dtmax) * rate * cm, scs));
            }
        }
    }

    // 第二遍：3x3 邻域守恒再分配
    for j in 0..my {
        for i in 0..mx {
            let c = ef.cs.get(i, j);
            if c <= 0.0 {
                continue;
            }
            let mut se = 0.0;
            for dj in -1..=1 {
                for di in -1..=1 {
                    se += e.get(i + di, j + dj);
                }
            }
            if se != 0.0 {
                f.add(i, j, c * se);
            }
        }
    }
}
