// crates/cf_solver/src/viscosity.rs

//! 隐式粘性求解
//!
//! 对每个速度分量解
//!
//! $$ \frac{\rho c_m}{\Delta t}(u - r) = \nabla \cdot (\mu \nabla u) - F_{embed}(u) $$
//!
//! 其中 `r` 为进入粘性步前的速度，$\mu$ 为已含面开度权的面
//! 粘性系数，$F_{embed}$ 为嵌入界面的 `(val, coef)` 通量对
//! （见 [`embed_flux`]）：`val` 进右端项、`coef` 进对角元，
//! 使无滑移条件隐式耦合进线性系统。
//!
//! 多重网格实现作为协作者注入（[`ViscositySolver`]）；
//! [`JacobiViscosity`] 为参考实现。

use crate::boundary::EmbedBc;
use crate::fields::EmbedFields;
use crate::flux::embed_flux;
use crate::project::SolveStats;
use cf_grid::{Axis, CellField, FaceVector, Grid, VectorField};
use serde::{Deserialize, Serialize};

/// 隐式粘性协作者接口
pub trait ViscositySolver {
    /// 就地解粘性隐式系统
    ///
    /// `bc` 为各分量在嵌入界面上的条件（无滑移壁面为
    /// 齐次 Dirichlet 对）。
    #[allow(clippy::too_many_arguments)]
    fn viscosity(
        &mut self,
        ef: &EmbedFields,
        u: &mut VectorField,
        mu: &FaceVector,
        rho: &CellField,
        dt: f64,
        bc: [EmbedBc; 2],
        grid: &Grid,
    ) -> SolveStats;
}

/// Jacobi 松弛参考实现
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JacobiViscosity {
    /// 残差容差（最大范数）
    pub tolerance: f64,
    /// 迭代上限
    pub max_iterations: usize,
}

impl Default for JacobiViscosity {
    fn default() -> Self {
        Self {
            tolerance: cf_foundation::float::DEFAULT_TOLERANCE,
            max_iterations: cf_foundation::float::DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl JacobiViscosity {
    /// 单分量残差最大范数
    #[allow(clippy::too_many_arguments)]
    fn residual_norm(
        &self,
        ef: &EmbedFields,
        s: &CellField,
        r: &CellField,
        mu: &FaceVector,
        rho: &CellField,
        dt: f64,
        bc: EmbedBc,
        grid: &Grid,
    ) -> f64 {
        let (mx, my) = s.dims();
        let d2 = grid.delta * grid.delta;
        let mut norm: f64 = 0.0;
        for j in 0..my as i32 {
            for i in 0..mx as i32 {
                let c = ef.cs.get(i, j);
                if c <= 0.0 {
                    continue;
                }
                let mut lap = 0.0;
                for axis in Axis::ALL {
                    let m0 = mu.along(axis, i, j, 0, 0);
                    let m1 = mu.along(axis, i, j, 1, 0);
                    lap += m1 * (s.at(axis, i, j, 1, 0) - s.get(i, j))
                        - m0 * (s.get(i, j) - s.at(axis, i, j, -1, 0));
                }
                let (val, coef) = embed_flux(ef, s, mu, ef.fs, i, j, bc, grid.delta);
                let res = rho.get(i, j) * c / dt * (s.get(i, j) - r.get(i, j)) - lap / d2
                    + (val + coef * s.get(i, j));
                norm = norm.max(res.abs());
            }
        }
        norm
    }

    /// 单分量 Jacobi 扫描
    #[allow(clippy::too_many_arguments)]
    fn sweep(
        &self,
        ef: &EmbedFields,
        s: &mut CellField,
        r: &CellField,
        mu: &FaceVector,
        rho: &CellField,
        dt: f64,
        bc: EmbedBc,
        grid: &Grid,
    ) {
        let (mx, my) = s.dims();
        let d2 = grid.delta * grid.delta;
        let old = s.clone();
        for j in 0..my as i32 {
            for i in 0..mx as i32 {
                let c = ef.cs.get(i, j);
                if c <= 0.0 {
                    // 固体单元无速度自由度
                    s.set(i, j, 0.0);
                    continue;
                }
                let lambda = rho.get(i, j) * c / dt * d2;
                let mut num = lambda * r.get(i, j);
                let mut diag = lambda;
                for axis in Axis::ALL {
                    let m0 = mu.along(axis, i, j, 0, 0);
                    let m1 = mu.along(axis, i, j, 1, 0);
                    num += m1 * old.at(axis, i, j, 1, 0) + m0 * old.at(axis, i, j, -1, 0);
                    diag += m0 + m1;
                }
                let (val, coef) = embed_flux(ef, &old, mu, ef.fs, i, j, bc, grid.delta);
                num -= val * d2;
                diag += coef * d2;
                s.set(i, j, num / diag);
            }
        }
        s.fill_ghosts_symmetric();
    }
}

impl ViscositySolver for JacobiViscosity {
    fn viscosity(
        &mut self,
        ef: &EmbedFields,
        u: &mut VectorField,
        mu: &FaceVector,
        rho: &CellField,
        dt: f64,
        bc: [EmbedBc; 2],
        grid: &Grid,
    ) -> SolveStats {
        let mut residual_before: f64 = 0.0;
        let mut residual_after: f64 = 0.0;
        let mut iterations = 0;

        for axis in Axis::ALL {
            let s = u.comp_mut(axis);
            s.fill_ghosts_symmetric();
            let r = s.clone();
            let cbc = bc[axis.index()];
            let before = self.residual_norm(ef, s, &r, mu, rho, dt, cbc, grid);
            residual_before = residual_before.max(before);
            let mut after = before;
            let mut it = 0;
            while after > self.tolerance && it < self.max_iterations {
                self.sweep(ef, s, &r, mu, rho, dt, cbc, grid);
                after = self.residual_norm(ef, s, &r, mu, rho, dt, cbc, grid);
                it += 1;
            }
            residual_after = residual_after.max(after);
            iterations = iterations.max(it);
        }

        let converged = residual_after <= self.tolerance;
        if !converged {
            log::warn!(
                "粘性求解未收敛: {} 次迭代后残差 {:.3e} (容差 {:.3e})",
                iterations,
                residual_after,
                self.tolerance
            );
        }
        SolveStats {
            iterations,
            residual_before,
            residual_after,
            converged,
        }
    }
}
