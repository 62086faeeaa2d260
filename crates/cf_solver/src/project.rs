// crates/cf_solver/src/project.rs

//! 压力投影
//!
//! 分步法的核心约束步：由面速度的散度组装右端项，解变系数
//! Poisson 方程 $\nabla \cdot (\alpha \nabla p) = \nabla \cdot u_f / \Delta t$，
//! 再以面压力梯度修正面速度使其离散无散。
//!
//! 求解器是协作者：多重网格、PCG 等外部实现通过
//! [`ProjectionSolver`] 注入；[`RelaxProjection`] 是保证管线
//! 可运行的 Gauss-Seidel 参考实现。$\alpha$ 已含面开度权
//! （$\alpha = f_s / \rho$），封死面自然退出模板；对角元为零的
//! 孤立单元压力置零。

use crate::fields::EmbedFields;
use cf_grid::{Axis, CellField, FaceVector, Grid};
use serde::{Deserialize, Serialize};

/// 迭代求解统计
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolveStats {
    /// 实际迭代数
    pub iterations: usize,
    /// 迭代前残差（最大范数）
    pub residual_before: f64,
    /// 迭代后残差
    pub residual_after: f64,
    /// 是否达到容差
    pub converged: bool,
}

impl SolveStats {
    /// 零工作量的平凡统计
    pub fn trivial() -> Self {
        Self {
            iterations: 0,
            residual_before: 0.0,
            residual_after: 0.0,
            converged: true,
        }
    }
}

/// 压力投影协作者接口
pub trait ProjectionSolver {
    /// 投影面速度场：解压力并就地修正 `uf`
    ///
    /// `alpha` 为面比容（含开度权），`p` 既是初猜也是输出。
    fn project(
        &mut self,
        ef: &EmbedFields,
        uf: &mut FaceVector,
        p: &mut CellField,
        alpha: &FaceVector,
        dt: f64,
        grid: &Grid,
    ) -> SolveStats;
}

/// Gauss-Seidel 松弛参考实现
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxProjection {
    /// 残差容差（最大范数，除以 dt 前的散度量纲）
    pub tolerance: f64,
    /// 迭代上限
    pub max_iterations: usize,
}

impl Default for RelaxProjection {
    fn default() -> Self {
        Self {
            tolerance: cf_foundation::float::DEFAULT_TOLERANCE,
            max_iterations: cf_foundation::float::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// 面速度散度（除以 dt，即 Poisson 右端项）
fn divergence_rhs(uf: &FaceVector, dt: f64, grid: &Grid) -> CellField {
    let mut div = CellField::for_cells(grid);
    let delta = grid.delta;
    div.par_assign(|i, j| {
        let mut d = 0.0;
        for axis in Axis::ALL {
            d += uf.along(axis, i, j, 1, 0) - uf.along(axis, i, j, 0, 0);
        }
        d / (dt * delta)
    });
    div
}

/// 残差最大范数：`rhs - ∇·(alpha ∇p)`
fn residual_norm(p: &CellField, rhs: &CellField, alpha: &FaceVector, grid: &Grid) -> f64 {
    let (mx, my) = p.dims();
    let d2 = grid.delta * grid.delta;
    let mut norm: f64 = 0.0;
    for j in 0..my as i32 {
        for i in 0..mx as i32 {
            let mut lap = 0.0;
            let mut diag = 0.0;
            for axis in Axis::ALL {
                let a0 = alpha.along(axis, i, j, 0, 0);
                let a1 = alpha.along(axis, i, j, 1, 0);
                lap += a1 * p.at(axis, i, j, 1, 0) + a0 * p.at(axis, i, j, -1, 0);
                diag += a0 + a1;
            }
            if diag > 0.0 {
                let res = rhs.get(i, j) - (lap - diag * p.get(i, j)) / d2;
                norm = norm.max(res.abs());
            }
        }
    }
    norm
}

impl RelaxProjection {
    /// 求解 `∇·(alpha ∇p) = rhs`
    fn solve(
        &self,
        p: &mut CellField,
        rhs: &CellField,
        alpha: &FaceVector,
        grid: &Grid,
    ) -> SolveStats {
        let (mx, my) = p.dims();
        let d2 = grid.delta * grid.delta;

        p.fill_ghosts_symmetric();
        let residual_before = residual_norm(p, rhs, alpha, grid);
        let mut residual_after = residual_before;
        let mut iterations = 0;

        while residual_after > self.tolerance && iterations < self.max_iterations {
            for j in 0..my as i32 {
                for i in 0..mx as i32 {
                    let mut num = -rhs.get(i, j) * d2;
                    let mut diag = 0.0;
                    for axis in Axis::ALL {
                        let a0 = alpha.along(axis, i, j, 0, 0);
                        let a1 = alpha.along(axis, i, j, 1, 0);
                        num += a1 * p.at(axis, i, j, 1, 0) + a0 * p.at(axis, i, j, -1, 0);
                        diag += a0 + a1;
                    }
                    // 全封闭单元无压力自由度
                    let v = if diag > 0.0 { num / diag } else { 0.0 };
                    p.set(i, j, v);
                }
            }
            p.fill_ghosts_symmetric();
            residual_after = residual_norm(p, rhs, alpha, grid);
            iterations += 1;
        }

        let converged = residual_after <= self.tolerance;
        if !converged {
            log::warn!(
                "压力投影未收敛: {} 次迭代后残差 {:.3e} (容差 {:.3e})",
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

impl ProjectionSolver for RelaxProjection {
    fn project(
        &mut self,
        _ef: &EmbedFields,
        uf: &mut FaceVector,
        p: &mut CellField,
        alpha: &FaceVector,
        dt: f64,
        grid: &Grid,
    ) -> SolveStats {
        let rhs = divergence_rhs(uf, dt, grid);
        let stats = self.solve(p, &rhs, alpha, grid);

        // 面压力梯度修正
        let delta = grid.delta;
        for axis in Axis::ALL {
            let a = alpha.comp(axis);
            let f = uf.comp_mut(axis);
            let (fmx, fmy) = f.dims();
            for j in 0..fmy as i32 {
                for i in 0..fmx as i32 {
                    let g = (p.at(axis, i, j, 0, 0) - p.at(axis, i, j, -1, 0)) / delta;
                    let k = f.get(i, j) - dt * a.get(i, j) * g;
                    f.set(i, j, k);
                }
            }
        }
        stats
    }
}
