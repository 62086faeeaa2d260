// crates/cf_solver/src/pipeline/timestep.rs

//! 对流 CFL 时间步估计
//!
//! 网格均匀，$\min_f \Delta / |u_f|$ 等价于 $\Delta$ 除以
//! 面速度的最大绝对值；乘以 CFL 数后夹在 `[dt_min, dt_max]`
//! 内。静止场（全零 `uf`）直接取上限。归约为固定行序，
//! 结果与并行分解无关。

use super::SolverParams;
use cf_grid::{FaceVector, Grid};

/// 由面速度场估计稳定时间步
pub fn advective_timestep(uf: &FaceVector, grid: &Grid, params: &SolverParams) -> f64 {
    let umax = uf.x.max_abs_interior().max(uf.y.max_abs_interior());
    let mut dtm = params.dt_max / params.cfl;
    if umax > 0.0 {
        dtm = dtm.min(grid.delta / umax);
    }
    let dt = dtm * params.cfl;
    if dt < params.dt_min {
        log::warn!(
            "CFL 时间步 {:.3e} 低于下限 {:.3e}，按下限推进",
            dt,
            params.dt_min
        );
        params.dt_min
    } else {
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_timestep_from_fastest_face() {
        let grid = Grid::new(4, 4, 0.5);
        let mut uf = FaceVector::constant(&grid, 1.0);
        uf.y.set(2, 2, -4.0);
        let params = SolverParams {
            cfl: 0.5,
            ..Default::default()
        };
        let dt = advective_timestep(&uf, &grid, &params);
        // 最快面 |uf| = 4: dt = 0.5 * 0.5/4
        assert_relative_eq!(dt, 0.0625, epsilon = 1e-14);
    }

    #[test]
    fn test_quiescent_field_hits_dt_max() {
        let grid = Grid::new(4, 4, 0.5);
        let uf = FaceVector::zeros(&grid);
        let params = SolverParams {
            dt_max: 2.0,
            ..Default::default()
        };
        let dt = advective_timestep(&uf, &grid, &params);
        assert_relative_eq!(dt, 2.0, epsilon = 1e-14);
    }

    #[test]
    fn test_dt_min_clamp() {
        let grid = Grid::new(4, 4, 0.5);
        let uf = FaceVector::constant(&grid, 1e20);
        let params = SolverParams {
            dt_min: 1e-6,
            ..Default::default()
        };
        let dt = advective_timestep(&uf, &grid, &params);
        assert_relative_eq!(dt, 1e-6, epsilon = 1e-20);
    }
}
