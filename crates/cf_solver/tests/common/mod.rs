// crates/cf_solver/tests/common/mod.rs

//! 测试辅助：圆形固体的体素化分数场

use cf_grid::{CellField, FaceVector, Grid};
use glam::DVec2;

/// 细分采样数
const SUB: i32 = 16;

/// 生成以 `center` 为圆心、半径 `r` 的圆形固体分数场
///
/// 单元体积分数按 SUB x SUB 子采样、面开度按 SUB 点子采样估计，
/// 域外（虚单元）视为全流体。
pub fn circle_fractions(grid: &Grid, center: DVec2, r: f64) -> (CellField, FaceVector) {
    let inside = |p: DVec2| (p - center).length() < r;
    let mut cs = CellField::constant(grid.nx, grid.ny, 1.0);
    let mut fs = FaceVector::constant(grid, 1.0);
    let d = grid.delta;

    for j in 0..grid.ny as i32 {
        for i in 0..grid.nx as i32 {
            let o = grid.origin + DVec2::new(i as f64, j as f64) * d;
            let mut solid = 0;
            for sj in 0..SUB {
                for si in 0..SUB {
                    let p = o + DVec2::new(
                        (si as f64 + 0.5) / SUB as f64,
                        (sj as f64 + 0.5) / SUB as f64,
                    ) * d;
                    if inside(p) {
                        solid += 1;
                    }
                }
            }
            cs.set(i, j, 1.0 - solid as f64 / (SUB * SUB) as f64);
        }
    }

    for j in 0..grid.ny as i32 {
        for i in 0..grid.nx as i32 + 1 {
            let x = grid.origin.x + i as f64 * d;
            let y0 = grid.origin.y + j as f64 * d;
            let mut solid = 0;
            for s in 0..SUB {
                if inside(DVec2::new(x, y0 + (s as f64 + 0.5) / SUB as f64 * d)) {
                    solid += 1;
                }
            }
            fs.x.set(i, j, 1.0 - solid as f64 / SUB as f64);
        }
    }
    for j in 0..grid.ny as i32 + 1 {
        for i in 0..grid.nx as i32 {
            let y = grid.origin.y + j as f64 * d;
            let x0 = grid.origin.x + i as f64 * d;
            let mut solid = 0;
            for s in 0..SUB {
                if inside(DVec2::new(x0 + (s as f64 + 0.5) / SUB as f64 * d, y)) {
                    solid += 1;
                }
            }
            fs.y.set(i, j, 1.0 - solid as f64 / SUB as f64);
        }
    }

    cs.fill_ghosts_symmetric();
    fs.fill_ghosts_symmetric();
    (cs, fs)
}
