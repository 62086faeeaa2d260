// crates/cf_solver/src/cleanup.rs

//! 分数场一致性清理
//!
//! 体积分数与面开度分数独立生成（体素化、网格自适应）后可能
//! 出现不一致的退化拓扑：固体单元却带开面、开度极小的碎面、
//! 切割单元的开面不足以支撑梯度重构。这类单元会让线性求解
//! 退化甚至发散，须在使用前修复。
//!
//! 修复是迭代的：封一个面可能使邻居变成新的退化单元，
//! 循环直到不动点（上限 100 轮）。

use cf_grid::{off, Axis, CellField, FaceVector, DIM};

/// 清理迭代上限
const MAX_PASSES: usize = 100;

/// 分数场一致性清理
///
/// 规则（每轮依序应用）：
///
/// 1. 面两侧任一单元为固体，或面开度小于 `smin`，则封死该面
/// 2. 切割单元（`0 < cs < 1`）的非零面总数少于空间维数时，
///    整个单元置为固体
/// 3. `opposite = true` 时追加：某轴两侧面均封死的切割单元
///    置为固体（该单元在该轴上不可渗透，保留会产生孤立压力模式）
///
/// 返回总修改数。达到迭代上限仍未收敛时告警并返回当前计数。
pub fn fractions_cleanup(
    cs: &mut CellField,
    fs: &mut FaceVector,
    smin: f64,
    opposite: bool,
) -> usize {
    let (mx, my) = cs.dims();
    let (mx, my) = (mx as i32, my as i32);
    let mut total = 0usize;

    for _pass in 0..MAX_PASSES {
        let mut changed = 0usize;

        // 规则 1: 封死不一致或过小的面
        for axis in Axis::ALL {
            let f = fs.comp_mut(axis);
            let (fmx, fmy) = f.dims();
            for j in 0..fmy as i32 {
                for i in 0..fmx as i32 {
                    let v = f.get(i, j);
                    if v == 0.0 {
                        continue;
                    }
                    // 面 (i, j) 连接沿轴 -1 与 0 两个单元
                    let (i0, j0) = off(axis, i, j, 0, 0);
                    let (i1, j1) = off(axis, i, j, -1, 0);
                    if cs.get(i0, j0) == 0.0 || cs.get(i1, j1) == 0.0 || v < smin {
                        f.set(i, j, 0.0);
                        changed += 1;
                    }
                }
            }
        }

        // 规则 2 与 3: 退化切割单元置为固体
        for j in 0..my {
            for i in 0..mx {
                let c = cs.get(i, j);
                if c <= 0.0 || c >= 1.0 {
                    continue;
                }
                let mut n = 0usize;
                let mut solid = false;
                for axis in Axis::ALL {
                    let f0 = fs.along(axis, i, j, 0, 0);
                    let f1 = fs.along(axis, i, j, 1, 0);
                    if f0 != 0.0 {
                        n += 1;
                    }
                    if f1 != 0.0 {
                        n += 1;
                    }
                    if opposite && f0 == 0.0 && f1 == 0.0 {
                        solid = true;
                    }
                }
                if solid || n < DIM {
                    cs.set(i, j, 0.0);
                    changed += 1;
                }
            }
        }

        total += changed;
        if changed == 0 {
            return total;
        }
    }

    log::warn!(
        "分数清理在 {} 轮后仍未收敛，分数场拓扑可能存在病态区域",
        MAX_PASSES
    );
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_grid::Grid;

    /// 中心圆形固体的分数场（粗略体素化，只为拓扑测试）
    fn circle_fractions(grid: &Grid, center: glam::DVec2, r: f64) -> (CellField, FaceVector) {
        let mut cs = CellField::for_cells(grid);
        let mut fs = FaceVector::zeros(grid);
        let inside = |p: glam::DVec2| (p - center).length() < r;
        // 单元：按 3x3 子采样估计体积分数
        for j in 0..grid.ny as i32 {
            for i in 0..grid.nx as i32 {
                let c = grid.cell_center(i, j);
                let mut solid = 0;
                for sj in -1..=1 {
                    for si in -1..=1 {
                        let p = c + glam::DVec2::new(si as f64, sj as f64) * grid.delta / 3.0;
                        if inside(p) {
                            solid += 1;
                        }
                    }
                }
                cs.set(i, j, 1.0 - solid as f64 / 9.0);
            }
        }
        // 面：按 3 点子采样估计开度
        for j in 0..grid.ny as i32 {
            for i in 0..grid.nx as i32 + 1 {
                let x = grid.origin.x + i as f64 * grid.delta;
                let y0 = grid.origin.y + j as f64 * grid.delta;
                let mut solid = 0;
                for s in 0..3 {
                    let p = glam::DVec2::new(x, y0 + (s as f64 + 0.5) * grid.delta / 3.0);
                    if inside(p) {
                        solid += 1;
                    }
                }
                fs.x.set(i, j, 1.0 - solid as f64 / 3.0);
            }
        }
        for j in 0..grid.ny as i32 + 1 {
            for i in 0..grid.nx as i32 {
                let y = grid.origin.y + j as f64 * grid.delta;
                let x0 = grid.origin.x + i as f64 * grid.delta;
                let mut solid = 0;
                for s in 0..3 {
                    let p = glam::DVec2::new(x0 + (s as f64 + 0.5) * grid.delta / 3.0, y);
                    if inside(p) {
                        solid += 1;
                    }
                }
                fs.y.set(i, j, 1.0 - solid as f64 / 3.0);
            }
        }
        cs.fill_ghosts_symmetric();
        fs.fill_ghosts_symmetric();
        (cs, fs)
    }

    #[test]
    fn test_cleanup_idempotent() {
        let grid = Grid::new(16, 16, 1.0 / 16.0);
        let (mut cs, mut fs) =
            circle_fractions(&grid, glam::DVec2::new(0.5, 0.5), 0.23);
        fractions_cleanup(&mut cs, &mut fs, 1e-2, true);
        // 不动点：立即重跑不再修改
        let changed = fractions_cleanup(&mut cs, &mut fs, 1e-2, true);
        assert_eq!(changed, 0);
    }

    #[test]
    fn test_cleanup_closes_face_next_to_solid() {
        let grid = Grid::new(4, 4, 1.0);
        let mut cs = CellField::constant(4, 4, 1.0);
        let mut fs = FaceVector::constant(&grid, 1.0);
        cs.set(1, 1, 0.0);
        cs.fill_ghosts_symmetric();
        fractions_cleanup(&mut cs, &mut fs, 1e-3, false);
        // 固体单元四周的面全部封死
        assert_eq!(fs.x.get(1, 1), 0.0);
        assert_eq!(fs.x.get(2, 1), 0.0);
        assert_eq!(fs.y.get(1, 1), 0.0);
        assert_eq!(fs.y.get(1, 2), 0.0);
        // 远处的面不受影响
        assert_eq!(fs.x.get(3, 3), 1.0);
    }

    #[test]
    fn test_cleanup_small_faces_and_cascade() {
        let grid = Grid::new(4, 4, 1.0);
        let mut cs = CellField::constant(4, 4, 1.0);
        let mut fs = FaceVector::constant(&grid, 1.0);
        // 切割单元只剩一个微小开面：先封面、再固化单元
        cs.set(2, 2, 0.3);
        fs.x.set(2, 2, 0.0);
        fs.x.set(3, 2, 1e-5);
        fs.y.set(2, 2, 0.0);
        fs.y.set(2, 3, 0.0);
        cs.fill_ghosts_symmetric();
        fractions_cleanup(&mut cs, &mut fs, 1e-3, false);
        assert_eq!(cs.get(2, 2), 0.0);
        assert_eq!(fs.x.get(3, 2), 0.0);
    }

    #[test]
    fn test_cleanup_opposite_mode() {
        let grid = Grid::new(4, 4, 1.0);
        let mut cs = CellField::constant(4, 4, 1.0);
        let mut fs = FaceVector::constant(&grid, 1.0);
        // x 轴两面封死但 y 轴两面全开：非 opposite 模式保留
        cs.set(2, 2, 0.5);
        fs.x.set(2, 2, 0.0);
        fs.x.set(3, 2, 0.0);
        cs.fill_ghosts_symmetric();
        let mut cs2 = cs.clone();
        let mut fs2 = fs.clone();
        fractions_cleanup(&mut cs, &mut fs, 1e-3, false);
        assert!(cs.get(2, 2) > 0.0);
        // opposite 模式固化
        fractions_cleanup(&mut cs2, &mut fs2, 1e-3, true);
        assert_eq!(cs2.get(2, 2), 0.0);
    }

    #[test]
    fn test_cut_cells_keep_enough_faces() {
        let grid = Grid::new(16, 16, 1.0 / 16.0);
        let (mut cs, mut fs) =
            circle_fractions(&grid, glam::DVec2::new(0.5, 0.5), 0.23);
        fractions_cleanup(&mut cs, &mut fs, 1e-2, true);
        // 清理后每个切割单元至少有 DIM 个非零面
        for j in 0..16 {
            for i in 0..16 {
                let c = cs.get(i, j);
                if c <= 0.0 || c >= 1.0 {
                    continue;
                }
                let mut n = 0;
                for axis in Axis::ALL {
                    if fs.along(axis, i, j, 0, 0) != 0.0 {
                        n += 1;
                    }
                    if fs.along(axis, i, j, 1, 0) != 0.0 {
                        n += 1;
                    }
                }
                assert!(n >= DIM, "切割单元 ({}, {}) 只有 {} 个开面", i, j, n);
            }
        }
    }
}
