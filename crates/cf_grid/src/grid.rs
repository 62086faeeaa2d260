// crates/cf_grid/src/grid.rs

//! 均匀二维结构网格
//!
//! 本核心只依赖局部单元尺寸与整型偏移访问；自适应网格基质
//! （细化树、并行分解）属于外部协作者。这里提供的均匀网格
//! 是该接口的最小实现。

use glam::DVec2;

/// 虚单元层数
///
/// 二阶迎风外推与二次横向重构需要 2 层模板。
pub const NG: usize = 2;

/// 空间维数（本移植固定为二维）
pub const DIM: usize = 2;

/// 均匀二维结构网格
///
/// 单元 `(i, j)`，`i ∈ [0, nx)`, `j ∈ [0, ny)`；虚单元扩展到
/// `[-NG, n+NG)`。面采用交错布局：x 向面 `(i, j)` 位于单元
/// `(i-1, j)` 与 `(i, j)` 之间。
#[derive(Debug, Clone)]
pub struct Grid {
    /// x 方向单元数
    pub nx: usize,
    /// y 方向单元数
    pub ny: usize,
    /// 单元尺寸（正方形单元）
    pub delta: f64,
    /// 域原点（左下角）
    pub origin: DVec2,
}

impl Grid {
    /// 创建网格
    pub fn new(nx: usize, ny: usize, delta: f64) -> Self {
        Self {
            nx,
            ny,
            delta,
            origin: DVec2::ZERO,
        }
    }

    /// 指定原点创建
    pub fn with_origin(nx: usize, ny: usize, delta: f64, origin: DVec2) -> Self {
        Self {
            nx,
            ny,
            delta,
            origin,
        }
    }

    /// 单元总数（不含虚单元）
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny
    }

    /// 单元中心坐标
    #[inline]
    pub fn cell_center(&self, i: i32, j: i32) -> DVec2 {
        self.origin
            + DVec2::new(
                (i as f64 + 0.5) * self.delta,
                (j as f64 + 0.5) * self.delta,
            )
    }

    /// 域尺寸
    #[inline]
    pub fn extent(&self) -> DVec2 {
        DVec2::new(self.nx as f64 * self.delta, self.ny as f64 * self.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_center() {
        let grid = Grid::new(4, 4, 0.25);
        let c = grid.cell_center(0, 0);
        assert!((c.x - 0.125).abs() < 1e-15);
        assert!((c.y - 0.125).abs() < 1e-15);
        let c = grid.cell_center(3, 3);
        assert!((c.x - 0.875).abs() < 1e-15);
    }
}
