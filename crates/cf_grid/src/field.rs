// crates/cf_grid/src/field.rs

//! 单元/面场存储与模板访问
//!
//! # 布局
//!
//! [`CellField`] 以行主序存储逻辑尺寸 `(mx, my)` 加上四周 [`NG`]
//! 层虚单元的标量场。单元场取 `(nx, ny)`；面场复用同一类型，
//! x 向面取 `(nx+1, ny)`，y 向面取 `(nx, ny+1)`。
//!
//! # 轴参数化
//!
//! 同一公式按空间轴实例化时，统一通过 [`off`] 做 (沿轴, 横向)
//! 偏移到 (i, j) 的旋转映射，避免手工复制的每轴变体彼此漂移。
//!
//! # 并行
//!
//! 逐单元赋值按行并行（rayon），行内顺序、行间无别名；
//! 归约一律按行序收集部分和后顺序折叠，保证跨运行可复现。

use crate::grid::{Grid, NG};
use rayon::prelude::*;

// ============================================================
// 轴
// ============================================================

/// 空间轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// x 轴
    X,
    /// y 轴
    Y,
}

impl Axis {
    /// 全部轴（固定遍历顺序）
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    /// 正交轴
    #[inline]
    pub fn perp(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// 轴下标（与 `DVec2` 分量一致）
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// (沿轴 l, 横向 t) 偏移旋转到 (i, j) 偏移
///
/// X 轴恒等；Y 轴交换分量。轴向通用公式中所有模板访问都经由
/// 此映射，与逐轴手写版本逐点等价。
#[inline]
pub fn off(axis: Axis, i: i32, j: i32, l: i32, t: i32) -> (i32, i32) {
    match axis {
        Axis::X => (i + l, j + t),
        Axis::Y => (i + t, j + l),
    }
}

// ============================================================
// 标量场
// ============================================================

/// 带虚单元的二维标量场
///
/// 逻辑索引 `i ∈ [-NG, mx+NG)`, `j ∈ [-NG, my+NG)`。
#[derive(Debug, Clone)]
pub struct CellField {
    mx: usize,
    my: usize,
    width: usize,
    data: Vec<f64>,
}

impl CellField {
    /// 创建全零场
    pub fn zeros(mx: usize, my: usize) -> Self {
        let width = mx + 2 * NG;
        let height = my + 2 * NG;
        Self {
            mx,
            my,
            width,
            data: vec![0.0; width * height],
        }
    }

    /// 按网格单元尺寸创建
    pub fn for_cells(grid: &Grid) -> Self {
        Self::zeros(grid.nx, grid.ny)
    }

    /// 创建并填充常数
    pub fn constant(mx: usize, my: usize, value: f64) -> Self {
        let mut f = Self::zeros(mx, my);
        f.fill(value);
        f
    }

    /// 逻辑尺寸
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.mx, self.my)
    }

    #[inline]
    fn idx(&self, i: i32, j: i32) -> usize {
        debug_assert!(i >= -(NG as i32) && i < (self.mx + NG) as i32);
        debug_assert!(j >= -(NG as i32) && j < (self.my + NG) as i32);
        (j + NG as i32) as usize * self.width + (i + NG as i32) as usize
    }

    /// 读取（含虚单元）
    #[inline]
    pub fn get(&self, i: i32, j: i32) -> f64 {
        self.data[self.idx(i, j)]
    }

    /// 经 [`off`] 旋转后的读取
    #[inline]
    pub fn at(&self, axis: Axis, i: i32, j: i32, l: i32, t: i32) -> f64 {
        let (a, b) = off(axis, i, j, l, t);
        self.get(a, b)
    }

    /// 写入（含虚单元）
    #[inline]
    pub fn set(&mut self, i: i32, j: i32, value: f64) {
        let k = self.idx(i, j);
        self.data[k] = value;
    }

    /// 累加
    #[inline]
    pub fn add(&mut self, i: i32, j: i32, value: f64) {
        let k = self.idx(i, j);
        self.data[k] += value;
    }

    /// 全场（含虚单元）填充常数
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// 并行逐点赋值：`self[i,j] = f(i, j)`（仅内部区域）
    ///
    /// 行并行、行内顺序；`f` 不得读取 `self`。
    pub fn par_assign<F>(&mut self, f: F)
    where
        F: Fn(i32, i32) -> f64 + Sync,
    {
        let (mx, width) = (self.mx, self.width);
        let my = self.my;
        self.data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, slice)| {
                let j = row as i32 - NG as i32;
                if j >= 0 && (j as usize) < my {
                    for i in 0..mx as i32 {
                        slice[(i + NG as i32) as usize] = f(i, j);
                    }
                }
            });
    }

    /// 并行逐点更新：`self[i,j] = f(i, j, self[i,j])`（仅内部区域）
    pub fn par_update<F>(&mut self, f: F)
    where
        F: Fn(i32, i32, f64) -> f64 + Sync,
    {
        let (mx, width) = (self.mx, self.width);
        let my = self.my;
        self.data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, slice)| {
                let j = row as i32 - NG as i32;
                if j >= 0 && (j as usize) < my {
                    for i in 0..mx as i32 {
                        let k = (i + NG as i32) as usize;
                        slice[k] = f(i, j, slice[k]);
                    }
                }
            });
    }

    /// 内部区域求和（行序部分和，结果确定）
    pub fn sum_interior(&self) -> f64 {
        let partials: Vec<f64> = (0..self.my as i32)
            .map(|j| (0..self.mx as i32).map(|i| self.get(i, j)).sum::<f64>())
            .collect();
        partials.into_iter().sum()
    }

    /// 带权归约：按行序折叠 `f(i, j)` 的和
    pub fn sum_map<F>(&self, f: F) -> f64
    where
        F: Fn(i32, i32) -> f64,
    {
        let mut total = 0.0;
        for j in 0..self.my as i32 {
            let mut row = 0.0;
            for i in 0..self.mx as i32 {
                row += f(i, j);
            }
            total += row;
        }
        total
    }

    /// 对称虚单元填充（零梯度）
    ///
    /// 虚单元取最近内部单元的镜像值。压力与分数场的默认
    /// 齐次 Neumann 处理。
    pub fn fill_ghosts_symmetric(&mut self) {
        let (mx, my) = (self.mx as i32, self.my as i32);
        let ng = NG as i32;
        for j in -ng..my + ng {
            let jc = j.clamp(0, my - 1);
            for i in -ng..mx + ng {
                if i >= 0 && i < mx && j >= 0 && j < my {
                    continue;
                }
                let ic = i.clamp(0, mx - 1);
                let v = self.get(ic, jc);
                self.set(i, j, v);
            }
        }
    }

    /// 常数虚单元填充
    pub fn fill_ghosts_constant(&mut self, value: f64) {
        let (mx, my) = (self.mx as i32, self.my as i32);
        let ng = NG as i32;
        for j in -ng..my + ng {
            for i in -ng..mx + ng {
                if i >= 0 && i < mx && j >= 0 && j < my {
                    continue;
                }
                self.set(i, j, value);
            }
        }
    }

    /// 最大绝对值（内部区域，确定性）
    pub fn max_abs_interior(&self) -> f64 {
        let mut m: f64 = 0.0;
        for j in 0..self.my as i32 {
            for i in 0..self.mx as i32 {
                m = m.max(self.get(i, j).abs());
            }
        }
        m
    }
}

// ============================================================
// 矢量场与面场
// ============================================================

/// 单元中心矢量场：各轴独立持有的标量场元组
#[derive(Debug, Clone)]
pub struct VectorField {
    /// x 分量
    pub x: CellField,
    /// y 分量
    pub y: CellField,
}

impl VectorField {
    /// 按网格创建全零矢量场
    pub fn zeros(grid: &Grid) -> Self {
        Self {
            x: CellField::for_cells(grid),
            y: CellField::for_cells(grid),
        }
    }

    /// 取分量
    #[inline]
    pub fn comp(&self, axis: Axis) -> &CellField {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// 取可变分量
    #[inline]
    pub fn comp_mut(&mut self, axis: Axis) -> &mut CellField {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }
}

/// 面交错矢量场：每轴一个面标量场
///
/// `x` 的逻辑索引 `(i, j)` 表示单元 `(i-1, j)` 与 `(i, j)` 之间的面
/// （x 向面共 `nx+1` 列）；`y` 同理为 `(i, j-1)`–`(i, j)` 之间的面。
#[derive(Debug, Clone)]
pub struct FaceVector {
    /// x 向面
    pub x: CellField,
    /// y 向面
    pub y: CellField,
}

impl FaceVector {
    /// 按网格创建全零面场
    pub fn zeros(grid: &Grid) -> Self {
        Self {
            x: CellField::zeros(grid.nx + 1, grid.ny),
            y: CellField::zeros(grid.nx, grid.ny + 1),
        }
    }

    /// 按网格创建常数面场
    pub fn constant(grid: &Grid, value: f64) -> Self {
        Self {
            x: CellField::constant(grid.nx + 1, grid.ny, value),
            y: CellField::constant(grid.nx, grid.ny + 1, value),
        }
    }

    /// 取分量
    #[inline]
    pub fn comp(&self, axis: Axis) -> &CellField {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// 取可变分量
    #[inline]
    pub fn comp_mut(&mut self, axis: Axis) -> &mut CellField {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    /// 单元 `(i, j)` 在 `axis` 方向上沿轴偏移 `l`、横向偏移 `t`
    /// 处的沿轴面值
    ///
    /// `l = 0` 为该单元的负向面，`l = 1` 为正向面。
    #[inline]
    pub fn along(&self, axis: Axis, i: i32, j: i32, l: i32, t: i32) -> f64 {
        self.comp(axis).at(axis, i, j, l, t)
    }

    /// 与 `axis` 正交的面值：横向面位于沿轴偏移 `l`、
    /// 横向面位置 `t`（旋转坐标下）
    #[inline]
    pub fn transverse(&self, axis: Axis, i: i32, j: i32, l: i32, t: i32) -> f64 {
        self.comp(axis.perp()).at(axis, i, j, l, t)
    }

    /// 全部面填充常数（含虚面）
    pub fn fill(&mut self, value: f64) {
        self.x.fill(value);
        self.y.fill(value);
    }

    /// 两分量对称虚面填充
    pub fn fill_ghosts_symmetric(&mut self) {
        self.x.fill_ghosts_symmetric();
        self.y.fill_ghosts_symmetric();
    }
}
