// crates/cf_solver/src/pipeline/centered.rs

//! 分步投影管线状态对象
//!
//! [`Simulation`] 持有全部模拟状态（无隐藏全局量），
//! [`Simulation::step`] 按固定相位顺序推进一个时间步：
//!
//! 1. 时间步上限 / CFL 稳定性
//! 2. 体积分数与示踪剂输运（钩子相位）
//! 3. 物性重建（$\alpha = f_s/\rho$、$\mu_f = \mu f_s$）
//! 4. 对流项：二阶迎风面预测、半步投影、动量守恒对流
//! 5. 粘性项：压力梯度折入/解出的隐式粘性
//! 6. 加速度与面速度重建
//! 7. 投影、中心压力梯度、速度修正
//! 8. 步末钩子与几何一致性维护
//!
//! 投影、粘性与对流通量格式是注入的协作者（trait 对象），
//! 默认配参考实现。

use crate::advection::advect;
use crate::boundary::EmbedBc;
use crate::cleanup::fractions_cleanup;
use crate::fields::{EmbedFields, FieldMeta};
use crate::flux::{FluxScheme, Upwind};
use crate::interp::{face_gradient, face_value};
use crate::pipeline::schedule::{Phase, Scheduler};
use crate::pipeline::timestep::advective_timestep;
use crate::pipeline::SolverParams;
use crate::project::{ProjectionSolver, RelaxProjection, SolveStats};
use crate::viscosity::{JacobiViscosity, ViscositySolver};
use cf_foundation::error::CfResult;
use cf_foundation::float::{isign, SEPS};
use cf_grid::{Axis, CellField, FaceVector, Grid, VectorField};

/// 分步投影模拟状态
pub struct Simulation {
    /// 网格
    pub grid: Grid,
    /// 体积分数（0 = 固体）
    pub cs: CellField,
    /// 面开度分数
    pub fs: FaceVector,
    /// 单元中心速度
    pub u: VectorField,
    /// 单元中心压力梯度场（投影后回代）
    pub g: VectorField,
    /// 压力
    pub p: CellField,
    /// 半步（预测）压力
    pub pf: CellField,
    /// 面法向体积通量
    pub uf: FaceVector,
    /// 面加速度（体力，驱动方管理）
    pub a: FaceVector,
    /// 面比容 $\alpha = f_s / \rho$
    pub alpha: FaceVector,
    /// 面粘性系数 $\mu_f = \mu f_s$
    pub mu: FaceVector,
    /// 单元密度
    pub rho: CellField,
    /// 数值参数
    pub params: SolverParams,
    /// 速度场配置
    pub u_meta: FieldMeta,
    /// 压力场配置
    pub p_meta: FieldMeta,
    /// 速度在嵌入界面上的条件（默认无滑移）
    pub u_bc: [EmbedBc; 2],
    /// 投影协作者
    pub projection: Box<dyn ProjectionSolver>,
    /// 粘性协作者
    pub viscosity: Box<dyn ViscositySolver>,
    /// 对流通量格式
    pub scheme: Box<dyn FluxScheme>,
    /// 全步投影统计
    pub mgp: SolveStats,
    /// 半步投影统计
    pub mgpf: SolveStats,
    /// 粘性求解统计
    pub mgu: SolveStats,
    /// 当前时间步
    pub dt: f64,
    /// 模拟时间
    pub t: f64,
    /// 步计数
    pub iter: usize,
}

impl Simulation {
    /// 创建全流体初始状态，参数先行校验
    pub fn new(grid: Grid, params: SolverParams) -> CfResult<Self> {
        params.validate()?;
        let (nx, ny) = (grid.nx, grid.ny);
        let mut sim = Self {
            cs: CellField::constant(nx, ny, 1.0),
            fs: FaceVector::constant(&grid, 1.0),
            u: VectorField::zeros(&grid),
            g: VectorField::zeros(&grid),
            p: CellField::zeros(nx, ny),
            pf: CellField::zeros(nx, ny),
            uf: FaceVector::zeros(&grid),
            a: FaceVector::zeros(&grid),
            alpha: FaceVector::zeros(&grid),
            mu: FaceVector::zeros(&grid),
            rho: CellField::zeros(nx, ny),
            u_meta: FieldMeta::velocity(),
            p_meta: FieldMeta::pressure(),
            u_bc: [EmbedBc::NO_SLIP; 2],
            projection: Box::new(RelaxProjection {
                tolerance: params.tolerance,
                max_iterations: params.max_iterations,
            }),
            viscosity: Box::new(JacobiViscosity {
                tolerance: params.tolerance,
                max_iterations: params.max_iterations,
            }),
            scheme: Box::new(Upwind),
            mgp: SolveStats::trivial(),
            mgpf: SolveStats::trivial(),
            mgu: SolveStats::trivial(),
            dt: params.dt_min,
            t: 0.0,
            iter: 0,
            grid,
            params,
        };
        sim.properties();
        Ok(sim)
    }

    /// 几何与初值就位后的一次性初始化
    ///
    /// 清理分数场、封死固体内的速度、由单元速度重建面通量。
    pub fn init(&mut self) {
        self.cs.fill_ghosts_symmetric();
        self.fs.fill_ghosts_symmetric();
        fractions_cleanup(&mut self.cs, &mut self.fs, self.params.smin, true);
        self.cs.fill_ghosts_symmetric();
        self.fs.fill_ghosts_symmetric();
        self.enforce_solid();
        self.properties();

        // uf = fm * face_value(u)
        let ef = EmbedFields {
            cs: &self.cs,
            fs: &self.fs,
        };
        for axis in Axis::ALL {
            let uc = self.u.comp(axis);
            let f = self.uf.comp_mut(axis);
            let (fmx, fmy) = f.dims();
            for j in 0..fmy as i32 {
                for i in 0..fmx as i32 {
                    let v = self.fs.along(axis, i, j, 0, 0)
                        * face_value(&ef, uc, &self.u_meta, axis, i, j);
                    f.set(i, j, v);
                }
            }
        }
        self.p.fill_ghosts_symmetric();
        self.pf.fill_ghosts_symmetric();
    }

    /// 物性重建：$\alpha = f_s/\rho$、$\mu_f = \mu f_s$、$\rho$ 常数
    pub fn properties(&mut self) {
        let rho_v = self.params.rho;
        let mu_v = self.params.mu;
        for axis in Axis::ALL {
            let fs = self.fs.comp(axis);
            let alpha = self.alpha.comp_mut(axis);
            alpha.par_assign(|i, j| fs.get(i, j) / rho_v);
            alpha.fill_ghosts_symmetric();
            let mu = self.mu.comp_mut(axis);
            mu.par_assign(|i, j| mu_v * fs.get(i, j));
            mu.fill_ghosts_symmetric();
        }
        self.rho.fill(rho_v);
    }

    /// 推进一个时间步
    pub fn step(&mut self, sched: &mut Scheduler) {
        sched.run(Phase::SetDtMax, self);

        // 稳定性
        self.dt = if self.params.stokes {
            self.params.dt_max
        } else {
            advective_timestep(&self.uf, &self.grid, &self.params)
        };
        sched.run(Phase::Stability, self);

        // 输运相位（钩子专用）
        sched.run(Phase::Vof, self);
        sched.run(Phase::TracerAdvection, self);
        sched.run(Phase::TracerDiffusion, self);

        // 物性
        self.properties();
        sched.run(Phase::Properties, self);

        // 对流项
        if !self.params.stokes {
            self.prediction();
            let dt2 = self.dt / 2.0;
            self.mgpf = self.projection.project(
                &EmbedFields {
                    cs: &self.cs,
                    fs: &self.fs,
                },
                &mut self.uf,
                &mut self.pf,
                &self.alpha,
                dt2,
                &self.grid,
            );
            self.advect_momentum();
        }
        sched.run(Phase::AdvectionTerm, self);

        // 粘性项
        if self.params.mu != 0.0 {
            self.correction(self.dt);
            self.mgu = self.viscosity.viscosity(
                &EmbedFields {
                    cs: &self.cs,
                    fs: &self.fs,
                },
                &mut self.u,
                &self.mu,
                &self.rho,
                self.dt,
                self.u_bc,
                &self.grid,
            );
            self.correction(-self.dt);
        }
        sched.run(Phase::ViscousTerm, self);

        // 加速度与面速度重建
        self.acceleration();
        sched.run(Phase::Acceleration, self);

        // 投影
        self.mgp = self.projection.project(
            &EmbedFields {
                cs: &self.cs,
                fs: &self.fs,
            },
            &mut self.uf,
            &mut self.p,
            &self.alpha,
            self.dt,
            &self.grid,
        );
        self.centered_gradient();
        self.correction(self.dt);
        sched.run(Phase::Projection, self);

        sched.run(Phase::EndTimestep, self);

        // 几何一致性维护
        self.after_adapt();
        sched.run(Phase::Adapt, self);

        self.t += self.dt;
        self.iter += 1;
    }

    /// 二阶迎风面速度预测（含横向输运修正）
    fn prediction(&mut self) {
        let delta = self.grid.delta;
        let dt = self.dt;

        // 沿轴斜率，跨封死面置零
        let mut du = VectorField::zeros(&self.grid);
        for axis in Axis::ALL {
            let uc = self.u.comp(axis);
            let fs = &self.fs;
            let d = du.comp_mut(axis);
            d.par_assign(|i, j| {
                if fs.along(axis, i, j, 0, 0) == 0.0 || fs.along(axis, i, j, 1, 0) == 0.0 {
                    0.0
                } else {
                    (uc.at(axis, i, j, 1, 0) - uc.at(axis, i, j, -1, 0)) / (2.0 * delta)
                }
            });
            d.fill_ghosts_symmetric();
        }

        for axis in Axis::ALL {
            let uc = self.u.comp(axis);
            let ut = self.u.comp(axis.perp());
            let gc = self.g.comp(axis);
            let fs = &self.fs;
            let dc = du.comp(axis);
            let f = self.uf.comp_mut(axis);
            let (fmx, fmy) = f.dims();
            for j in 0..fmy as i32 {
                for i in 0..fmx as i32 {
                    let un =
                        dt * (uc.at(axis, i, j, 0, 0) + uc.at(axis, i, j, -1, 0)) / (2.0 * delta);
                    let s = isign(un);
                    let iu = -(s + 1) / 2;
                    let sf = s as f64;
                    let mut v = uc.at(axis, i, j, iu, 0)
                        + (gc.at(axis, i, j, 0, 0) + gc.at(axis, i, j, -1, 0)) * dt / 4.0
                        + sf * (1.0 - sf * un) * dc.at(axis, i, j, iu, 0) * delta / 2.0;
                    // 横向输运：上风单元两侧横向面均开时启用
                    if fs.transverse(axis, i, j, iu, 0) != 0.0
                        && fs.transverse(axis, i, j, iu, 1) != 0.0
                    {
                        let w = ut.at(axis, i, j, iu, 0);
                        let fyy = if w < 0.0 {
                            uc.at(axis, i, j, iu, 1) - uc.at(axis, i, j, iu, 0)
                        } else {
                            uc.at(axis, i, j, iu, 0) - uc.at(axis, i, j, iu, -1)
                        };
                        v -= dt * w * fyy / (2.0 * delta);
                    }
                    f.set(i, j, v * fs.along(axis, i, j, 0, 0));
                }
            }
        }
    }

    /// 动量守恒对流：逐分量走切割单元感知的示踪剂更新
    fn advect_momentum(&mut self) {
        let ef = EmbedFields {
            cs: &self.cs,
            fs: &self.fs,
        };
        for axis in Axis::ALL {
            let src = self.g.comp(axis);
            advect(
                &ef,
                self.u.comp_mut(axis),
                &self.u_meta,
                &self.uf,
                &*self.scheme,
                self.dt,
                &self.grid,
                Some(src),
            );
        }
        self.u.x.fill_ghosts_symmetric();
        self.u.y.fill_ghosts_symmetric();
    }

    /// 速度修正 `u += dt * g`（与 `correction(-dt)` 严格互逆）
    pub fn correction(&mut self, dt: f64) {
        for axis in Axis::ALL {
            let gc = self.g.comp(axis);
            let uc = self.u.comp_mut(axis);
            uc.par_update(|i, j, v| v + dt * gc.get(i, j));
            uc.fill_ghosts_symmetric();
        }
    }

    /// 面速度重建 `uf = fm * (face_value(u) + dt * a)`
    fn acceleration(&mut self) {
        let ef = EmbedFields {
            cs: &self.cs,
            fs: &self.fs,
        };
        let dt = self.dt;
        for axis in Axis::ALL {
            let uc = self.u.comp(axis);
            let a = self.a.comp(axis);
            let f = self.uf.comp_mut(axis);
            let (fmx, fmy) = f.dims();
            for j in 0..fmy as i32 {
                for i in 0..fmx as i32 {
                    let v = self.fs.along(axis, i, j, 0, 0)
                        * (face_value(&ef, uc, &self.u_meta, axis, i, j) + dt * a.get(i, j));
                    f.set(i, j, v);
                }
            }
        }
    }

    /// 中心压力梯度重建：面梯度按面开度加权汇聚到单元
    fn centered_gradient(&mut self) {
        let ef = EmbedFields {
            cs: &self.cs,
            fs: &self.fs,
        };
        let delta = self.grid.delta;
        let mut gf = FaceVector::zeros(&self.grid);
        for axis in Axis::ALL {
            let f = gf.comp_mut(axis);
            let (fmx, fmy) = f.dims();
            for j in 0..fmy as i32 {
                for i in 0..fmx as i32 {
                    let v = self.fs.along(axis, i, j, 0, 0) * self.a.comp(axis).get(i, j)
                        - self.alpha.comp(axis).get(i, j)
                            * face_gradient(&ef, &self.p, &self.p_meta, axis, i, j, delta);
                    f.set(i, j, v);
                }
            }
        }
        for axis in Axis::ALL {
            let fs = &self.fs;
            let g = self.g.comp_mut(axis);
            g.par_assign(|i, j| {
                (gf.along(axis, i, j, 0, 0) + gf.along(axis, i, j, 1, 0))
                    / (fs.along(axis, i, j, 0, 0) + fs.along(axis, i, j, 1, 0) + SEPS)
            });
            g.fill_ghosts_symmetric();
        }
    }

    /// 固体单元速度与封死面通量清零
    fn enforce_solid(&mut self) {
        for axis in Axis::ALL {
            let cs = &self.cs;
            let uc = self.u.comp_mut(axis);
            uc.par_update(|i, j, v| if cs.get(i, j) <= 0.0 { 0.0 } else { v });
            uc.fill_ghosts_symmetric();

            let fs = &self.fs;
            let f = self.uf.comp_mut(axis);
            let (fmx, fmy) = f.dims();
            for j in 0..fmy as i32 {
                for i in 0..fmx as i32 {
                    if fs.comp(axis).get(i, j) == 0.0 {
                        f.set(i, j, 0.0);
                    }
                }
            }
        }
    }

    /// 几何变更后的一致性维护
    ///
    /// 清理分数场、清零固体速度与封死面通量、重建物性。
    /// 每步末尾运行一次；几何未变时是幂等空操作。
    pub fn after_adapt(&mut self) {
        let changed = fractions_cleanup(&mut self.cs, &mut self.fs, self.params.smin, true);
        if changed > 0 {
            self.cs.fill_ghosts_symmetric();
            self.fs.fill_ghosts_symmetric();
            log::warn!("几何一致性维护修改了 {} 处分数", changed);
        }
        self.enforce_solid();
        self.properties();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_validates_params() {
        let grid = Grid::new(4, 4, 1.0);
        let params = SolverParams {
            cfl: -1.0,
            ..Default::default()
        };
        assert!(Simulation::new(grid, params).is_err());
    }

    #[test]
    fn test_init_rebuilds_face_velocity() {
        let grid = Grid::new(6, 6, 1.0);
        let mut sim = Simulation::new(grid, SolverParams::default()).unwrap();
        sim.u.x.fill(2.0);
        sim.init();
        // 全流体、均匀速度：内部面通量等于单元速度
        assert_relative_eq!(sim.uf.x.get(3, 3), 2.0, epsilon = 1e-13);
        assert_relative_eq!(sim.uf.y.get(3, 3), 0.0, epsilon = 1e-13);
    }

    #[test]
    fn test_correction_inverse_pair() {
        let grid = Grid::new(6, 6, 1.0);
        let mut sim = Simulation::new(grid, SolverParams::default()).unwrap();
        sim.g.x.par_assign(|i, j| 0.25 * (i + j) as f64);
        sim.g.y.par_assign(|i, j| -0.5 * i as f64);
        sim.u.x.par_assign(|i, j| (i * 7 + j) as f64 * 0.125);
        sim.u.x.fill_ghosts_symmetric();
        let before = sim.u.x.clone();
        sim.correction(0.25);
        sim.correction(-0.25);
        for j in 0..6 {
            for i in 0..6 {
                // 增量为 2 的幂次，往返严格相等
                assert_eq!(sim.u.x.get(i, j), before.get(i, j));
            }
        }
    }

    #[test]
    fn test_uniform_flow_is_steady() {
        // 全流体、无体力、均匀初速：一步后速度保持均匀
        let grid = Grid::new(8, 8, 1.0 / 8.0);
        let params = SolverParams {
            dt_max: 0.01,
            ..Default::default()
        };
        let mut sim = Simulation::new(grid, params).unwrap();
        sim.u.x.fill(1.0);
        sim.init();
        let mut sched = Scheduler::new();
        sim.step(&mut sched);
        for j in 2..6 {
            for i in 2..6 {
                assert_relative_eq!(sim.u.x.get(i, j), 1.0, epsilon = 1e-6);
                assert_relative_eq!(sim.u.y.get(i, j), 0.0, epsilon = 1e-6);
            }
        }
        assert!(sim.t > 0.0);
        assert_eq!(sim.iter, 1);
    }

    #[test]
    fn test_stokes_skips_advection() {
        let grid = Grid::new(6, 6, 1.0);
        let params = SolverParams {
            stokes: true,
            dt_max: 0.5,
            ..Default::default()
        };
        let mut sim = Simulation::new(grid, params).unwrap();
        sim.init();
        let mut sched = Scheduler::new();
        sim.step(&mut sched);
        // Stokes 模式：dt 直接取上限
        assert_relative_eq!(sim.dt, 0.5, epsilon = 1e-14);
        assert_eq!(sim.mgpf.iterations, 0);
    }
}
