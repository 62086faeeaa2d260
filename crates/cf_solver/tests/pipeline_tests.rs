// crates/cf_solver/tests/pipeline_tests.rs

//! 分步投影管线集成测试
//!
//! 覆盖带圆形障碍的完整时间步、体力与压力梯度回代路径、
//! 钩子相位上的示踪剂输运。

mod common;

use approx::assert_relative_eq;
use cf_grid::{Axis, CellField, Grid};
use cf_solver::{Phase, Scheduler, Simulation, SolverParams, Upwind};
use common::circle_fractions;
use glam::DVec2;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_full_step_with_circular_obstacle() {
    let grid = Grid::new(16, 16, 1.0 / 16.0);
    let params = SolverParams {
        dt_max: 0.005,
        mu: 1e-3,
        tolerance: 1e-6,
        max_iterations: 20_000,
        ..Default::default()
    };
    let mut sim = Simulation::new(grid, params).unwrap();

    let (cs, fs) = circle_fractions(&sim.grid, DVec2::new(0.5, 0.5), 0.18);
    sim.cs = cs;
    sim.fs = fs;
    sim.u.x.fill(1.0);
    sim.init();

    let mut sched = Scheduler::new();
    sim.step(&mut sched);

    // 固体单元速度恒为零
    for j in 0..16 {
        for i in 0..16 {
            if sim.cs.get(i, j) <= 0.0 {
                assert_eq!(sim.u.x.get(i, j), 0.0);
                assert_eq!(sim.u.y.get(i, j), 0.0);
            }
        }
    }
    // 封死面的通量恒为零
    for axis in Axis::ALL {
        let (fmx, fmy) = sim.fs.comp(axis).dims();
        for j in 0..fmy as i32 {
            for i in 0..fmx as i32 {
                if sim.fs.comp(axis).get(i, j) == 0.0 {
                    assert_eq!(sim.uf.comp(axis).get(i, j), 0.0);
                }
            }
        }
    }
    // 三个迭代求解都应收敛
    assert!(sim.mgpf.converged, "半步投影残差 {:.3e}", sim.mgpf.residual_after);
    assert!(sim.mgp.converged, "投影残差 {:.3e}", sim.mgp.residual_after);
    assert!(sim.mgu.converged, "粘性残差 {:.3e}", sim.mgu.residual_after);
    assert!(sim.dt > 0.0 && sim.t == sim.dt);
}

#[test]
fn test_uniform_body_force_accelerates_free_stream() {
    // 开放域 + 均匀体力：一步后速度增量 ≈ dt·a，压力保持平凡
    let grid = Grid::new(8, 8, 1.0 / 8.0);
    let params = SolverParams {
        dt_max: 0.1,
        ..Default::default()
    };
    let mut sim = Simulation::new(grid, params).unwrap();
    sim.init();
    sim.a.x.fill(2.0);

    let mut sched = Scheduler::new();
    sim.step(&mut sched);

    let dt = sim.dt;
    for j in 0..8 {
        for i in 0..8 {
            assert_relative_eq!(sim.u.x.get(i, j), dt * 2.0, epsilon = 1e-8);
            assert_relative_eq!(sim.p.get(i, j), 0.0, epsilon = 1e-8);
        }
    }
    // 压力梯度场回代的是纯体力项
    assert_relative_eq!(sim.g.x.get(4, 4), 2.0, epsilon = 1e-8);
}

#[test]
fn test_body_force_accumulates_linearly_over_steps() {
    // 多步均匀体力：每步速度增量恰为一份 dt·a。
    // 回代的压力梯度场 g 进入对流时只参与面外推，
    // 单元中心的 dt·g 修正每步只施加一次。
    let grid = Grid::new(8, 8, 1.0 / 8.0);
    let params = SolverParams {
        dt_max: 0.01,
        ..Default::default()
    };
    let mut sim = Simulation::new(grid, params).unwrap();
    sim.init();
    sim.a.x.fill(2.0);

    let mut sched = Scheduler::new();
    for _ in 0..3 {
        sim.step(&mut sched);
    }

    // 速度远低于 CFL 限，dt 恒取 dt_max
    assert_relative_eq!(sim.t, 0.03, epsilon = 1e-12);
    for j in 0..8 {
        for i in 0..8 {
            assert_relative_eq!(sim.u.x.get(i, j), 3.0 * 0.01 * 2.0, epsilon = 1e-7);
            assert_relative_eq!(sim.p.get(i, j), 0.0, epsilon = 1e-7);
        }
    }
    assert_relative_eq!(sim.g.x.get(4, 4), 2.0, epsilon = 1e-7);
}

#[test]
fn test_tracer_advection_hook_runs_in_phase() {
    // 示踪剂作为驱动方状态，经 TracerAdvection 钩子输运
    let grid = Grid::new(8, 8, 1.0 / 8.0);
    let params = SolverParams {
        dt_max: 0.01,
        ..Default::default()
    };
    let mut sim = Simulation::new(grid, params).unwrap();
    sim.u.x.fill(1.0);
    sim.init();

    let tracer = Rc::new(RefCell::new(CellField::zeros(8, 8)));
    tracer.borrow_mut().set(2, 4, 1.0);
    tracer.borrow_mut().fill_ghosts_symmetric();

    let mut sched = Scheduler::new();
    let t = tracer.clone();
    sched.add_hook(Phase::TracerAdvection, move |sim| {
        let ef = cf_solver::EmbedFields {
            cs: &sim.cs,
            fs: &sim.fs,
        };
        let mut f = t.borrow_mut();
        cf_solver::advection::advect(
            &ef,
            &mut f,
            &cf_solver::FieldMeta::tracer(),
            &sim.uf,
            &Upwind,
            sim.dt,
            &sim.grid,
            None,
        );
        f.fill_ghosts_symmetric();
    });

    let m0 = tracer.borrow().sum_interior();
    for _ in 0..4 {
        sim.step(&mut sched);
    }
    let f = tracer.borrow();
    // 正向输运：上游衰减、下游增长，总量守恒（无通量出域）
    assert!(f.get(3, 4) > 0.0);
    assert_relative_eq!(f.sum_interior(), m0, epsilon = 1e-12);
}
