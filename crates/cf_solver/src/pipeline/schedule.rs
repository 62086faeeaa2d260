// crates/cf_solver/src/pipeline/schedule.rs

//! 相位调度
//!
//! 每个时间步按固定顺序经过 [`Phase`] 列出的相位；内建逻辑
//! 先执行，随后依次运行注册在该相位上的钩子。钩子顺序由
//! (优先级, 注册序号) 决定，同优先级按注册先后保持稳定。
//!
//! 调度器由驱动方持有，不进入 [`Simulation`] 状态对象，
//! 钩子因此可以自由可变访问全部模拟状态。

use super::centered::Simulation;

/// 时间步相位（固定顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// 时间步上限调整
    SetDtMax,
    /// CFL 稳定性（内建：时间步估计）
    Stability,
    /// 体积分数输运（钩子专用）
    Vof,
    /// 示踪剂对流（钩子专用）
    TracerAdvection,
    /// 示踪剂扩散（钩子专用）
    TracerDiffusion,
    /// 物性更新（内建：度量/粘性/比容场重建）
    Properties,
    /// 对流项（内建：预测、半步投影、动量对流）
    AdvectionTerm,
    /// 粘性项（内建：隐式粘性）
    ViscousTerm,
    /// 加速度项（内建：面速度重建）
    Acceleration,
    /// 压力投影（内建：投影与中心梯度）
    Projection,
    /// 步末（钩子专用）
    EndTimestep,
    /// 网格一致性（内建：分数清理与封死面速度清零）
    Adapt,
}

impl Phase {
    /// 全部相位的执行顺序
    pub const ORDER: [Phase; 12] = [
        Phase::SetDtMax,
        Phase::Stability,
        Phase::Vof,
        Phase::TracerAdvection,
        Phase::TracerDiffusion,
        Phase::Properties,
        Phase::AdvectionTerm,
        Phase::ViscousTerm,
        Phase::Acceleration,
        Phase::Projection,
        Phase::EndTimestep,
        Phase::Adapt,
    ];
}

/// 相位钩子
type HookFn = Box<dyn FnMut(&mut Simulation)>;

struct Hook {
    phase: Phase,
    priority: i32,
    seq: usize,
    f: HookFn,
}

/// 钩子调度器
#[derive(Default)]
pub struct Scheduler {
    hooks: Vec<Hook>,
    next_seq: usize,
}

impl Scheduler {
    /// 创建空调度器
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册钩子（默认优先级 0）
    pub fn add_hook<F>(&mut self, phase: Phase, f: F)
    where
        F: FnMut(&mut Simulation) + 'static,
    {
        self.add_hook_with_priority(phase, 0, f);
    }

    /// 按优先级注册钩子，数值小者先执行
    pub fn add_hook_with_priority<F>(&mut self, phase: Phase, priority: i32, f: F)
    where
        F: FnMut(&mut Simulation) + 'static,
    {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.hooks.push(Hook {
            phase,
            priority,
            seq,
            f: Box::new(f),
        });
        self.hooks.sort_by_key(|h| (h.phase as usize, h.priority, h.seq));
    }

    /// 运行某相位的全部钩子
    pub fn run(&mut self, phase: Phase, sim: &mut Simulation) {
        for hook in self.hooks.iter_mut().filter(|h| h.phase == phase) {
            (hook.f)(sim);
        }
    }
}
