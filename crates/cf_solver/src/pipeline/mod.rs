// crates/cf_solver/src/pipeline/mod.rs

//! 分步投影时间积分管线
//!
//! - [`schedule`]: 相位调度与钩子注册
//! - [`timestep`]: 对流 CFL 时间步估计
//! - [`centered`]: 管线状态对象 [`centered::Simulation`] 与
//!   单步推进

pub mod centered;
pub mod schedule;
pub mod timestep;

use cf_foundation::error::{CfError, CfResult};
use serde::{Deserialize, Serialize};

/// 管线数值参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverParams {
    /// CFL 数
    pub cfl: f64,
    /// 时间步上限
    pub dt_max: f64,
    /// 时间步下限
    pub dt_min: f64,
    /// 迭代求解容差
    pub tolerance: f64,
    /// 迭代求解上限
    pub max_iterations: usize,
    /// Stokes 模式：跳过对流（含预测与半步投影）
    pub stokes: bool,
    /// 分数清理的最小面开度
    pub smin: f64,
    /// 物理密度（常物性）
    pub rho: f64,
    /// 物理动力粘性系数（常物性，0 关闭粘性步）
    pub mu: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            cfl: 0.5,
            dt_max: 1e10,
            dt_min: 1e-12,
            tolerance: cf_foundation::float::DEFAULT_TOLERANCE,
            max_iterations: cf_foundation::float::DEFAULT_MAX_ITERATIONS,
            stokes: false,
            smin: 1e-14,
            rho: 1.0,
            mu: 0.0,
        }
    }
}

impl SolverParams {
    /// 参数校验，无效配置立即报错
    pub fn validate(&self) -> CfResult<()> {
        CfError::ensure_in_range("cfl", self.cfl, 1e-6, 1.0)?;
        CfError::ensure_in_range("dt_min", self.dt_min, 0.0, self.dt_max)?;
        CfError::ensure_in_range("tolerance", self.tolerance, f64::MIN_POSITIVE, 1.0)?;
        CfError::ensure_in_range("rho", self.rho, f64::MIN_POSITIVE, f64::MAX)?;
        CfError::ensure_in_range("mu", self.mu, 0.0, f64::MAX)?;
        if self.max_iterations == 0 {
            return Err(CfError::config("max_iterations 必须为正"));
        }
        Ok(())
    }
}
