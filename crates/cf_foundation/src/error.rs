// crates/cf_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `CfError` 枚举和 `CfResult` 类型别名。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，求解器相关错误在 cf_solver 中扩展
//! 2. **快速失败**: 非法配置（如 CFL 超界）在构建期报错
//! 3. **不中断模拟**: 几何退化与迭代不收敛不属于错误，
//!    由调用方降级处理并记录日志

use thiserror::Error;

/// 统一结果类型
pub type CfResult<T> = Result<T, CfError>;

/// CutFlow 错误类型
#[derive(Error, Debug)]
pub enum CfError {
    /// 非法配置
    #[error("非法配置: {message}")]
    InvalidConfig {
        /// 说明非法原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },
}

impl CfError {
    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// 范围检查，失败返回 `OutOfRange`
    pub fn ensure_in_range(field: &'static str, value: f64, min: f64, max: f64) -> CfResult<()> {
        if value < min || value > max || !value.is_finite() {
            return Err(Self::OutOfRange {
                field,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_in_range() {
        assert!(CfError::ensure_in_range("cfl", 0.8, 0.0, 1.0).is_ok());
        assert!(CfError::ensure_in_range("cfl", 1.5, 0.0, 1.0).is_err());
        assert!(CfError::ensure_in_range("cfl", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = CfError::config("测试");
        assert!(err.to_string().contains("测试"));
    }
}
