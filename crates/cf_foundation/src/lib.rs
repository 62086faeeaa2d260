// crates/cf_foundation/src/lib.rs

//! CutFlow Foundation Layer
//!
//! 基础层，提供整个工作区共享的基础抽象：
//!
//! - [`error`]: 统一错误类型
//! - [`float`]: 数值常量与安全浮点运算
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 thiserror
//! 2. **快速失败**: 非法配置在构造期报错，而非在数值循环中
//! 3. **几何退化不报错**: 数值退化一律由上层以降阶公式优雅处理，
//!    本层只提供正则化常量

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;

pub use error::{CfError, CfResult};
pub use float::{clamp01, safe_div, SEPS};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{CfError, CfResult};
    pub use crate::float::{clamp01, safe_div, DEFAULT_TOLERANCE, SEPS};
}
