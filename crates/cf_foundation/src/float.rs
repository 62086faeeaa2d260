// crates/cf_foundation/src/float.rs

//! 数值常量与安全浮点运算
//!
//! 提供切割单元求解器所需的正则化常量与安全除法。
//!
//! # 设计目标
//!
//! 1. **无分支正则化**: 完全封闭面的零度量以小 epsilon 正则化，
//!    而不是在每处除法前分支判断
//! 2. **确定性**: 不引入任何依赖遍历顺序的运算

/// 度量正则化小量
///
/// 用于完全封闭面（度量为零）的除法正则化。
pub const SEPS: f64 = 1e-30;

/// 浮点相等性比较的默认容差
pub const DEFAULT_EPSILON: f64 = 1e-14;

/// 迭代求解器的默认收敛容差
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// 迭代求解器的默认最大迭代次数
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// 安全除法
///
/// 分母绝对值小于 [`SEPS`] 时返回 0，避免产生 Inf/NaN。
#[inline]
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den.abs() < SEPS {
        0.0
    } else {
        num / den
    }
}

/// 裁剪到 [0, 1]
///
/// 体积/面开度分数的合法范围。
#[inline]
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// 二值符号函数：正为 1，否则为 -1
///
/// 注意 `isign(0.0) == -1`，与中心差分权重的退化路径一致。
#[inline]
pub fn isign(x: f64) -> i32 {
    if x > 0.0 {
        1
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(1.0, 2.0), 0.5);
        assert_eq!(safe_div(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_isign() {
        assert_eq!(isign(0.5), 1);
        assert_eq!(isign(-0.5), -1);
        assert_eq!(isign(0.0), -1);
    }

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.1), 0.0);
        assert_eq!(clamp01(0.4), 0.4);
        assert_eq!(clamp01(1.7), 1.0);
    }
}
