// crates/cf_solver/src/fields.rs

//! 场级配置记录
//!
//! 每个场的行为开关以显式配置记录建模（而非隐式属性），
//! 由需要相应行为的组件查询：
//!
//! - `third`: 面算子是否使用高阶切割面修正
//! - `nodump`: 是否排除在输出之外（压力与临时压力默认排除）
//! - `depends_on_fractions`: 细化/重构是否依赖体积分数场

use cf_grid::{CellField, FaceVector};
use serde::{Deserialize, Serialize};

/// 场行为配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldMeta {
    /// 支持高阶（三阶）切割面插值修正
    pub third: bool,
    /// 排除在输出之外
    pub nodump: bool,
    /// 网格自适应时依赖体积分数场
    pub depends_on_fractions: bool,
}

impl FieldMeta {
    /// 速度分量的默认配置：启用切割面修正，依赖分数场
    pub fn velocity() -> Self {
        Self {
            third: true,
            nodump: false,
            depends_on_fractions: true,
        }
    }

    /// 压力场的默认配置：不输出，依赖分数场
    pub fn pressure() -> Self {
        Self {
            third: false,
            nodump: true,
            depends_on_fractions: true,
        }
    }

    /// 示踪剂场的默认配置
    pub fn tracer() -> Self {
        Self {
            third: true,
            nodump: false,
            depends_on_fractions: true,
        }
    }
}

/// 嵌入边界分数场的只读视图
///
/// 体积分数 `cs` 与面开度分数 `fs` 成对出现在所有切割单元
/// 算子的签名里，打包传递。
pub struct EmbedFields<'a> {
    /// 体积分数（0 = 固体, 1 = 流体）
    pub cs: &'a CellField,
    /// 面开度分数
    pub fs: &'a FaceVector,
}
