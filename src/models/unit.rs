//! # 单元操作数据模型
//!
//! 定义流程图中的单元（反应器、换热器、精馏塔等）。
//!
//! ## 命名规则
//! - 单元名称是流程图内的唯一键，例如 `hex-1`, `dist-2`, `r`
//! - 单元类型为去掉末尾 `-<数字>` 后缀的名称 (`hex-1` → `hex`)
//!
//! ## 依赖关系
//! - 被 `models/flowsheet.rs` 和 `sfiles/` 使用
//! - 使用 `regex` 拆分编号后缀

use crate::error::{Result, SfilesError};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn numbered_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)-(\d+)$").expect("static regex"))
}

/// 单元操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// 唯一名称
    pub name: String,

    /// 单元类型（名称去掉编号）
    pub unit_type: String,
}

impl Unit {
    /// 从名称创建单元，校验名称合法性
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        validate_unit_name(name)?;

        Ok(Unit {
            name: name.to_string(),
            unit_type: unit_type_of(name).to_string(),
        })
    }
}

/// 校验单元名称
pub fn validate_unit_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|c| c == '(' || c == ')' || c == ',' || c.is_whitespace());

    if invalid {
        return Err(SfilesError::InvalidUnitName(name.to_string()));
    }
    Ok(())
}

/// 拆分 `type-N` 形式的名称
pub fn split_numbered(name: &str) -> Option<(&str, u32)> {
    let caps = numbered_name_regex().captures(name)?;
    let number = caps.get(2)?.as_str().parse().ok()?;
    Some((caps.get(1)?.as_str(), number))
}

/// 名称对应的单元类型
pub fn unit_type_of(name: &str) -> &str {
    split_numbered(name).map(|(t, _)| t).unwrap_or(name)
}

/// 组合用户输入的类型与名称
///
/// 类型非空且名称中没有 `-` 时得到 `type-name`，否则直接使用名称。
pub fn compose_unit_name(unit_type: &str, name: &str) -> String {
    let unit_type = unit_type.trim();
    let name = name.trim();
    if !unit_type.is_empty() && !name.contains('-') {
        format!("{}-{}", unit_type, name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_type_from_numbered_name() {
        let unit = Unit::new("hex-12").unwrap();
        assert_eq!(unit.unit_type, "hex");
        assert_eq!(split_numbered(&unit.name), Some(("hex", 12)));
    }

    #[test]
    fn test_unit_type_without_number() {
        let unit = Unit::new("r").unwrap();
        assert_eq!(unit.unit_type, "r");
        assert_eq!(split_numbered(&unit.name), None);

        // 末尾不是纯数字时整个名称都是类型
        assert_eq!(unit_type_of("hot-in"), "hot-in");
        assert_eq!(unit_type_of("pp-1-2"), "pp-1");
    }

    #[test]
    fn test_invalid_unit_names() {
        assert!(Unit::new("").is_err());
        assert!(Unit::new("   ").is_err());
        assert!(Unit::new("a(b").is_err());
        assert!(Unit::new("two words").is_err());
        assert!(Unit::new("a,b").is_err());
    }

    #[test]
    fn test_compose_unit_name() {
        assert_eq!(compose_unit_name("dist", "1"), "dist-1");
        assert_eq!(compose_unit_name("dist", "dist-1"), "dist-1");
        assert_eq!(compose_unit_name("", "feed"), "feed");
        assert_eq!(compose_unit_name("  ", "feed"), "feed");
    }
}
