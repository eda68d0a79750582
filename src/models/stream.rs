//! # 物流数据模型
//!
//! 定义连接单元的物流（stream）及其标签。
//!
//! ## 标签类别
//! - `he`: 换热器通道编号（纯数字，如 `1`, `2`）
//! - `col`: 精馏塔出口（`tout`, `bout`）及用户自定义标签
//! - `signal`: 控制信号标签（`next_unitop`, `not_next_unitop`）
//!
//! ## 依赖关系
//! - 被 `models/flowsheet.rs` 和 `sfiles/` 使用

use crate::error::{Result, SfilesError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// 标签类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCategory {
    He,
    Col,
    Signal,
}

impl TagCategory {
    /// 根据标签文本判断类别
    pub fn classify(tag: &str) -> Self {
        if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_digit()) {
            TagCategory::He
        } else if tag == "next_unitop" || tag == "not_next_unitop" {
            TagCategory::Signal
        } else {
            TagCategory::Col
        }
    }
}

/// 物流标签集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTags {
    pub he: Vec<String>,
    pub col: Vec<String>,
    pub signal: Vec<String>,
}

impl StreamTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析逗号分隔的标签，例如 `"hot_in, cold_out"`
    pub fn from_csv(input: &str) -> Result<Self> {
        let mut tags = StreamTags::new();
        for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            tags.push(tag)?;
        }
        Ok(tags)
    }

    /// 按类别加入单个标签（重复标签忽略）
    pub fn push(&mut self, tag: &str) -> Result<()> {
        let tag = tag.trim();
        if tag.is_empty() || tag.contains(['{', '}', ',']) {
            return Err(SfilesError::InvalidTag(tag.to_string()));
        }

        let bucket = match TagCategory::classify(tag) {
            TagCategory::He => &mut self.he,
            TagCategory::Col => &mut self.col,
            TagCategory::Signal => &mut self.signal,
        };
        if !bucket.iter().any(|t| t == tag) {
            bucket.push(tag.to_string());
        }
        Ok(())
    }

    /// 按 he, col, signal 顺序遍历所有标签
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.he
            .iter()
            .chain(self.col.iter())
            .chain(self.signal.iter())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.he.is_empty() && self.col.is_empty() && self.signal.is_empty()
    }
}

impl fmt::Display for StreamTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.all().collect::<Vec<_>>().join(", "))
    }
}

/// 物流类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// 物料/能量流
    #[default]
    Material,
    /// 控制信号
    Signal,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Material => write!(f, "material"),
            StreamKind::Signal => write!(f, "signal"),
        }
    }
}

/// 有向物流：from → to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub kind: StreamKind,
    #[serde(default)]
    pub tags: StreamTags,
}

impl Stream {
    pub fn new(from: impl Into<String>, to: impl Into<String>, tags: StreamTags) -> Self {
        Stream {
            from: from.into(),
            to: to.into(),
            kind: StreamKind::Material,
            tags,
        }
    }

    pub fn signal(from: impl Into<String>, to: impl Into<String>, tags: StreamTags) -> Self {
        Stream {
            kind: StreamKind::Signal,
            ..Stream::new(from, to, tags)
        }
    }

    pub fn is_signal(&self) -> bool {
        self.kind == StreamKind::Signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_classification() {
        assert_eq!(TagCategory::classify("1"), TagCategory::He);
        assert_eq!(TagCategory::classify("12"), TagCategory::He);
        assert_eq!(TagCategory::classify("tout"), TagCategory::Col);
        assert_eq!(TagCategory::classify("hot_in"), TagCategory::Col);
        assert_eq!(TagCategory::classify("not_next_unitop"), TagCategory::Signal);
    }

    #[test]
    fn test_tags_from_csv() {
        let tags = StreamTags::from_csv(" hot_in, ,2,cold_out,hot_in ").unwrap();
        assert_eq!(tags.he, vec!["2"]);
        assert_eq!(tags.col, vec!["hot_in", "cold_out"]);
        assert!(tags.signal.is_empty());
        assert_eq!(tags.all().count(), 3);
        assert_eq!(tags.to_string(), "2, hot_in, cold_out");
    }

    #[test]
    fn test_empty_tags() {
        let tags = StreamTags::from_csv("").unwrap();
        assert!(tags.is_empty());
        assert_eq!(tags.to_string(), "");
    }

    #[test]
    fn test_invalid_tag() {
        let mut tags = StreamTags::new();
        assert!(tags.push("a{b").is_err());
        assert!(tags.push("").is_err());
    }
}
