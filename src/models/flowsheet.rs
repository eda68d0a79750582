//! # 流程图数据模型
//!
//! 以有向图表示化工流程：节点为单元，边为物流。
//!
//! ## 不变量
//! - 单元按插入顺序保存，名称唯一
//! - 每个有序单元对 `(from, to)` 至多一条物流
//! - 物流两端必须是已存在的不同单元
//! - 所有编辑操作要么完全生效，要么不改变流程图
//!
//! ## 依赖关系
//! - 被 `sfiles/`, `render/`, `commands/` 使用
//! - 使用 `indexmap` 保持插入顺序

use super::stream::{Stream, StreamKind, StreamTags};
use super::unit::{compose_unit_name, Unit};
use crate::error::{Result, SfilesError};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

type StreamKey = (String, String);

/// 流程图
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "FlowsheetRecord", try_from = "FlowsheetRecord")]
pub struct Flowsheet {
    units: IndexMap<String, Unit>,
    streams: IndexMap<StreamKey, Stream>,
}

impl Flowsheet {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────
    // 查询
    // ─────────────────────────────────────────────────────────────

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn contains_unit(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn unit_names(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }

    pub fn streams(&self) -> impl Iterator<Item = &Stream> {
        self.streams.values()
    }

    pub fn stream(&self, from: &str, to: &str) -> Option<&Stream> {
        self.streams.get(&(from.to_string(), to.to_string()))
    }

    /// 从 `name` 出发的物流（插入顺序）
    pub fn outgoing<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Stream> + 'a {
        self.streams.values().filter(move |s| s.from == name)
    }

    /// 进入 `name` 的物流（插入顺序）
    pub fn incoming<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Stream> + 'a {
        self.streams.values().filter(move |s| s.to == name)
    }

    pub fn successors<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        self.outgoing(name).map(|s| s.to.as_str()).collect()
    }

    pub fn predecessors<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        self.incoming(name).map(|s| s.from.as_str()).collect()
    }

    /// 是否存在 from ⇒ to 的有向路径（任意物流类型）
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        if !self.contains_unit(from) || !self.contains_unit(to) {
            return false;
        }

        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.extend(self.successors(current));
        }
        false
    }

    /// 物料流是否构成环路
    pub fn has_cycle(&self) -> bool {
        self.streams
            .values()
            .filter(|s| s.kind == StreamKind::Material)
            .any(|s| self.has_material_path(&s.to, &s.from))
    }

    fn has_material_path(&self, from: &str, to: &str) -> bool {
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.extend(
                self.outgoing(current)
                    .filter(|s| s.kind == StreamKind::Material)
                    .map(|s| s.to.as_str()),
            );
        }
        false
    }

    // ─────────────────────────────────────────────────────────────
    // 单元编辑
    // ─────────────────────────────────────────────────────────────

    /// 添加单元
    pub fn add_unit(&mut self, name: &str) -> Result<&Unit> {
        let unit = Unit::new(name)?;
        if self.units.contains_key(&unit.name) {
            return Err(SfilesError::DuplicateUnit(unit.name));
        }

        let key = unit.name.clone();
        tracing::debug!(unit = %key, "adding unit");
        Ok(self.units.entry(key).or_insert(unit))
    }

    /// 按类型和名称添加单元，返回最终名称
    pub fn add_unit_typed(&mut self, unit_type: &str, name: &str) -> Result<String> {
        let final_name = compose_unit_name(unit_type, name);
        self.add_unit(&final_name).map(|u| u.name.clone())
    }

    /// 删除单元及其所有物流
    pub fn remove_unit(&mut self, name: &str) -> Result<Unit> {
        let unit = self
            .units
            .shift_remove(name)
            .ok_or_else(|| SfilesError::UnknownUnit(name.to_string()))?;

        self.streams.retain(|_, s| s.from != name && s.to != name);
        tracing::debug!(unit = name, "removed unit");
        Ok(unit)
    }

    // ─────────────────────────────────────────────────────────────
    // 物流编辑
    // ─────────────────────────────────────────────────────────────

    /// 添加物料流；同一 (from, to) 已存在时替换其标签
    pub fn add_stream(&mut self, from: &str, to: &str, tags: StreamTags) -> Result<()> {
        self.insert_stream(Stream::new(from, to, tags))
    }

    /// 添加控制信号流
    pub fn add_signal(&mut self, from: &str, to: &str, tags: StreamTags) -> Result<()> {
        self.insert_stream(Stream::signal(from, to, tags))
    }

    /// 插入物流（校验端点）
    pub fn insert_stream(&mut self, stream: Stream) -> Result<()> {
        self.check_endpoints(&stream.from, &stream.to)?;

        tracing::debug!(from = %stream.from, to = %stream.to, kind = %stream.kind, "adding stream");
        let key = (stream.from.clone(), stream.to.clone());
        self.streams.insert(key, stream);
        Ok(())
    }

    /// 删除物流
    pub fn remove_stream(&mut self, from: &str, to: &str) -> Result<Stream> {
        self.streams
            .shift_remove(&(from.to_string(), to.to_string()))
            .ok_or_else(|| SfilesError::UnknownStream {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// 分支：一个单元流向多个单元
    pub fn add_branch(&mut self, from: &str, targets: Vec<(String, StreamTags)>) -> Result<()> {
        if targets.len() < 2 {
            return Err(SfilesError::InvalidArgument(
                "a branch needs at least two target units".to_string(),
            ));
        }
        Self::check_distinct(targets.iter().map(|(t, _)| t.as_str()), "branch targets")?;
        for (to, _) in &targets {
            self.check_endpoints(from, to)?;
        }

        for (to, tags) in targets {
            self.add_stream(from, &to, tags)?;
        }
        Ok(())
    }

    /// 汇合：多个单元流向一个单元
    pub fn add_join(&mut self, sources: Vec<(String, StreamTags)>, to: &str) -> Result<()> {
        if sources.len() < 2 {
            return Err(SfilesError::InvalidArgument(
                "a join needs at least two source units".to_string(),
            ));
        }
        Self::check_distinct(sources.iter().map(|(s, _)| s.as_str()), "join sources")?;
        for (from, _) in &sources {
            self.check_endpoints(from, to)?;
        }

        for (from, tags) in sources {
            self.add_stream(&from, to, tags)?;
        }
        Ok(())
    }

    /// 循环物流：返回该物流是否闭合了一个环路
    pub fn add_recycle(&mut self, from: &str, to: &str, tags: StreamTags) -> Result<bool> {
        self.check_endpoints(from, to)?;
        let closes_cycle = self.has_material_path(to, from);
        self.add_stream(from, to, tags)?;
        Ok(closes_cycle)
    }

    fn check_endpoints(&self, from: &str, to: &str) -> Result<()> {
        for name in [from, to] {
            if !self.units.contains_key(name) {
                return Err(SfilesError::UnknownUnit(name.to_string()));
            }
        }
        if from == to {
            return Err(SfilesError::SelfLoop(from.to_string()));
        }
        Ok(())
    }

    fn check_distinct<'a>(names: impl Iterator<Item = &'a str>, what: &str) -> Result<()> {
        let mut seen = IndexSet::new();
        for name in names {
            if !seen.insert(name) {
                return Err(SfilesError::InvalidArgument(format!(
                    "{} must be distinct, '{}' appears twice",
                    what, name
                )));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// 序列化表示
// ─────────────────────────────────────────────────────────────

/// JSON 中的流程图表示
#[derive(Serialize, Deserialize)]
struct FlowsheetRecord {
    units: Vec<Unit>,
    streams: Vec<Stream>,
}

impl From<Flowsheet> for FlowsheetRecord {
    fn from(fs: Flowsheet) -> Self {
        FlowsheetRecord {
            units: fs.units.into_values().collect(),
            streams: fs.streams.into_values().collect(),
        }
    }
}

impl TryFrom<FlowsheetRecord> for Flowsheet {
    type Error = SfilesError;

    fn try_from(record: FlowsheetRecord) -> Result<Self> {
        let mut fs = Flowsheet::new();
        for unit in &record.units {
            fs.add_unit(&unit.name)?;
        }
        for mut stream in record.streams {
            // 重新校验并归类标签
            let mut tags = StreamTags::new();
            for tag in stream.tags.all() {
                tags.push(tag)?;
            }
            stream.tags = tags;
            fs.insert_stream(stream)?;
        }
        Ok(fs)
    }
}
