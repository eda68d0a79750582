//! # SFILES 2.0 解析器
//!
//! 将 SFILES 字符串解析为 `Flowsheet` 有向图。
//!
//! ## 语法
//! ```text
//! sfiles    := sequence ('n|' sequence)*
//! sequence  := element+
//! element   := tag* unit post*
//! post      := tag* RecycleOut | RecycleIn | tag* SignalOut | SignalIn
//!            | '[' sequence ']'
//!            | '<&|' sequence tag* '&|'
//! ```
//!
//! ## 语义
//! - 主线上相邻单元之间为物料流，单元前的标签标注该物流
//! - `[...]` 中第一个单元由分支所属单元供料，主线从所属单元继续
//! - `<&|...&|` 中主线最后一个单元流入所属单元
//! - `n` 与 `<n` 成对构成循环物流，`_n` 与 `<_n` 成对构成信号流
//! - 未编号且重复出现的单元名按出现顺序编号 (`hex` → `hex-1`, `hex-2`)
//!
//! ## 依赖关系
//! - 被 `sfiles/mod.rs` 使用
//! - 使用 `sfiles/lexer.rs`, `models/`

use super::lexer::{ring_label, Lexer, Token, TokenKind};
use crate::error::{Result, SfilesError};
use crate::models::unit::split_numbered;
use crate::models::{Flowsheet, Stream, StreamTags};

use std::collections::{HashMap, HashSet};

/// 解析 SFILES 字符串
pub fn parse_sfiles(input: &str) -> Result<Flowsheet> {
    let tokens = Lexer::new(input).tokenize()?;
    tracing::debug!(tokens = tokens.len(), "tokenized SFILES input");

    let mut parser = Parser::new(&tokens, input.len());
    parser.parse_document()?;
    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RingKind {
    Recycle,
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingEnd {
    Source,
    Target,
}

/// 尚未配对的循环/信号编号
struct OpenRing {
    end: RingEnd,
    unit: String,
    tags: StreamTags,
    position: usize,
}

/// 一条主线解析结果
struct SequenceInfo {
    last: String,
    /// 末尾未被单元消耗的标签（仅汇合块内合法）
    trailing: StreamTags,
}

/// 单元命名器：为重复出现的未编号名称分配编号
struct UnitNamer {
    bare_counts: HashMap<String, usize>,
    used_numbers: HashMap<String, HashSet<u32>>,
    next_number: HashMap<String, u32>,
}

impl UnitNamer {
    fn from_tokens(tokens: &[Token]) -> Self {
        let mut bare_counts: HashMap<String, usize> = HashMap::new();
        let mut used_numbers: HashMap<String, HashSet<u32>> = HashMap::new();

        for token in tokens {
            if let TokenKind::Unit(name) = &token.kind {
                match split_numbered(name) {
                    Some((unit_type, n)) => {
                        used_numbers
                            .entry(unit_type.to_string())
                            .or_default()
                            .insert(n);
                    }
                    None => *bare_counts.entry(name.clone()).or_insert(0) += 1,
                }
            }
        }

        UnitNamer {
            bare_counts,
            used_numbers,
            next_number: HashMap::new(),
        }
    }

    fn resolve(&mut self, raw: &str) -> String {
        if split_numbered(raw).is_some() || self.bare_counts.get(raw).copied().unwrap_or(0) <= 1 {
            return raw.to_string();
        }

        let used = self.used_numbers.entry(raw.to_string()).or_default();
        let next = self.next_number.entry(raw.to_string()).or_insert(1);
        while used.contains(next) {
            *next += 1;
        }
        used.insert(*next);
        format!("{}-{}", raw, next)
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    input_len: usize,
    flowsheet: Flowsheet,
    namer: UnitNamer,
    open_rings: HashMap<(RingKind, u32), OpenRing>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token], input_len: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            input_len,
            flowsheet: Flowsheet::new(),
            namer: UnitNamer::from_tokens(tokens),
            open_rings: HashMap::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // 记号游标
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.position)
            .unwrap_or(self.input_len)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn error<T>(&self, reason: impl Into<String>) -> Result<T> {
        Err(SfilesError::Syntax {
            position: self.position(),
            reason: reason.into(),
        })
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        if self.peek() == Some(&kind) {
            self.advance();
            Ok(())
        } else {
            self.error(format!("expected {}", what))
        }
    }

    fn collect_tags(&mut self) -> Result<StreamTags> {
        let mut tags = StreamTags::new();
        while let Some(TokenKind::Tag(tag)) = self.peek() {
            tags.push(tag)?;
            self.advance();
        }
        Ok(tags)
    }

    // ─────────────────────────────────────────────────────────────
    // 语法规则
    // ─────────────────────────────────────────────────────────────

    fn parse_document(&mut self) -> Result<()> {
        if self.tokens.is_empty() {
            return Ok(());
        }

        loop {
            let info = self.parse_sequence(None)?;
            if !info.trailing.is_empty() {
                return self.error("stream tags must be followed by a unit");
            }

            match self.peek() {
                Some(TokenKind::Separator) => self.advance(),
                None => return Ok(()),
                Some(other) => return self.error(format!("unexpected {:?}", other)),
            }
        }
    }

    /// 解析一条主线；`entry` 为供料给第一个单元的分支所属单元
    fn parse_sequence(&mut self, entry: Option<&str>) -> Result<SequenceInfo> {
        let mut tags = self.collect_tags()?;
        let mut prev: Option<String> = None;

        while let Some(TokenKind::Unit(raw)) = self.peek() {
            let position = self.position();
            let name = self.namer.resolve(raw);
            self.flowsheet.add_unit(&name)?;
            self.advance();

            match (prev.as_deref(), entry) {
                (Some(from), _) | (None, Some(from)) => {
                    self.connect(Stream::new(from, name.as_str(), tags), position)?
                }
                (None, None) if !tags.is_empty() => {
                    return Err(SfilesError::Syntax {
                        position,
                        reason: "stream tags without an upstream unit".to_string(),
                    });
                }
                (None, None) => {}
            }

            tags = self.parse_post_items(&name)?;
            prev = Some(name);
        }

        match prev {
            Some(last) => Ok(SequenceInfo {
                last,
                trailing: tags,
            }),
            None => self.error("expected a unit"),
        }
    }

    /// 解析单元之后的标记，返回留给下一个单元的标签
    fn parse_post_items(&mut self, unit: &str) -> Result<StreamTags> {
        loop {
            let tags = self.collect_tags()?;
            let position = self.position();

            match self.peek() {
                Some(TokenKind::RecycleOut(n)) => {
                    self.advance();
                    self.ring(RingKind::Recycle, RingEnd::Source, *n, unit, tags, position)?;
                }
                Some(TokenKind::SignalOut(n)) => {
                    self.advance();
                    self.ring(RingKind::Signal, RingEnd::Source, *n, unit, tags, position)?;
                }
                Some(TokenKind::RecycleIn(n)) | Some(TokenKind::SignalIn(n)) => {
                    if !tags.is_empty() {
                        return self.error("stream tags belong before the recycle source number");
                    }
                    let kind = match self.peek() {
                        Some(TokenKind::SignalIn(_)) => RingKind::Signal,
                        _ => RingKind::Recycle,
                    };
                    self.advance();
                    self.ring(kind, RingEnd::Target, *n, unit, tags, position)?;
                }
                Some(TokenKind::BranchOpen) => {
                    if !tags.is_empty() {
                        return self.error("branch stream tags belong inside the brackets");
                    }
                    self.advance();
                    let info = self.parse_sequence(Some(unit))?;
                    if !info.trailing.is_empty() {
                        return self.error("stream tags must be followed by a unit");
                    }
                    self.expect(TokenKind::BranchClose, "']' to close the branch")?;
                }
                Some(TokenKind::JoinOpen) => {
                    if !tags.is_empty() {
                        return self.error("join stream tags belong before '&|'");
                    }
                    self.advance();
                    let info = self.parse_sequence(None)?;
                    let close_position = self.position();
                    self.expect(TokenKind::JoinClose, "'&|' to close the join")?;
                    self.connect(Stream::new(info.last, unit, info.trailing), close_position)?;
                }
                _ => return Ok(tags),
            }
        }
    }

    /// 处理循环/信号编号，配对时生成物流
    fn ring(
        &mut self,
        kind: RingKind,
        end: RingEnd,
        number: u32,
        unit: &str,
        tags: StreamTags,
        position: usize,
    ) -> Result<()> {
        match self.open_rings.remove(&(kind, number)) {
            None => {
                self.open_rings.insert(
                    (kind, number),
                    OpenRing {
                        end,
                        unit: unit.to_string(),
                        tags,
                        position,
                    },
                );
                Ok(())
            }
            Some(open) if open.end != end => {
                let (from, to, tags) = match end {
                    RingEnd::Source => (unit.to_string(), open.unit, tags),
                    RingEnd::Target => (open.unit, unit.to_string(), open.tags),
                };
                let stream = match kind {
                    RingKind::Recycle => Stream::new(from, to, tags),
                    RingKind::Signal => Stream::signal(from, to, tags),
                };
                self.connect(stream, position)
            }
            Some(open) => Err(SfilesError::Syntax {
                position,
                reason: format!(
                    "number {} is already open at position {}",
                    ring_label(number),
                    open.position
                ),
            }),
        }
    }

    fn connect(&mut self, stream: Stream, position: usize) -> Result<()> {
        self.flowsheet
            .insert_stream(stream)
            .map_err(|e| match e {
                SfilesError::SelfLoop(unit) => SfilesError::Syntax {
                    position,
                    reason: format!("stream connects unit '{}' to itself", unit),
                },
                other => other,
            })
    }

    fn finish(self) -> Result<Flowsheet> {
        let unclosed = self
            .open_rings
            .iter()
            .min_by_key(|(_, open)| open.position)
            .map(|((kind, number), _)| match kind {
                RingKind::Recycle => ring_label(*number),
                RingKind::Signal => format!("_{}", ring_label(*number)),
            });

        if let Some(number) = unclosed {
            return Err(SfilesError::UnclosedRing { number });
        }

        tracing::debug!(
            units = self.flowsheet.unit_count(),
            streams = self.flowsheet.stream_count(),
            "parsed SFILES"
        );
        Ok(self.flowsheet)
    }
}
