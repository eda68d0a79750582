//! # SFILES 2.0 词法分析
//!
//! 将 SFILES 字符串切分为记号流。
//!
//! ## 记号
//! ```text
//! (name)    单元            {tag}    物流标签
//! [ ]       分支开/闭        <&| &|   汇合开/闭
//! 1  %12    循环物流起点     <1 <%12  循环物流终点
//! %(123)    三位及以上编号
//! _1 _%12   信号起点         <_1      信号终点
//! n|        独立子流程分隔
//! ```
//!
//! ## 依赖关系
//! - 被 `sfiles/parser.rs` 使用

use crate::error::{Result, SfilesError};

/// 记号类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Unit(String),
    Tag(String),
    BranchOpen,
    BranchClose,
    JoinOpen,
    JoinClose,
    RecycleOut(u32),
    RecycleIn(u32),
    SignalOut(u32),
    SignalIn(u32),
    Separator,
}

/// 带位置的记号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// 在输入中的字节偏移
    pub position: usize,
}

/// 词法分析器
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// 切分全部记号
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error<T>(&self, position: usize, reason: impl Into<String>) -> Result<T> {
        Err(SfilesError::Syntax {
            position,
            reason: reason.into(),
        })
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }

        let start = self.pos;
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(None),
        };

        let kind = match c {
            '(' => TokenKind::Unit(self.delimited(start, ')', "unit name")?),
            '{' => TokenKind::Tag(self.delimited(start, '}', "stream tag")?),
            '[' => TokenKind::BranchOpen,
            ']' => TokenKind::BranchClose,
            '<' => {
                if self.peek_str("&|") {
                    self.pos += 2;
                    TokenKind::JoinOpen
                } else if self.peek() == Some('_') {
                    self.bump();
                    TokenKind::SignalIn(self.ring_number()?)
                } else {
                    TokenKind::RecycleIn(self.ring_number()?)
                }
            }
            '&' if self.peek() == Some('|') => {
                self.bump();
                TokenKind::JoinClose
            }
            '_' => TokenKind::SignalOut(self.ring_number()?),
            'n' if self.peek() == Some('|') => {
                self.bump();
                TokenKind::Separator
            }
            '0'..='9' | '%' => {
                self.pos = start;
                TokenKind::RecycleOut(self.ring_number()?)
            }
            other => return self.error(start, format!("unexpected character '{}'", other)),
        };

        Ok(Some(Token {
            kind,
            position: start,
        }))
    }

    /// 读取到结束符为止的内容（不允许嵌套开符号）
    fn delimited(&mut self, start: usize, close: char, what: &str) -> Result<String> {
        let open = self.input[start..].chars().next().unwrap_or(close);
        let body_start = self.pos;

        loop {
            match self.bump() {
                Some(c) if c == close => break,
                Some(c) if c == open => {
                    return self.error(self.pos - c.len_utf8(), format!("nested '{}' in {}", open, what))
                }
                Some(_) => {}
                None => return self.error(start, format!("unterminated {}", what)),
            }
        }

        let body = self.input[body_start..self.pos - close.len_utf8()].trim();
        if body.is_empty() {
            return self.error(start, format!("empty {}", what));
        }
        Ok(body.to_string())
    }

    /// 循环编号：单个数字，`%` 加恰好两位数字，或 `%(nnn)`
    fn ring_number(&mut self) -> Result<u32> {
        let start = self.pos;
        match self.bump() {
            Some(d) if d.is_ascii_digit() => Ok(d.to_digit(10).unwrap_or(0)),
            Some('%') if self.peek() == Some('(') => {
                self.bump();
                let digits_start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                let digits_end = self.pos;
                if self.bump() != Some(')') || digits_end == digits_start {
                    return self.error(start, "expected '%(' followed by digits and ')'");
                }
                let digits = &self.input[digits_start..digits_end];
                digits
                    .parse()
                    .or_else(|_| self.error(start, format!("ring number '%({})' is too large", digits)))
            }
            Some('%') => {
                let digits_start = self.pos;
                for _ in 0..2 {
                    if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        return self.error(start, "'%' must be followed by exactly two digits");
                    }
                    self.bump();
                }
                self.input[digits_start..self.pos]
                    .parse()
                    .or_else(|_| self.error(start, "invalid ring number"))
            }
            _ => self.error(start, "expected a ring number"),
        }
    }
}

/// 编号的文本形式（`1`, `%12`, `%(123)`）
pub fn ring_label(number: u32) -> String {
    match number {
        0..=9 => number.to_string(),
        10..=99 => format!("%{}", number),
        _ => format!("%({})", number),
    }
}
