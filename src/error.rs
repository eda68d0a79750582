//! # 统一错误处理模块
//!
//! 定义 sfbuilder 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// sfbuilder 统一错误类型
#[derive(Error, Debug)]
pub enum SfilesError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("File already exists: {path} (use --force to overwrite)")]
    FileExists { path: String },

    // ─────────────────────────────────────────────────────────────
    // SFILES 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid SFILES at position {position}: {reason}")]
    Syntax { position: usize, reason: String },

    #[error("Recycle number {number} is never closed")]
    UnclosedRing { number: String },

    // ─────────────────────────────────────────────────────────────
    // 流程图编辑错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unit '{0}' already exists")]
    DuplicateUnit(String),

    #[error("Unknown unit: '{0}'")]
    UnknownUnit(String),

    #[error("No stream from '{from}' to '{to}'")]
    UnknownStream { from: String, to: String },

    #[error("A stream cannot connect unit '{0}' to itself")]
    SelfLoop(String),

    #[error("Invalid unit name '{0}': names must be non-empty and contain no parentheses, commas or whitespace")]
    InvalidUnitName(String),

    #[error("Invalid stream tag '{0}': tags must be non-empty and contain no braces or commas")]
    InvalidTag(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 导出错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SfilesError>;
