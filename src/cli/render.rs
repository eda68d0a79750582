//! # render / validate 子命令 CLI 定义
//!
//! 两个命令都接受单个文件或目录（批处理模式）。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/render.rs`, `commands/validate.rs`

use crate::batch::collector::DEFAULT_PATTERN;

use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};

/// 图像输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG bitmap
    Png,
    /// SVG vector image
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    /// 根据扩展名推断格式（默认 PNG）
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ImageFormat::Svg,
            _ => ImageFormat::Png,
        }
    }
}

/// render 参数
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Input: SFILES file or directory (defaults to the flowsheet file)
    pub input: Option<PathBuf>,

    /// Output: image path (single mode) or directory (batch mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image format (auto-detected from extension if not specified)
    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Image title
    #[arg(long, default_value = "Current Flowsheet Graph")]
    pub title: String,

    /// File patterns for directory input (comma-separated)
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Search directories recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = number of CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing images in batch mode
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

/// validate 参数
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// SFILES file or directory
    pub input: PathBuf,

    /// File patterns for directory input (comma-separated)
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Search directories recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = number of CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
