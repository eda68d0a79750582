//! # 查看与导入导出 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/show.rs`, `commands/import.rs`, `commands/export.rs`

use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};

/// show 参数
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Print unit types instead of unit names
    #[arg(short, long, default_value_t = false)]
    pub generalized: bool,
}

/// import 参数
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// SFILES (or .json) file to import; `-` reads stdin
    #[arg(conflicts_with = "string")]
    pub path: Option<PathBuf>,

    /// SFILES string to import
    #[arg(short, long)]
    pub string: Option<String>,
}

/// 导出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExportFormat {
    /// SFILES 2.0 with unit names
    Sfiles,
    /// SFILES 2.0 with unit types only
    Generalized,
    /// Units and streams as JSON
    Json,
    /// Stream list as CSV (from, to, kind, tags)
    Csv,
    /// Graphviz DOT
    Dot,
}

impl ExportFormat {
    /// 根据扩展名推断格式
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => ExportFormat::Json,
            Some("csv") => ExportFormat::Csv,
            Some("dot") | Some("gv") => ExportFormat::Dot,
            _ => ExportFormat::Sfiles,
        }
    }
}

/// export 参数
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from extension if not specified)
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("a.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("a.gv")), ExportFormat::Dot);
        assert_eq!(ExportFormat::from_path(Path::new("a.sfiles")), ExportFormat::Sfiles);
        assert_eq!(ExportFormat::from_path(Path::new("plant")), ExportFormat::Sfiles);
    }
}
