//! # SFILES 2.0 模块
//!
//! 流程图有向图与 SFILES 2.0 文本之间的双向转换。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `render/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: lexer, parser, writer

pub mod lexer;
pub mod parser;
pub mod writer;

pub use writer::WriteOptions;

use crate::error::{Result, SfilesError};
use crate::models::Flowsheet;
use std::fs;
use std::path::Path;

/// 解析 SFILES 字符串
pub fn parse(input: &str) -> Result<Flowsheet> {
    parser::parse_sfiles(input)
}

/// 生成带完整单元名称的 SFILES 字符串
pub fn write(flowsheet: &Flowsheet) -> String {
    writer::write_sfiles(flowsheet, WriteOptions::default())
}

/// 按选项生成 SFILES 字符串
pub fn write_with(flowsheet: &Flowsheet, options: WriteOptions) -> String {
    writer::write_sfiles(flowsheet, options)
}

/// 从文件读取流程图
pub fn read_file(path: &Path) -> Result<Flowsheet> {
    if !path.exists() {
        return Err(SfilesError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| SfilesError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), "reading flowsheet");
    parse(&content)
}

/// 将流程图写入文件（单行 SFILES + 换行）
pub fn write_file(path: &Path, flowsheet: &Flowsheet) -> Result<()> {
    let content = format!("{}\n", write(flowsheet));
    fs::write(path, content).map_err(|e| SfilesError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), units = flowsheet.unit_count(), "saved flowsheet");
    Ok(())
}

impl Flowsheet {
    /// 从 SFILES 字符串创建流程图
    pub fn from_sfiles(input: &str) -> Result<Self> {
        parse(input)
    }

    /// 转换为 SFILES 字符串
    pub fn to_sfiles(&self) -> String {
        write(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StreamTags;

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.sfiles");

        let mut fs = Flowsheet::from_sfiles("(raw)(mix)<1(r)(splt)1(prod)").unwrap();
        fs.add_unit("prod-2").unwrap();
        fs.add_stream("splt", "prod-2", StreamTags::from_csv("tout").unwrap())
            .unwrap();

        write_file(&path, &fs).unwrap();
        let back = read_file(&path).unwrap();
        assert_eq!(back, fs);
        assert_eq!(back.to_sfiles(), fs.to_sfiles());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_file(&dir.path().join("missing.sfiles")),
            Err(SfilesError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_rewrite_is_stable() {
        let text = "(raw-1)(hex-1){1}(mix-1)<1<&|(raw-2)(hex-2){2}&|(r-1)(splt-1)1(prod-1)";
        let once = parse(text).unwrap().to_sfiles();
        let twice = parse(&once).unwrap().to_sfiles();
        assert_eq!(once, twice);
    }
}
