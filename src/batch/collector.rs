//! # 文件收集器
//!
//! 根据输入路径和模式收集待处理的 SFILES 文件。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - 逗号分隔的多个 glob 模式
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/render.rs`、`commands/validate.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{Result, SfilesError};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认匹配模式
pub const DEFAULT_PATTERN: &str = "*.sfiles,*.txt";

/// 文件收集器
pub struct FileCollector {
    input: PathBuf,
    patterns: Vec<glob::Pattern>,
    recursive: bool,
}

impl FileCollector {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                glob::Pattern::new(s).map_err(|e| {
                    SfilesError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        tracing::debug!(input = %self.input.display(), count = files.len(), "collected files");
        files
    }

    /// 无模式时匹配所有文件
    fn matches_patterns(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, "(a)(b)\n").unwrap();
    }

    #[test]
    fn test_collect_with_patterns() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.sfiles"));
        touch(&dir.path().join("a.sfiles"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("image.png"));

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern(DEFAULT_PATTERN)
            .unwrap()
            .collect();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.sfiles", "b.sfiles", "notes.txt"]);
    }

    #[test]
    fn test_recursive_collect() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("plants");
        fs::create_dir(&sub).unwrap();
        touch(&dir.path().join("top.sfiles"));
        touch(&sub.join("nested.sfiles"));

        let flat = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.sfiles")
            .unwrap()
            .collect();
        assert_eq!(flat.len(), 1);

        let deep = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.sfiles")
            .unwrap()
            .recursive(true)
            .collect();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_single_file_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.dat");
        touch(&path);

        // 单文件输入不受模式限制
        let collector = FileCollector::new(path.clone()).with_pattern("*.sfiles").unwrap();
        assert_eq!(collector.collect(), vec![path]);
    }

    #[test]
    fn test_invalid_pattern() {
        let result = FileCollector::new(PathBuf::from(".")).with_pattern("[*.sfiles");
        assert!(matches!(result, Err(SfilesError::InvalidArgument(_))));
    }
}
