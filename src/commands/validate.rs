//! # validate 命令
//!
//! 解析单个 SFILES 文件或目录中的所有 SFILES 文件并报告结果。
//!
//! ## 依赖关系
//! - 使用 `cli/render.rs` 定义的 ValidateArgs
//! - 使用 `batch/` 模块进行并行校验
//! - 使用 `sfiles/` 解析

use super::{print_batch_summary, report};
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::render::ValidateArgs;
use crate::error::{Result, SfilesError};
use crate::sfiles;
use crate::utils::output;

use std::path::Path;

pub fn execute(args: ValidateArgs) -> Result<()> {
    if args.input.is_file() {
        let flowsheet = sfiles::read_file(&args.input)?;
        output::print_success(&format!(
            "{}: {} unit(s), {} stream(s)",
            args.input.display(),
            flowsheet.unit_count(),
            flowsheet.stream_count()
        ));
        report(&flowsheet);
        Ok(())
    } else if args.input.is_dir() {
        execute_batch(&args)
    } else {
        Err(SfilesError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

fn execute_batch(args: &ValidateArgs) -> Result<()> {
    output::print_header("SFILES Validation");

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        return Err(SfilesError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }
    output::print_info(&format!("Found {} files", files.len()));

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Running with {} parallel jobs", runner.jobs()));
    let result = runner.run(files, |file| ProcessResult::from_result(file, validate_file(file)))?;

    print_batch_summary(&result);
    if result.failed > 0 {
        return Err(SfilesError::Other(format!(
            "{} of {} file(s) failed validation",
            result.failed,
            result.total()
        )));
    }
    Ok(())
}

fn validate_file(path: &Path) -> Result<String> {
    let flowsheet = sfiles::read_file(path)?;
    Ok(format!(
        "{}: {} unit(s)",
        path.display(),
        flowsheet.unit_count()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_validate_directory_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.sfiles"), "(raw)(r)(prod)\n").unwrap();
        fs::write(dir.path().join("bad.sfiles"), "(raw)(r\n").unwrap();

        let args = ValidateArgs {
            input: dir.path().to_path_buf(),
            pattern: "*.sfiles".into(),
            recursive: false,
            jobs: 2,
        };
        assert!(matches!(execute(args), Err(SfilesError::Other(_))));
    }

    #[test]
    fn test_validate_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("good.sfiles");
        fs::write(&path, "(raw)(mix)<1(r)1\n").unwrap();
        assert!(validate_file(&path).unwrap().contains("3 unit(s)"));
    }
}
