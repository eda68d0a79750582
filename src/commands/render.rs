//! # render 命令
//!
//! 将流程图绘制为 PNG/SVG 图像。
//!
//! ## 功能
//! - 无输入参数时绘制当前流程图文件
//! - 输入为目录时批量并行绘制
//!
//! ## 依赖关系
//! - 使用 `cli/render.rs` 定义的 RenderArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `render/plot.rs` 绘图

use super::print_batch_summary;
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::render::{ImageFormat, RenderArgs};
use crate::error::{Result, SfilesError};
use crate::render::{generate_flowsheet_plot, PlotOptions};
use crate::sfiles;
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

pub fn execute(args: RenderArgs, file: &Path) -> Result<()> {
    let input = args.input.clone().unwrap_or_else(|| file.to_path_buf());

    if input.is_file() {
        execute_single_file(&args, &input)
    } else if input.is_dir() {
        execute_batch(&args, &input)
    } else {
        Err(SfilesError::FileNotFound {
            path: input.display().to_string(),
        })
    }
}

/// 单文件模式
fn execute_single_file(args: &RenderArgs, input: &Path) -> Result<()> {
    let format = args
        .format
        .or_else(|| args.output.as_deref().map(ImageFormat::from_path))
        .unwrap_or(ImageFormat::Png);
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| input.with_extension(format.extension()));

    let options = plot_options(args, format);
    render_file(input, &output_path, &options)?;

    output::print_written(
        &input.display().to_string(),
        &output_path.display().to_string(),
    );
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &RenderArgs, input: &Path) -> Result<()> {
    output::print_header("Flowsheet Rendering");
    output::print_info(&format!("Batch mode: directory '{}'", input.display()));

    let files = FileCollector::new(input.to_path_buf())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        return Err(SfilesError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }
    output::print_info(&format!("Found {} flowsheet files", files.len()));

    // 输出目录默认与输入文件同目录
    if let Some(dir) = &args.output {
        fs::create_dir_all(dir).map_err(|e| SfilesError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }

    let format = args.format.unwrap_or(ImageFormat::Png);
    let options = plot_options(args, format);

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Running with {} parallel jobs", runner.jobs()));
    let result = runner.run(files, |file| {
        let target = batch_output_path(file, input, args.output.as_deref(), format);
        if target.exists() && !args.overwrite {
            return ProcessResult::Skipped(target.display().to_string());
        }
        let rendered = ensure_parent(&target)
            .and_then(|_| render_file(file, &target, &options))
            .map(|_| target.display().to_string());
        ProcessResult::from_result(file, rendered)
    })?;

    print_batch_summary(&result);
    Ok(())
}

fn plot_options(args: &RenderArgs, format: ImageFormat) -> PlotOptions {
    PlotOptions {
        title: args.title.clone(),
        width: args.width,
        height: args.height,
        use_svg: format == ImageFormat::Svg,
    }
}

fn render_file(input: &Path, output_path: &Path, options: &PlotOptions) -> Result<()> {
    let flowsheet = sfiles::read_file(input)?;
    generate_flowsheet_plot(&flowsheet, output_path, options)
}

/// 批量模式下的输出路径：`<dir>/<相对输入根目录的路径>.<ext>`
fn batch_output_path(
    file: &Path,
    input_root: &Path,
    output_dir: Option<&Path>,
    format: ImageFormat,
) -> PathBuf {
    let renamed = file.with_extension(format.extension());
    let Some(dir) = output_dir else {
        return renamed;
    };

    match renamed.strip_prefix(input_root) {
        Ok(relative) => dir.join(relative),
        Err(_) => match renamed.file_name() {
            Some(name) => dir.join(name),
            None => renamed,
        },
    }
}

/// 递归模式下输出子目录可能尚不存在
fn ensure_parent(target: &Path) -> Result<()> {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| SfilesError::FileWriteError {
                path: parent.display().to_string(),
                source: e,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_output_path() {
        let root = Path::new("plants");
        let file = Path::new("plants/a.sfiles");
        assert_eq!(
            batch_output_path(file, root, None, ImageFormat::Svg),
            PathBuf::from("plants/a.svg")
        );
        assert_eq!(
            batch_output_path(file, root, Some(Path::new("out")), ImageFormat::Png),
            PathBuf::from("out/a.png")
        );
    }

    #[test]
    fn test_batch_output_path_keeps_subdirectories() {
        let root = Path::new("plants");
        let out = Some(Path::new("out"));
        let a = batch_output_path(Path::new("plants/a/x.sfiles"), root, out, ImageFormat::Png);
        let b = batch_output_path(Path::new("plants/b/x.sfiles"), root, out, ImageFormat::Png);
        assert_eq!(a, PathBuf::from("out/a/x.png"));
        assert_eq!(b, PathBuf::from("out/b/x.png"));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = RenderArgs {
            input: None,
            output: None,
            format: None,
            width: 400,
            height: 300,
            title: "t".into(),
            pattern: "*.sfiles".into(),
            recursive: false,
            jobs: 1,
            overwrite: false,
        };
        let result = execute(args, &dir.path().join("missing.sfiles"));
        assert!(matches!(result, Err(SfilesError::FileNotFound { .. })));
    }
}
