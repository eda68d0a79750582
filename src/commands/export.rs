//! # export 命令
//!
//! 按格式导出当前流程图：写入文件或打印到标准输出。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `sfiles/` 与 `render/export.rs`

use crate::cli::io::{ExportArgs, ExportFormat};
use crate::error::{Result, SfilesError};
use crate::models::Flowsheet;
use crate::render::export;
use crate::sfiles::{self, WriteOptions};
use crate::utils::output;

use std::path::Path;

pub fn execute(args: ExportArgs, file: &Path) -> Result<()> {
    let flowsheet = sfiles::read_file(file)?;

    let format = args.format.unwrap_or_else(|| {
        args.output
            .as_deref()
            .map(ExportFormat::from_path)
            .unwrap_or(ExportFormat::Sfiles)
    });
    let content = render_format(&flowsheet, format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &content).map_err(|e| SfilesError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
            output::print_written(&file.display().to_string(), &path.display().to_string());
        }
        // 标准输出不加修饰，便于管道使用
        None => print!("{}", content),
    }
    Ok(())
}

/// 生成指定格式的文本
pub fn render_format(flowsheet: &Flowsheet, format: ExportFormat) -> Result<String> {
    let content = match format {
        ExportFormat::Sfiles => format!("{}\n", sfiles::write(flowsheet)),
        ExportFormat::Generalized => format!(
            "{}\n",
            sfiles::write_with(flowsheet, WriteOptions { generalized: true })
        ),
        ExportFormat::Json => format!("{}\n", export::to_json(flowsheet)?),
        ExportFormat::Csv => export::to_csv(flowsheet)?,
        ExportFormat::Dot => export::to_dot(flowsheet),
    };
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_formats() {
        let fs = Flowsheet::from_sfiles("(hex-1)(hex-2)(prod)").unwrap();

        assert_eq!(
            render_format(&fs, ExportFormat::Sfiles).unwrap(),
            "(hex-1)(hex-2)(prod)\n"
        );
        assert_eq!(
            render_format(&fs, ExportFormat::Generalized).unwrap(),
            "(hex)(hex)(prod)\n"
        );
        assert!(render_format(&fs, ExportFormat::Csv)
            .unwrap()
            .starts_with("from,to,kind,tags\n"));
        assert!(render_format(&fs, ExportFormat::Dot)
            .unwrap()
            .contains("\"hex-1\" -> \"hex-2\";"));
    }

    #[test]
    fn test_export_to_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plant.sfiles");
        std::fs::write(&file, "(raw)(r)\n").unwrap();

        let out = dir.path().join("plant.json");
        execute(
            ExportArgs {
                output: Some(out.clone()),
                format: None,
            },
            &file,
        )
        .unwrap();

        let json = std::fs::read_to_string(&out).unwrap();
        assert_eq!(export::from_json(&json).unwrap(), sfiles::read_file(&file).unwrap());
    }
}
