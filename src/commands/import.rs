//! # import 命令
//!
//! 校验 SFILES 输入并替换当前流程图。输入来源：`--string`、文件或标准输入。
//! 扩展名为 `.json` 的文件按 JSON 导出格式读取。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `sfiles/` 解析，`render/export.rs` 读取 JSON

use super::report;
use crate::cli::io::ImportArgs;
use crate::error::{Result, SfilesError};
use crate::models::Flowsheet;
use crate::render::export;
use crate::sfiles;
use crate::utils::output;

use std::io::Read;
use std::path::Path;

pub fn execute(args: ImportArgs, file: &Path) -> Result<()> {
    let (flowsheet, source) = read_input(&args)?;

    sfiles::write_file(file, &flowsheet)?;
    output::print_success(&format!(
        "Imported {} unit(s), {} stream(s) from {}",
        flowsheet.unit_count(),
        flowsheet.stream_count(),
        source
    ));
    report(&flowsheet);
    Ok(())
}

fn read_input(args: &ImportArgs) -> Result<(Flowsheet, String)> {
    if let Some(text) = &args.string {
        return Ok((sfiles::parse(text)?, "string".to_string()));
    }

    match &args.path {
        Some(path) if path.as_os_str() == "-" => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| SfilesError::FileReadError {
                    path: "<stdin>".to_string(),
                    source: e,
                })?;
            Ok((sfiles::parse(&text)?, "stdin".to_string()))
        }
        Some(path) if is_json(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| SfilesError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })?;
            Ok((export::from_json(&text)?, path.display().to_string()))
        }
        Some(path) => Ok((sfiles::read_file(path)?, path.display().to_string())),
        None => Err(SfilesError::InvalidArgument(
            "give an SFILES file, '-' for stdin, or --string".to_string(),
        )),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
