//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。编辑命令统一流程：
//! 读取流程图文件 → 解析 → 修改 → 写回 → 打印新的 SFILES。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `sfiles/`, `models/`, `render/`, `batch/`, `utils/`
//! - 子模块: edit, show, import, export, render, validate

pub mod edit;
pub mod export;
pub mod import;
pub mod render;
pub mod show;
pub mod validate;

use crate::batch::BatchResult;
use crate::cli::{Cli, Commands};
use crate::error::Result;
use crate::models::Flowsheet;
use crate::sfiles;
use crate::utils::output;

use std::path::Path;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    let file = cli.file.as_path();
    tracing::debug!(file = %file.display(), "flowsheet file");

    match cli.command {
        Commands::Init(args) => edit::init(args, file),
        Commands::AddUnit(args) => edit::add_unit(args, file),
        Commands::AddStream(args) => edit::add_stream(args, file),
        Commands::Branch(args) => edit::branch(args, file),
        Commands::Join(args) => edit::join(args, file),
        Commands::Recycle(args) => edit::recycle(args, file),
        Commands::RemoveStream(args) => edit::remove_stream(args, file),
        Commands::RemoveUnit(args) => edit::remove_unit(args, file),
        Commands::Show(args) => show::execute(args, file),
        Commands::Import(args) => import::execute(args, file),
        Commands::Export(args) => export::execute(args, file),
        Commands::Render(args) => render::execute(args, file),
        Commands::Validate(args) => validate::execute(args),
    }
}

/// 读取、修改并写回流程图；修改失败时文件保持不变
fn modify<F>(file: &Path, edit: F) -> Result<Flowsheet>
where
    F: FnOnce(&mut Flowsheet) -> Result<()>,
{
    let mut flowsheet = sfiles::read_file(file)?;
    edit(&mut flowsheet)?;
    sfiles::write_file(file, &flowsheet)?;
    Ok(flowsheet)
}

/// 打印当前 SFILES
fn report(flowsheet: &Flowsheet) {
    output::print_sfiles(&flowsheet.to_sfiles());
}

/// 打印批处理统计与失败列表
fn print_batch_summary(result: &BatchResult) {
    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }
}
