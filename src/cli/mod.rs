//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - 编辑: `init`, `add-unit`, `add-stream`, `branch`, `join`, `recycle`,
//!   `remove-stream`, `remove-unit`
//! - 查看与交换: `show`, `import`, `export`
//! - 图像与校验: `render`, `validate`（支持目录批处理）
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: edit, io, render

pub mod edit;
pub mod io;
pub mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 默认流程图文件
pub const DEFAULT_FILE: &str = "flowsheet.sfiles";

/// sfbuilder - SFILES 2.0 流程图构建工具
#[derive(Parser)]
#[command(name = "sfbuilder")]
#[command(version)]
#[command(about = "Build chemical process flowsheets in SFILES 2.0 notation", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Flowsheet file holding the current SFILES string
    #[arg(short, long, global = true, env = "SFILES_FILE", default_value = DEFAULT_FILE)]
    pub file: PathBuf,

    /// Write debug logs to this file
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty flowsheet file
    Init(edit::InitArgs),

    /// Add a unit operation (e.g. hex-1, or `-t hex 1`)
    AddUnit(edit::AddUnitArgs),

    /// Connect two units with a stream
    AddStream(edit::AddStreamArgs),

    /// Split one unit into several downstream units
    Branch(edit::BranchArgs),

    /// Merge several units into one downstream unit
    Join(edit::JoinArgs),

    /// Add a recycle stream back to an upstream unit
    Recycle(edit::RecycleArgs),

    /// Delete the stream between two units
    RemoveStream(edit::RemoveStreamArgs),

    /// Delete a unit and all of its streams
    RemoveUnit(edit::RemoveUnitArgs),

    /// Print the SFILES string with unit and stream tables
    Show(io::ShowArgs),

    /// Replace the flowsheet with an SFILES string or file
    Import(io::ImportArgs),

    /// Export the flowsheet (SFILES, JSON, CSV, DOT)
    Export(io::ExportArgs),

    /// Draw the flowsheet as a PNG or SVG image
    Render(render::RenderArgs),

    /// Check that SFILES files parse
    Validate(render::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_file_after_subcommand() {
        let cli = Cli::try_parse_from(["sfbuilder", "show", "-f", "plant.sfiles"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("plant.sfiles"));
        assert!(matches!(cli.command, Commands::Show(_)));
    }

    #[test]
    fn test_branch_args() {
        let cli = Cli::try_parse_from([
            "sfbuilder", "branch", "--from", "splt-1", "prod-1", "prod-2", "--tags", "tout",
        ])
        .unwrap();
        match cli.command {
            Commands::Branch(args) => {
                assert_eq!(args.from, "splt-1");
                assert_eq!(args.to, vec!["prod-1", "prod-2"]);
                assert_eq!(args.tags, vec!["tout"]);
            }
            _ => panic!("expected branch"),
        }
    }
}
