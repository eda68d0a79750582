//! # sfbuilder - SFILES 2.0 流程图构建工具
//!
//! 在命令行中逐步搭建化工流程图（单元、物流、分支、汇合、循环），
//! 并与 SFILES 2.0 文本互相转换。当前流程图保存在一个 SFILES 文件中。
//!
//! ## 子命令
//! - `init` / `add-unit` / `add-stream` / `branch` / `join` / `recycle`
//! - `remove-stream` / `remove-unit`
//! - `show` / `import` / `export`
//! - `render` / `validate`（支持目录批处理）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── sfiles/    (SFILES 词法、解析、生成)
//!   │     ├── models/    (流程图数据模型)
//!   │     ├── render/    (布局、绘图、导出)
//!   │     └── batch/     (批量处理)
//!   ├── utils/      (输出、进度条、日志)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod render;
mod sfiles;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = utils::logging::init(cli.log.as_deref(), cli.verbose) {
        utils::output::print_warning(&format!("{}", e));
    }

    if let Err(e) = commands::run(cli) {
        tracing::error!(error = %e, "command failed");
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
