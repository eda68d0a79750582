//! # 编辑子命令 CLI 定义
//!
//! 单元与物流的增删操作参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/edit.rs`

use clap::Args;

/// init 参数
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing flowsheet file
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

/// add-unit 参数
#[derive(Args, Debug)]
pub struct AddUnitArgs {
    /// Unit name, e.g. hex-1 (or just 1 together with --type hex)
    pub name: String,

    /// Unit type prefix, e.g. hex, r, dist
    #[arg(short = 't', long = "type", default_value = "")]
    pub unit_type: String,
}

/// add-stream 参数
#[derive(Args, Debug)]
pub struct AddStreamArgs {
    /// Source unit
    pub from: String,

    /// Destination unit
    pub to: String,

    /// Comma-separated stream tags (e.g. "1,tout")
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Add a control signal instead of a material stream
    #[arg(long, default_value_t = false)]
    pub signal: bool,
}

/// branch 参数
#[derive(Args, Debug)]
pub struct BranchArgs {
    /// Unit the branch starts from
    #[arg(long)]
    pub from: String,

    /// Destination units (at least two)
    #[arg(required = true)]
    pub to: Vec<String>,

    /// Tags for each destination, in the same order (repeatable)
    #[arg(long)]
    pub tags: Vec<String>,
}

/// join 参数
#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Unit the streams merge into
    #[arg(long)]
    pub to: String,

    /// Source units (at least two)
    #[arg(required = true)]
    pub from: Vec<String>,

    /// Tags for each source, in the same order (repeatable)
    #[arg(long)]
    pub tags: Vec<String>,
}

/// recycle 参数
#[derive(Args, Debug)]
pub struct RecycleArgs {
    /// Downstream unit the recycle leaves from
    pub from: String,

    /// Upstream unit the recycle returns to
    pub to: String,

    /// Comma-separated stream tags
    #[arg(long, default_value = "")]
    pub tags: String,
}

/// remove-stream 参数
#[derive(Args, Debug)]
pub struct RemoveStreamArgs {
    pub from: String,
    pub to: String,
}

/// remove-unit 参数
#[derive(Args, Debug)]
pub struct RemoveUnitArgs {
    pub name: String,
}
