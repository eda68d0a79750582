//! # 批量处理模块
//!
//! 对目录中的多个 SFILES 文件执行 render / validate。
//!
//! ## 功能
//! - 收集匹配文件列表（单文件输入直接处理）
//! - 并行处理
//! - 进度反馈与成功/跳过/失败统计
//!
//! ## 依赖关系
//! - 被 `commands/render.rs`、`commands/validate.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
