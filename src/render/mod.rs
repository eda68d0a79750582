//! # 流程图可视化与导出模块
//!
//! ## 子模块
//! - `layout`: 分层布局
//! - `plot`: PNG/SVG 绘图
//! - `export`: JSON/CSV/DOT 导出
//!
//! ## 依赖关系
//! - 被 `commands/render.rs`、`commands/export.rs` 使用
//! - 使用 `models/` 数据模型

pub mod export;
pub mod layout;
pub mod plot;

pub use plot::{generate_flowsheet_plot, PlotOptions};
