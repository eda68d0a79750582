//! # 数据模型模块
//!
//! 定义流程图、单元与物流的数据模型。
//!
//! ## 依赖关系
//! - 被 `sfiles/`, `render/` 和 `commands/` 使用
//! - 子模块: flowsheet, stream, unit

pub mod flowsheet;
pub mod stream;
pub mod unit;

pub use flowsheet::Flowsheet;
pub use stream::{Stream, StreamKind, StreamTags};
