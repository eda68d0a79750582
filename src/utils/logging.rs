//! # 日志初始化
//!
//! 仅在指定 `--log` 或 `-v` 时安装 `tracing` 订阅器，否则不输出任何日志。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `tracing-subscriber` (fmt + env-filter)

use crate::error::{Result, SfilesError};

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// 安装全局日志订阅器
///
/// - `log_file`: 日志写入该文件（截断）
/// - `verbose`: 未指定文件时输出到 stderr
///
/// `RUST_LOG` 存在时覆盖默认的 debug 级别。
pub fn init(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    if log_file.is_none() && !verbose {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .map_err(|e| SfilesError::FileWriteError {
                    path: path.display().to_string(),
                    source: e,
                })?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
    };

    installed.map_err(|e| SfilesError::Other(format!("Failed to install logger: {}", e)))?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting sfbuilder");
    Ok(())
}
