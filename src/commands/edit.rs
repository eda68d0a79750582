//! # 编辑命令
//!
//! 单元与物流的增删，以及分支、汇合、循环三种结构操作。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `cli/edit.rs` 的参数结构
//! - 使用 `models/flowsheet.rs` 的编辑操作

use super::{modify, report};
use crate::cli::edit::{
    AddStreamArgs, AddUnitArgs, BranchArgs, InitArgs, JoinArgs, RecycleArgs, RemoveStreamArgs,
    RemoveUnitArgs,
};
use crate::error::{Result, SfilesError};
use crate::models::{Flowsheet, StreamTags};
use crate::sfiles;
use crate::utils::output;

use std::path::Path;

/// 创建空流程图文件
pub fn init(args: InitArgs, file: &Path) -> Result<()> {
    if file.exists() && !args.force {
        return Err(SfilesError::FileExists {
            path: file.display().to_string(),
        });
    }

    sfiles::write_file(file, &Flowsheet::new())?;
    output::print_success(&format!("Created empty flowsheet: {}", file.display()));
    Ok(())
}

pub fn add_unit(args: AddUnitArgs, file: &Path) -> Result<()> {
    let mut name = String::new();
    let flowsheet = modify(file, |fs| {
        name = fs.add_unit_typed(&args.unit_type, &args.name)?;
        Ok(())
    })?;

    output::print_success(&format!("Added unit '{}'", name));
    report(&flowsheet);
    Ok(())
}

pub fn add_stream(args: AddStreamArgs, file: &Path) -> Result<()> {
    let tags = StreamTags::from_csv(&args.tags)?;
    let mut closes_loop = false;
    let flowsheet = modify(file, |fs| {
        closes_loop = !args.signal && fs.has_path(&args.to, &args.from);
        if args.signal {
            fs.add_signal(&args.from, &args.to, tags)
        } else {
            fs.add_stream(&args.from, &args.to, tags)
        }
    })?;

    let kind = if args.signal { "signal" } else { "stream" };
    output::print_success(&format!("Added {} {} -> {}", kind, args.from, args.to));
    if closes_loop {
        output::print_info("The stream closes a loop and is written as a recycle");
    }
    report(&flowsheet);
    Ok(())
}

pub fn branch(args: BranchArgs, file: &Path) -> Result<()> {
    let targets = pair_with_tags(&args.to, &args.tags)?;
    let flowsheet = modify(file, |fs| fs.add_branch(&args.from, targets))?;

    output::print_success(&format!(
        "Added branch {} -> {}",
        args.from,
        args.to.join(", ")
    ));
    report(&flowsheet);
    Ok(())
}

pub fn join(args: JoinArgs, file: &Path) -> Result<()> {
    let sources = pair_with_tags(&args.from, &args.tags)?;
    let flowsheet = modify(file, |fs| fs.add_join(sources, &args.to))?;

    output::print_success(&format!(
        "Added join {} -> {}",
        args.from.join(", "),
        args.to
    ));
    report(&flowsheet);
    Ok(())
}

pub fn recycle(args: RecycleArgs, file: &Path) -> Result<()> {
    let tags = StreamTags::from_csv(&args.tags)?;
    let mut closes_cycle = false;
    let flowsheet = modify(file, |fs| {
        closes_cycle = fs.add_recycle(&args.from, &args.to, tags)?;
        Ok(())
    })?;

    if closes_cycle {
        output::print_success(&format!("Added recycle {} -> {}", args.from, args.to));
    } else {
        output::print_warning(&format!(
            "Stream {} -> {} was added but does not close a cycle ('{}' is not upstream of '{}')",
            args.from, args.to, args.to, args.from
        ));
    }
    report(&flowsheet);
    Ok(())
}

pub fn remove_stream(args: RemoveStreamArgs, file: &Path) -> Result<()> {
    let flowsheet = modify(file, |fs| fs.remove_stream(&args.from, &args.to).map(|_| ()))?;

    output::print_success(&format!("Removed stream {} -> {}", args.from, args.to));
    report(&flowsheet);
    Ok(())
}

pub fn remove_unit(args: RemoveUnitArgs, file: &Path) -> Result<()> {
    let mut removed_streams = 0;
    let flowsheet = modify(file, |fs| {
        let before = fs.stream_count();
        fs.remove_unit(&args.name)?;
        removed_streams = before - fs.stream_count();
        Ok(())
    })?;

    output::print_success(&format!(
        "Removed unit '{}' and {} stream(s)",
        args.name, removed_streams
    ));
    report(&flowsheet);
    Ok(())
}

/// 按位置为单元配对标签；标签可少于单元，不可多于
fn pair_with_tags(units: &[String], tags: &[String]) -> Result<Vec<(String, StreamTags)>> {
    if tags.len() > units.len() {
        return Err(SfilesError::InvalidArgument(format!(
            "{} tag groups given for {} units",
            tags.len(),
            units.len()
        )));
    }

    units
        .iter()
        .enumerate()
        .map(|(i, unit)| {
            let tags = match tags.get(i) {
                Some(csv) => StreamTags::from_csv(csv)?,
                None => StreamTags::new(),
            };
            Ok((unit.trim().to_string(), tags))
        })
        .collect()
}
