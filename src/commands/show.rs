//! # show 命令
//!
//! 打印 SFILES 字符串、单元表和物流表。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `tabled` 打印表格

use crate::cli::io::ShowArgs;
use crate::error::Result;
use crate::models::Flowsheet;
use crate::sfiles::{self, WriteOptions};
use crate::utils::output;

use std::path::Path;
use tabled::{Table, Tabled};

/// 单元表行
#[derive(Debug, Clone, Tabled)]
struct UnitRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Unit")]
    name: String,
    #[tabled(rename = "Type")]
    unit_type: String,
    #[tabled(rename = "Upstream")]
    upstream: String,
    #[tabled(rename = "Downstream")]
    downstream: String,
}

/// 物流表行
#[derive(Debug, Clone, Tabled)]
struct StreamRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

pub fn execute(args: ShowArgs, file: &Path) -> Result<()> {
    let flowsheet = sfiles::read_file(file)?;

    output::print_header(&format!("Flowsheet: {}", file.display()));
    let text = sfiles::write_with(
        &flowsheet,
        WriteOptions {
            generalized: args.generalized,
        },
    );
    output::print_sfiles(&text);

    if flowsheet.is_empty() {
        return Ok(());
    }

    println!();
    println!("{}", Table::new(unit_rows(&flowsheet)));

    if flowsheet.stream_count() > 0 {
        println!();
        println!("{}", Table::new(stream_rows(&flowsheet)));
    }

    println!();
    output::print_info(&format!(
        "{} unit(s), {} stream(s){}",
        flowsheet.unit_count(),
        flowsheet.stream_count(),
        if flowsheet.has_cycle() {
            ", contains recycle loop(s)"
        } else {
            ""
        }
    ));
    Ok(())
}

fn unit_rows(flowsheet: &Flowsheet) -> Vec<UnitRow> {
    flowsheet
        .units()
        .enumerate()
        .map(|(i, unit)| UnitRow {
            index: i + 1,
            name: unit.name.clone(),
            unit_type: unit.unit_type.clone(),
            upstream: join_or_dash(flowsheet.predecessors(&unit.name)),
            downstream: join_or_dash(flowsheet.successors(&unit.name)),
        })
        .collect()
}

fn join_or_dash(names: Vec<&str>) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

fn stream_rows(flowsheet: &Flowsheet) -> Vec<StreamRow> {
    flowsheet
        .streams()
        .map(|s| StreamRow {
            from: s.from.clone(),
            to: s.to.clone(),
            kind: s.kind.to_string(),
            tags: if s.tags.is_empty() {
                "-".to_string()
            } else {
                s.tags.to_string()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows() {
        let fs = Flowsheet::from_sfiles("(raw)(splt)[{tout}(p1)](p2)").unwrap();

        let units = unit_rows(&fs);
        assert_eq!(units.len(), 4);
        assert_eq!(units[1].name, "splt");
        assert_eq!(units[1].upstream, "raw");
        assert_eq!(units[1].downstream, "p1, p2");
        assert_eq!(units[0].upstream, "-");

        let streams = stream_rows(&fs);
        let tagged = streams.iter().find(|r| r.to == "p1").unwrap();
        assert_eq!(tagged.tags, "tout");
        assert_eq!(streams.iter().find(|r| r.to == "p2").unwrap().tags, "-");
    }
}
