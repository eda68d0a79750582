//! # 流程图导出
//!
//! 导出流程图到 JSON、CSV 和 DOT 格式。
//!
//! ## 支持格式
//! - JSON: 完整的单元与物流数据
//! - CSV: 连接表 (from, to, kind, tags)
//! - DOT: Graphviz 有向图文本
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `serde_json` 与 `csv` 库

use crate::error::{Result, SfilesError};
use crate::models::Flowsheet;

use std::fmt::Write;

/// 导出为格式化 JSON
pub fn to_json(flowsheet: &Flowsheet) -> Result<String> {
    Ok(serde_json::to_string_pretty(flowsheet)?)
}

/// 从 JSON 读取流程图
pub fn from_json(input: &str) -> Result<Flowsheet> {
    Ok(serde_json::from_str(input)?)
}

/// 导出连接表为 CSV
pub fn to_csv(flowsheet: &Flowsheet) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record(["from", "to", "kind", "tags"])?;
    for stream in flowsheet.streams() {
        let kind = stream.kind.to_string();
        let tags = stream.tags.all().collect::<Vec<_>>().join(";");
        wtr.write_record([
            stream.from.as_str(),
            stream.to.as_str(),
            kind.as_str(),
            tags.as_str(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| SfilesError::Other(format!("CSV buffer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| SfilesError::Other(e.to_string()))
}

/// 导出为 Graphviz DOT 文本
pub fn to_dot(flowsheet: &Flowsheet) -> String {
    let mut out = String::new();

    // 写入 String 不会失败
    let _ = writeln!(out, "digraph flowsheet {{");
    let _ = writeln!(out, "    rankdir=LR;");
    let _ = writeln!(out, "    node [shape=circle, style=filled, fillcolor=lightblue];");

    for name in flowsheet.unit_names() {
        let _ = writeln!(out, "    \"{}\";", escape(&name));
    }

    for stream in flowsheet.streams() {
        let mut attrs = Vec::new();
        if !stream.tags.is_empty() {
            attrs.push(format!("label=\"{}\"", escape(&stream.tags.to_string())));
        }
        if stream.is_signal() {
            attrs.push("style=dashed".to_string());
            attrs.push("color=blue".to_string());
        }

        let attrs = if attrs.is_empty() {
            String::new()
        } else {
            format!(" [{}]", attrs.join(", "))
        };
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\"{};",
            escape(&stream.from),
            escape(&stream.to),
            attrs
        );
    }

    out.push_str("}\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Flowsheet {
        Flowsheet::from_sfiles("(raw)(hex){1}{tin}(r){not_next_unitop}_1(prod)n|(C)<_1").unwrap()
    }

    #[test]
    fn test_json_round_trip() {
        let fs = sample();
        let json = to_json(&fs).unwrap();
        assert!(json.contains("\"hex\""));
        assert_eq!(from_json(&json).unwrap(), fs);
    }

    #[test]
    fn test_csv_connections() {
        let csv = to_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "from,to,kind,tags");
        assert!(lines.contains(&"hex,r,material,1;tin"));
        assert!(lines.contains(&"r,C,signal,not_next_unitop"));
        assert_eq!(lines.len(), 1 + sample().stream_count());
    }

    #[test]
    fn test_dot_output() {
        let dot = to_dot(&sample());
        assert!(dot.starts_with("digraph flowsheet {"));
        assert!(dot.contains("\"raw\" -> \"hex\";"));
        assert!(dot.contains("\"hex\" -> \"r\" [label=\"1, tin\"];"));
        assert!(dot.contains("style=dashed"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_json_import_rejects_bad_tags() {
        let json = r#"{"units":[{"name":"a","unit_type":"a"},{"name":"b","unit_type":"b"}],
            "streams":[{"from":"a","to":"b","tags":{"he":["x}y"],"col":[],"signal":[]}}]}"#;
        let err = from_json(json).unwrap_err();
        assert!(matches!(err, SfilesError::JsonError(_)));
        assert!(err.to_string().contains("Invalid stream tag 'x}y'"));
    }

    #[test]
    fn test_json_import_writes_parseable_sfiles() {
        let json = r#"{"units":[{"name":"a","unit_type":"a"},{"name":"b","unit_type":"b"}],
            "streams":[{"from":"a","to":"b","tags":{"he":["tout"],"col":[],"signal":[]}}]}"#;
        let fs = from_json(json).unwrap();
        let text = fs.to_sfiles();
        assert_eq!(text, "(a){tout}(b)");
        assert_eq!(Flowsheet::from_sfiles(&text).unwrap(), fs);
    }

    #[test]
    fn test_empty_csv_has_header() {
        let csv = to_csv(&Flowsheet::new()).unwrap();
        assert_eq!(csv, "from,to,kind,tags\n");
    }
}
