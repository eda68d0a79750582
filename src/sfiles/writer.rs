//! # SFILES 2.0 生成器
//!
//! 将 `Flowsheet` 有向图序列化为确定性的 SFILES 字符串。
//!
//! ## 遍历规则
//! 1. 每个弱连通部分从第一个无物料入流的单元开始（纯环路取第一个未访问单元），
//!    各部分以 `n|` 连接
//! 2. 访问单元时，尚未访问且上游无已访问单元的前驱写成汇合块 `<&|...&|`
//! 3. 出流按插入顺序处理：目标已访问则写成循环编号对，
//!    未访问目标中除最后一个外写成 `[...]` 分支，最后一个延续主线
//! 4. 信号流总是写成 `_n` / `<_n` 编号对
//! 5. 编号按在最终文本中首次出现的顺序从 1 开始分配
//!
//! ## 依赖关系
//! - 被 `sfiles/mod.rs` 使用
//! - 使用 `models/`

use super::lexer::ring_label;
use crate::models::{Flowsheet, StreamKind, StreamTags};

use std::collections::{HashMap, HashSet};

/// 输出选项
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// 只写单元类型（`hex`）而不写完整名称（`hex-1`）
    pub generalized: bool,
}

/// 序列化流程图
pub fn write_sfiles(flowsheet: &Flowsheet, options: WriteOptions) -> String {
    let mut writer = Writer::new(flowsheet);
    let parts = writer.traverse();
    writer.attach_signals();

    let mut renderer = Renderer {
        elements: &writer.elements,
        numbers: HashMap::new(),
        options,
    };
    let text = parts
        .iter()
        .map(|seq| renderer.sequence(seq))
        .collect::<Vec<_>>()
        .join("n|");

    tracing::debug!(length = text.len(), "generated SFILES");
    text
}

type RingId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingKind {
    Recycle,
    Signal,
}

/// 输出树中的一个单元
#[derive(Debug, Default)]
struct Element {
    unit: String,
    unit_type: String,
    /// 进入该单元的主线/分支物流标签
    tags: StreamTags,
    ring_in: Vec<(RingKind, RingId)>,
    joins: Vec<(Vec<usize>, StreamTags)>,
    ring_out: Vec<(RingKind, RingId, StreamTags)>,
    branches: Vec<Vec<usize>>,
}

struct Writer<'a> {
    flowsheet: &'a Flowsheet,
    elements: Vec<Element>,
    index: HashMap<String, usize>,
    done: HashSet<(String, String)>,
    next_ring: RingId,
}

impl<'a> Writer<'a> {
    fn new(flowsheet: &'a Flowsheet) -> Self {
        Writer {
            flowsheet,
            elements: Vec::new(),
            index: HashMap::new(),
            done: HashSet::new(),
            next_ring: 0,
        }
    }

    fn visited(&self, unit: &str) -> bool {
        self.index.contains_key(unit)
    }

    fn mark_done(&mut self, from: &str, to: &str) -> bool {
        self.done.insert((from.to_string(), to.to_string()))
    }

    fn is_done(&self, from: &str, to: &str) -> bool {
        self.done.contains(&(from.to_string(), to.to_string()))
    }

    fn material_out(&self, unit: &str) -> Vec<(String, StreamTags)> {
        self.flowsheet
            .outgoing(unit)
            .filter(|s| s.kind == StreamKind::Material)
            .map(|s| (s.to.clone(), s.tags.clone()))
            .collect()
    }

    fn material_in(&self, unit: &str) -> Vec<(String, StreamTags)> {
        self.flowsheet
            .incoming(unit)
            .filter(|s| s.kind == StreamKind::Material)
            .map(|s| (s.from.clone(), s.tags.clone()))
            .collect()
    }

    /// `unit` 的物料上游中是否有已访问单元（有则会被正向遍历到）
    fn has_visited_ancestor(&self, unit: &str) -> bool {
        let mut seen: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = self.material_in(unit).into_iter().map(|(p, _)| p).collect();
        while let Some(current) = stack.pop() {
            if self.visited(&current) {
                return true;
            }
            if seen.insert(current.clone()) {
                stack.extend(self.material_in(&current).into_iter().map(|(p, _)| p));
            }
        }
        false
    }

    fn new_ring(&mut self) -> RingId {
        self.next_ring += 1;
        self.next_ring
    }

    fn create_element(&mut self, unit: &str, tags: StreamTags) -> usize {
        let unit_type = self
            .flowsheet
            .unit(unit)
            .map(|u| u.unit_type.clone())
            .unwrap_or_else(|| unit.to_string());

        let idx = self.elements.len();
        self.elements.push(Element {
            unit: unit.to_string(),
            unit_type,
            tags,
            ..Element::default()
        });
        self.index.insert(unit.to_string(), idx);
        idx
    }

    // ─────────────────────────────────────────────────────────────
    // 遍历
    // ─────────────────────────────────────────────────────────────

    fn traverse(&mut self) -> Vec<Vec<usize>> {
        let mut parts = Vec::new();
        while let Some(start) = self.pick_start() {
            tracing::trace!(start = %start, "starting flowsheet part");
            parts.push(self.forward(&start, StreamTags::new()));
        }
        parts
    }

    fn pick_start(&self) -> Option<String> {
        let mut fallback = None;
        for unit in self.flowsheet.units() {
            if self.visited(&unit.name) {
                continue;
            }
            if self.material_in(&unit.name).is_empty() {
                return Some(unit.name.clone());
            }
            fallback.get_or_insert_with(|| unit.name.clone());
        }
        fallback
    }

    /// 从 `start` 向下游写一条主线
    fn forward(&mut self, start: &str, entry_tags: StreamTags) -> Vec<usize> {
        let mut seq = Vec::new();
        let mut current = start.to_string();
        let mut tags = entry_tags;

        loop {
            let idx = self.create_element(&current, tags);
            self.pull_joins(&current, idx);
            seq.push(idx);

            match self.expand_outgoing(&current, idx, true) {
                Some((next, next_tags)) => {
                    current = next;
                    tags = next_tags;
                }
                None => break,
            }
        }
        seq
    }

    /// 写一条以 `unit` 结尾的上游主线（`unit` 的下游物流已由调用方处理）
    fn upstream(&mut self, unit: &str) -> Vec<usize> {
        let idx = self.create_element(unit, StreamTags::new());

        let mut prefix = Vec::new();
        if let Some((pred, tags)) = self.next_pullable_pred(unit) {
            self.mark_done(&pred, unit);
            self.elements[idx].tags = tags;
            prefix = self.upstream(&pred);
        }

        self.pull_joins(unit, idx);
        self.expand_outgoing(unit, idx, false);

        prefix.push(idx);
        prefix
    }

    /// 下一个可写成上游的前驱：未访问，且上游没有已访问单元
    fn next_pullable_pred(&self, unit: &str) -> Option<(String, StreamTags)> {
        self.material_in(unit).into_iter().find(|(pred, _)| {
            !self.is_done(pred, unit) && !self.visited(pred) && !self.has_visited_ancestor(pred)
        })
    }

    fn pull_joins(&mut self, unit: &str, idx: usize) {
        while let Some((pred, tags)) = self.next_pullable_pred(unit) {
            self.mark_done(&pred, unit);
            let seq = self.upstream(&pred);
            self.elements[idx].joins.push((seq, tags));
        }
    }

    /// 处理出流；`main_allowed` 时返回延续主线的目标
    fn expand_outgoing(
        &mut self,
        unit: &str,
        idx: usize,
        main_allowed: bool,
    ) -> Option<(String, StreamTags)> {
        let outs = self.material_out(unit);
        let mut main = None;

        for (i, (target, tags)) in outs.iter().enumerate() {
            if self.is_done(unit, target) {
                continue;
            }

            if self.visited(target) {
                self.mark_done(unit, target);
                self.close_ring(RingKind::Recycle, unit, target, tags.clone());
                continue;
            }

            let later_unvisited = outs[i + 1..]
                .iter()
                .any(|(t, _)| !self.visited(t) && !self.is_done(unit, t));

            if main_allowed && !later_unvisited {
                main = Some((target.clone(), tags.clone()));
            } else {
                self.mark_done(unit, target);
                let seq = self.forward(target, tags.clone());
                self.elements[idx].branches.push(seq);
            }
        }

        if let Some((target, _)) = &main {
            self.mark_done(unit, target);
        }
        main
    }

    fn close_ring(&mut self, kind: RingKind, from: &str, to: &str, tags: StreamTags) {
        let id = self.new_ring();
        let (source, target) = (self.index[from], self.index[to]);
        self.elements[source].ring_out.push((kind, id, tags));
        self.elements[target].ring_in.push((kind, id));
    }

    fn attach_signals(&mut self) {
        let signals: Vec<(String, String, StreamTags)> = self
            .flowsheet
            .streams()
            .filter(|s| s.kind == StreamKind::Signal)
            .map(|s| (s.from.clone(), s.to.clone(), s.tags.clone()))
            .collect();

        for (from, to, tags) in signals {
            self.close_ring(RingKind::Signal, &from, &to, tags);
        }
    }
}

// ─────────────────────────────────────────────────────────────
// 文本输出
// ─────────────────────────────────────────────────────────────

struct Renderer<'e> {
    elements: &'e [Element],
    numbers: HashMap<RingId, u32>,
    options: WriteOptions,
}

impl Renderer<'_> {
    fn sequence(&mut self, seq: &[usize]) -> String {
        seq.iter().map(|&idx| self.element(idx)).collect()
    }

    fn number(&mut self, id: RingId) -> String {
        let next = self.numbers.len() as u32 + 1;
        ring_label(*self.numbers.entry(id).or_insert(next))
    }

    fn element(&mut self, idx: usize) -> String {
        let elements = self.elements;
        let element = &elements[idx];
        let mut out = tags_text(&element.tags);

        let label = if self.options.generalized {
            &element.unit_type
        } else {
            &element.unit
        };
        out.push_str(&format!("({})", label));

        for &(kind, id) in &element.ring_in {
            let prefix = match kind {
                RingKind::Recycle => "<",
                RingKind::Signal => "<_",
            };
            out.push_str(prefix);
            out.push_str(&self.number(id));
        }

        for (seq, tags) in &element.joins {
            out.push_str("<&|");
            out.push_str(&self.sequence(seq));
            out.push_str(&tags_text(tags));
            out.push_str("&|");
        }

        for (kind, id, tags) in &element.ring_out {
            out.push_str(&tags_text(tags));
            if *kind == RingKind::Signal {
                out.push('_');
            }
            out.push_str(&self.number(*id));
        }

        for seq in &element.branches {
            out.push('[');
            out.push_str(&self.sequence(seq));
            out.push(']');
        }

        out
    }
}

fn tags_text(tags: &StreamTags) -> String {
    tags.all().map(|t| format!("{{{}}}", t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfiles::parser::parse_sfiles;

    fn chain(names: &[&str]) -> Flowsheet {
        let mut fs = Flowsheet::new();
        for name in names {
            fs.add_unit(name).unwrap();
        }
        for pair in names.windows(2) {
            fs.add_stream(pair[0], pair[1], StreamTags::new()).unwrap();
        }
        fs
    }

    fn write(fs: &Flowsheet) -> String {
        write_sfiles(fs, WriteOptions::default())
    }

    fn assert_round_trip(fs: &Flowsheet) {
        let text = write(fs);
        let back = parse_sfiles(&text).unwrap();
        assert_eq!(&back, fs, "round trip changed the flowsheet: {}", text);
    }

    #[test]
    fn test_write_empty() {
        assert_eq!(write(&Flowsheet::new()), "");
    }

    #[test]
    fn test_write_chain() {
        let fs = chain(&["raw-1", "hex-1", "r-1", "prod-1"]);
        assert_eq!(write(&fs), "(raw-1)(hex-1)(r-1)(prod-1)");
        assert_round_trip(&fs);
    }

    #[test]
    fn test_write_generalized() {
        let fs = chain(&["raw-1", "hex-1", "hex-2", "prod"]);
        let text = write_sfiles(&fs, WriteOptions { generalized: true });
        assert_eq!(text, "(raw)(hex)(hex)(prod)");
    }

    #[test]
    fn test_write_tags() {
        let mut fs = chain(&["hex-1", "dist-1", "prod-1"]);
        fs.add_stream("hex-1", "dist-1", StreamTags::from_csv("tin,1").unwrap())
            .unwrap();
        assert_eq!(write(&fs), "(hex-1){1}{tin}(dist-1)(prod-1)");
        assert_round_trip(&fs);
    }

    #[test]
    fn test_write_branch() {
        let mut fs = chain(&["raw-1", "splt-1", "prod-1"]);
        fs.add_unit("prod-2").unwrap();
        fs.add_stream("splt-1", "prod-2", StreamTags::from_csv("tout").unwrap())
            .unwrap();
        assert_eq!(write(&fs), "(raw-1)(splt-1)[(prod-1)]{tout}(prod-2)");
        assert_round_trip(&fs);
    }

    #[test]
    fn test_write_join() {
        let mut fs = chain(&["raw-1", "mix-1", "r-1"]);
        fs.add_unit("raw-2").unwrap();
        fs.add_stream("raw-2", "mix-1", StreamTags::from_csv("2").unwrap())
            .unwrap();
        assert_eq!(write(&fs), "(raw-1)(mix-1)<&|(raw-2){2}&|(r-1)");
        assert_round_trip(&fs);
    }

    #[test]
    fn test_write_join_with_upstream_chain() {
        let mut fs = chain(&["raw-1", "mix-1", "prod-1"]);
        fs.add_unit("raw-2").unwrap();
        fs.add_unit("hex-1").unwrap();
        fs.add_stream("raw-2", "hex-1", StreamTags::new()).unwrap();
        fs.add_stream("hex-1", "mix-1", StreamTags::new()).unwrap();
        assert_eq!(write(&fs), "(raw-1)(mix-1)<&|(raw-2)(hex-1)&|(prod-1)");
        assert_round_trip(&fs);
    }

    #[test]
    fn test_write_recycle() {
        let mut fs = chain(&["raw-1", "mix-1", "r-1", "splt-1", "prod-1"]);
        fs.add_recycle("splt-1", "mix-1", StreamTags::new()).unwrap();
        assert_eq!(write(&fs), "(raw-1)(mix-1)<1(r-1)(splt-1)1(prod-1)");
        assert_round_trip(&fs);
    }

    #[test]
    fn test_write_pure_cycle() {
        let mut fs = chain(&["a", "b", "c"]);
        fs.add_stream("c", "a", StreamTags::new()).unwrap();
        assert_eq!(write(&fs), "(a)<1(b)(c)1");
        assert_round_trip(&fs);
    }

    #[test]
    fn test_write_disconnected_parts() {
        let mut fs = chain(&["a", "b"]);
        fs.add_unit("c").unwrap();
        assert_eq!(write(&fs), "(a)(b)n|(c)");
        assert_round_trip(&fs);
    }

    #[test]
    fn test_write_signal() {
        let mut fs = chain(&["v-1", "r-1", "prod-1"]);
        fs.add_unit("C-1").unwrap();
        fs.add_signal("r-1", "C-1", StreamTags::from_csv("not_next_unitop").unwrap())
            .unwrap();
        fs.add_signal("C-1", "v-1", StreamTags::new()).unwrap();
        assert_eq!(
            write(&fs),
            "(v-1)<_1(r-1){not_next_unitop}_2(prod-1)n|(C-1)<_2_1"
        );
        assert_round_trip(&fs);
    }

    #[test]
    fn test_write_diamond() {
        // a → b → d, a → c → d
        let mut fs = Flowsheet::new();
        for name in ["a", "b", "c", "d"] {
            fs.add_unit(name).unwrap();
        }
        for (from, to) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")] {
            fs.add_stream(from, to, StreamTags::new()).unwrap();
        }
        // c 的上游 a 已访问，c → d 写成编号对
        assert_eq!(write(&fs), "(a)[(b)(d)<1](c)1");
        assert_round_trip(&fs);
    }

    #[test]
    fn test_round_trip_complex() {
        let text = "(raw-1)(hex-1){1}(mix-1)<1<&|(raw-2)(hex-1){2}&|(r-1)[{tout}(dist-1)(prod-1)](splt-1)1(prod-2)";
        let fs = parse_sfiles(text);
        // hex-1 重复，解析失败
        assert!(fs.is_err());

        let text = "(raw-1)(hex-1){1}(mix-1)<1<&|(raw-2)(hex-2){2}&|(r-1)[{tout}(dist-1)(prod-1)](splt-1)1(prod-2)";
        let fs = parse_sfiles(text).unwrap();
        assert_eq!(fs.unit_count(), 10);
        assert_round_trip(&fs);
    }

    #[test]
    fn test_many_rings_use_percent_numbers() {
        let names: Vec<String> = (1..=12).map(|i| format!("u-{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut fs = chain(&refs);
        for i in 2..=12 {
            fs.add_stream(&format!("u-{}", i), "u-1", StreamTags::new())
                .unwrap();
        }
        let text = write(&fs);
        assert!(text.contains("%10"));
        assert!(text.contains("%11"));
        assert_round_trip(&fs);
    }

    #[test]
    fn test_adjacent_ring_labels_stay_separate() {
        let names: Vec<String> = (1..=12).map(|i| format!("c-{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut fs = chain(&refs);
        for i in 3..=11 {
            fs.add_stream(&format!("c-{}", i), "c-2", StreamTags::new())
                .unwrap();
        }
        fs.add_stream("c-12", "c-11", StreamTags::new()).unwrap();
        fs.add_stream("c-12", "c-1", StreamTags::new()).unwrap();

        // `%10` 后紧跟 `1` 不能被读成 `%101`
        let text = write(&fs);
        assert!(text.contains("%10"));
        assert_round_trip(&fs);
    }

    #[test]
    fn test_three_digit_ring_numbers() {
        let names: Vec<String> = (1..=102).map(|i| format!("u-{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut fs = chain(&refs);
        for i in 2..=102 {
            fs.add_stream(&format!("u-{}", i), "u-1", StreamTags::new())
                .unwrap();
        }
        let text = write(&fs);
        assert!(text.contains("%(100)"));
        assert!(text.contains("%(101)"));
        assert_round_trip(&fs);
    }
}
