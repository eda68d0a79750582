//! # 流程图布局
//!
//! 分层布局：进料在左、产品在右。
//!
//! ## 算法
//! - 深度优先找出闭合环路的回边（循环物流）
//! - 去掉回边和信号流后按最长路径分层
//! - 同层单元按插入顺序纵向排列，坐标归一化到单位正方形
//!
//! ## 依赖关系
//! - 被 `render/plot.rs` 使用
//! - 使用 `models/flowsheet.rs`

use crate::models::{Flowsheet, StreamKind};

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// 布局结果
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// 单元坐标 (x, y)，范围 (0, 1)
    pub positions: IndexMap<String, (f64, f64)>,
    /// 单元层号
    pub ranks: IndexMap<String, usize>,
    /// 回边 (from, to)
    pub back_edges: HashSet<(String, String)>,
}

impl Layout {
    pub fn is_back_edge(&self, from: &str, to: &str) -> bool {
        self.back_edges.contains(&(from.to_string(), to.to_string()))
    }

    pub fn layer_count(&self) -> usize {
        self.ranks.values().max().map(|r| r + 1).unwrap_or(0)
    }
}

/// 计算分层布局
pub fn layered_layout(flowsheet: &Flowsheet) -> Layout {
    let back_edges = find_back_edges(flowsheet);
    let ranks = longest_path_ranks(flowsheet, &back_edges);

    let layers = ranks.values().max().map(|r| r + 1).unwrap_or(1);
    let mut members: Vec<Vec<&str>> = vec![Vec::new(); layers];
    for (name, rank) in &ranks {
        members[*rank].push(name.as_str());
    }

    let mut positions = IndexMap::new();
    for unit in flowsheet.units() {
        let rank = ranks[&unit.name];
        let layer = &members[rank];
        let slot = layer.iter().position(|n| *n == unit.name).unwrap_or(0);

        let x = (rank as f64 + 0.5) / layers as f64;
        // 第一个单元在最上方
        let y = 1.0 - (slot as f64 + 0.5) / layer.len() as f64;
        positions.insert(unit.name.clone(), (x, y));
    }

    Layout {
        positions,
        ranks,
        back_edges,
    }
}

/// 深度优先搜索回边
fn find_back_edges(flowsheet: &Flowsheet) -> HashSet<(String, String)> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        OnStack,
        Done,
    }

    let mut state: HashMap<&str, State> = HashMap::new();
    let mut back_edges = HashSet::new();

    // 先从无入流的单元出发，再处理剩余（纯环路）
    let mut starts: Vec<&str> = flowsheet
        .units()
        .filter(|u| material_preds(flowsheet, &u.name).is_empty())
        .map(|u| u.name.as_str())
        .collect();
    starts.extend(flowsheet.units().map(|u| u.name.as_str()));

    for start in starts {
        if state.contains_key(start) {
            continue;
        }

        // 显式栈: (单元, 下一个待处理的后继序号)
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        state.insert(start, State::OnStack);

        while let Some((unit, next)) = stack.pop() {
            let succs = material_succs(flowsheet, unit);
            if next >= succs.len() {
                state.insert(unit, State::Done);
                continue;
            }

            stack.push((unit, next + 1));
            let target = succs[next];
            match state.get(target) {
                Some(State::OnStack) => {
                    back_edges.insert((unit.to_string(), target.to_string()));
                }
                Some(State::Done) => {}
                None => {
                    state.insert(target, State::OnStack);
                    stack.push((target, 0));
                }
            }
        }
    }

    back_edges
}

/// 最长路径分层（Kahn 拓扑序）
fn longest_path_ranks(
    flowsheet: &Flowsheet,
    back_edges: &HashSet<(String, String)>,
) -> IndexMap<String, usize> {
    let forward = |from: &str, to: &str| !back_edges.contains(&(from.to_string(), to.to_string()));

    let mut in_degree: HashMap<&str, usize> = flowsheet.units().map(|u| (u.name.as_str(), 0)).collect();
    for stream in flowsheet.streams() {
        if stream.kind == StreamKind::Material && forward(&stream.from, &stream.to) {
            *in_degree.entry(stream.to.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranks: IndexMap<String, usize> = flowsheet.units().map(|u| (u.name.clone(), 0)).collect();
    let mut queue: Vec<&str> = flowsheet
        .units()
        .map(|u| u.name.as_str())
        .filter(|n| in_degree[n] == 0)
        .collect();
    queue.reverse();

    while let Some(unit) = queue.pop() {
        let rank = ranks[unit];
        for succ in material_succs(flowsheet, unit) {
            if !forward(unit, succ) {
                continue;
            }
            if let Some(r) = ranks.get_mut(succ) {
                *r = (*r).max(rank + 1);
            }
            if let Some(d) = in_degree.get_mut(succ) {
                *d -= 1;
                if *d == 0 {
                    queue.insert(0, succ);
                }
            }
        }
    }

    ranks
}

fn material_succs<'a>(flowsheet: &'a Flowsheet, unit: &'a str) -> Vec<&'a str> {
    flowsheet
        .outgoing(unit)
        .filter(|s| s.kind == StreamKind::Material)
        .map(|s| s.to.as_str())
        .collect()
}

fn material_preds<'a>(flowsheet: &'a Flowsheet, unit: &'a str) -> Vec<&'a str> {
    flowsheet
        .incoming(unit)
        .filter(|s| s.kind == StreamKind::Material)
        .map(|s| s.from.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ranks() {
        let fs = Flowsheet::from_sfiles("(raw)(hex)(r)(prod)").unwrap();
        let layout = layered_layout(&fs);
        assert_eq!(layout.ranks["raw"], 0);
        assert_eq!(layout.ranks["prod"], 3);
        assert_eq!(layout.layer_count(), 4);

        let (x0, _) = layout.positions["raw"];
        let (x3, _) = layout.positions["prod"];
        assert!(x0 < x3);
    }

    #[test]
    fn test_recycle_is_back_edge() {
        let fs = Flowsheet::from_sfiles("(raw)(mix)<1(r)(splt)1(prod)").unwrap();
        let layout = layered_layout(&fs);
        assert!(layout.is_back_edge("splt", "mix"));
        assert_eq!(layout.back_edges.len(), 1);
        assert_eq!(layout.ranks["mix"], 1);
        assert_eq!(layout.ranks["prod"], 4);
    }

    #[test]
    fn test_longest_path_rank() {
        // a → b → c 与 a → c：c 取最长路径
        let fs = Flowsheet::from_sfiles("(a)[(b)(c)<1]1").unwrap();
        let layout = layered_layout(&fs);
        assert_eq!(layout.ranks["c"], 2);
    }

    #[test]
    fn test_branch_targets_share_layer() {
        let fs = Flowsheet::from_sfiles("(raw)(splt)[(p1)](p2)").unwrap();
        let layout = layered_layout(&fs);
        let (x1, y1) = layout.positions["p1"];
        let (x2, y2) = layout.positions["p2"];
        assert!((x1 - x2).abs() < 1e-9);
        assert!(y1 > y2);
    }

    #[test]
    fn test_positions_inside_unit_square() {
        let fs = Flowsheet::from_sfiles("(a)<1(b)(c)1n|(d)").unwrap();
        let layout = layered_layout(&fs);
        assert_eq!(layout.positions.len(), 4);
        for (x, y) in layout.positions.values() {
            assert!(*x > 0.0 && *x < 1.0);
            assert!(*y > 0.0 && *y < 1.0);
        }
    }
}
