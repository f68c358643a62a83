use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use super::alphabet::Transitions;
use super::trie::{Node, Pattern, Trie};
use super::{NodeId, ROOT};

/// 编译完成的 Aho-Corasick 自动机。
///
/// 构建后只读：扫描时的全部可变状态都在 [`Scanner`](super::Scanner) 里，
/// 因此同一个自动机可以被任意多个并发扫描共享。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Automaton<T, L> {
    pub(crate) nodes: Vec<Node<T>>,
    pub(crate) patterns: Vec<Pattern<L>>,
}

impl<T: Transitions, L> Trie<T, L> {
    /// 按层（BFS）计算每个节点的失败链接与输出链接。
    ///
    /// 节点的失败链接依赖父节点及更浅层节点的失败链接，必须严格按深度顺序处理；
    /// DFS 或无序遍历会得到错误的链接。
    pub fn compile(self) -> Automaton<T, L> {
        let Trie { mut nodes, patterns } = self;

        // (node, parent, symbol)
        let mut queue: VecDeque<(NodeId, NodeId, u8)> = VecDeque::new();

        nodes[ROOT as usize].fail = ROOT;
        nodes[ROOT as usize].output = None;
        for (sym, child) in nodes[ROOT as usize].transitions.iter() {
            queue.push_back((child, ROOT, sym));
        }

        while let Some((n, parent, sym)) = queue.pop_front() {
            let fail = if parent == ROOT {
                ROOT
            } else {
                let mut f = nodes[parent as usize].fail;
                loop {
                    if let Some(next) = nodes[f as usize].transitions.get(sym) {
                        break next;
                    }
                    if f == ROOT {
                        break ROOT;
                    }
                    f = nodes[f as usize].fail;
                }
            };

            let target = &nodes[fail as usize];
            let output = if target.pattern.is_some() { Some(fail) } else { target.output };

            let node = &mut nodes[n as usize];
            node.fail = fail;
            node.output = output;

            for (s, child) in nodes[n as usize].transitions.iter() {
                queue.push_back((child, n, s));
            }
        }

        debug!("compiled automaton: {} nodes, {} patterns", nodes.len(), patterns.len());
        Automaton { nodes, patterns }
    }
}

impl<T: Transitions, L> Automaton<T, L> {
    /// 重新打开为构建器，丢弃失败链接；再次插入后必须重新编译。
    pub fn into_trie(self) -> Trie<T, L> {
        let Automaton { mut nodes, patterns } = self;
        for node in &mut nodes {
            node.fail = ROOT;
            node.output = None;
        }
        Trie { nodes, patterns }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    pub fn patterns(&self) -> &[Pattern<L>] {
        &self.patterns
    }

    /// 检查 arena 内部的全部下标与深度是否自洽。
    ///
    /// 编译产出的自动机总是自洽的；这里用于校验从磁盘读入的自动机，
    /// 防止损坏的链接在扫描时越界。
    pub fn validate(&self) -> Result<(), String> {
        let n = self.nodes.len();
        if n == 0 {
            return Err("automaton has no root node".to_string());
        }
        if self.nodes[ROOT as usize].depth != 0 {
            return Err("root node has non-zero depth".to_string());
        }
        let in_range = |id: NodeId| (id as usize) < n;
        let mut owners = vec![None::<usize>; self.patterns.len()];

        for (i, node) in self.nodes.iter().enumerate() {
            if !in_range(node.fail) {
                return Err(format!("node {}: failure link {} out of range", i, node.fail));
            }
            if i != ROOT as usize && self.nodes[node.fail as usize].depth >= node.depth {
                return Err(format!("node {}: failure link {} is not shallower", i, node.fail));
            }
            if let Some(o) = node.output {
                if !in_range(o)
                    || self.nodes[o as usize].pattern.is_none()
                    || self.nodes[o as usize].depth >= node.depth
                {
                    return Err(format!("node {}: output link {} is not a terminal node", i, o));
                }
            }
            for (_, child) in node.transitions.iter() {
                if !in_range(child) || node.depth.checked_add(1) != Some(self.nodes[child as usize].depth) {
                    return Err(format!("node {}: child {} is invalid", i, child));
                }
            }
            if let Some(pi) = node.pattern {
                let p = self
                    .patterns
                    .get(pi as usize)
                    .ok_or_else(|| format!("node {}: pattern {} out of range", i, pi))?;
                if p.text.len() != node.depth as usize {
                    return Err(format!("node {}: pattern length differs from depth", i));
                }
                if owners[pi as usize].replace(i).is_some() {
                    return Err(format!("pattern {} owned by more than one node", pi));
                }
            }
        }
        if owners.iter().any(Option::is_none) {
            return Err("pattern without a terminal node".to_string());
        }
        Ok(())
    }

    /// 每个节点（按 arena 下标）的失败链接。
    pub fn failure_links(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.fail).collect()
    }

    /// 按路径查找节点，找不到返回 None。
    pub fn node_for(&self, path: &[u8]) -> Option<NodeId> {
        path.iter()
            .try_fold(ROOT, |cur, &s| self.nodes[cur as usize].transitions.get(s))
    }

    pub fn depth(&self, node: NodeId) -> u32 {
        self.nodes[node as usize].depth
    }

    pub fn fail(&self, node: NodeId) -> NodeId {
        self.nodes[node as usize].fail
    }

    /// 单步转移：先沿失败链回退到有 `symbol` 出边的节点，
    /// 找不到时留在根节点。
    #[inline]
    pub fn next_state(&self, mut state: NodeId, symbol: u8) -> NodeId {
        loop {
            if let Some(next) = self.nodes[state as usize].transitions.get(symbol) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state as usize].fail;
        }
    }

    /// 输出链的起点：节点自身是终止节点时为自身，否则为其输出链接。
    #[inline]
    pub(crate) fn first_output(&self, state: NodeId) -> Option<NodeId> {
        let node = &self.nodes[state as usize];
        if node.pattern.is_some() {
            Some(state)
        } else {
            node.output
        }
    }

    #[inline]
    pub(crate) fn next_output(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node as usize].output
    }

    #[inline]
    pub(crate) fn pattern_at(&self, node: NodeId) -> &Pattern<L> {
        // 输出链上的节点一定是终止节点
        let pi = self.nodes[node as usize].pattern.unwrap_or_default();
        &self.patterns[pi as usize]
    }
}
