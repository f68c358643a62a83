use log::trace;
use serde::{Deserialize, Serialize};

use super::alphabet::Transitions;
use super::{NodeId, ROOT};
use crate::error::BuildError;

/// 插入的一条模式串及其来源标签（如 read id）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern<L> {
    pub text: Vec<u8>,
    pub label: Option<L>,
}

/// arena 中的一个节点，对应所有模式串的一个不同前缀。
///
/// 子节点与失败链接都是同一 arena 中的下标，不存在所有权环。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node<T> {
    pub transitions: T,
    /// 失败链接；编译前全部为 ROOT，根节点指向自身且从不被跟随
    pub fail: NodeId,
    /// 沿失败链上最近的终止节点（不含自身）
    pub output: Option<NodeId>,
    /// 终止于该节点的模式串（`Trie::patterns` 下标）
    pub pattern: Option<u32>,
    pub depth: u32,
}

impl<T: Transitions> Node<T> {
    fn new(depth: u32) -> Self {
        Self {
            transitions: T::default(),
            fail: ROOT,
            output: None,
            pattern: None,
            depth,
        }
    }
}

/// Trie 构建器：只负责插入，不涉及失败链接。
///
/// 插入完成后调用 [`Trie::compile`] 得到不可变的 [`Automaton`](super::Automaton)；
/// 编译会消费构建器，因此编译后无法再插入，除非经 `Automaton::into_trie` 重新打开。
#[derive(Debug, Clone)]
pub struct Trie<T, L> {
    pub(crate) nodes: Vec<Node<T>>,
    pub(crate) patterns: Vec<Pattern<L>>,
}

/// arena 长度转换为下一个可用 id；超出 32 位时报错而不是截断。
#[inline]
fn next_id(len: usize) -> Result<NodeId, BuildError> {
    NodeId::try_from(len).map_err(|_| BuildError::CapacityExceeded(len))
}

impl<T: Transitions, L> Default for Trie<T, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transitions, L> Trie<T, L> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(0)],
            patterns: Vec::new(),
        }
    }

    /// 插入一条模式串。
    ///
    /// - 空模式串返回 `BuildError::EmptyPattern`
    /// - 含字母表外的符号返回 `BuildError::InvalidSymbol`，trie 不变
    /// - 同一模式串重复插入时以最后一次的标签为准，返回被替换的旧标签
    /// - 节点或模式数超出 32 位 id 时返回 `BuildError::CapacityExceeded`，trie 不变
    pub fn insert(&mut self, pattern: &[u8], label: Option<L>) -> Result<Option<L>, BuildError> {
        if pattern.is_empty() {
            return Err(BuildError::EmptyPattern);
        }
        if let Some(offset) = pattern.iter().position(|&s| !T::accepts(s)) {
            return Err(BuildError::InvalidSymbol { symbol: pattern[offset], offset });
        }

        // 先确认整条路径所需的新节点都能分配 id，失败时 trie 不变
        let mut cur = ROOT;
        let mut matched = 0;
        for &sym in pattern {
            match self.nodes[cur as usize].transitions.get(sym) {
                Some(next) => {
                    cur = next;
                    matched += 1;
                }
                None => break,
            }
        }
        // 新节点的最大 id 为 len + 新增数 - 1
        next_id(self.nodes.len() + (pattern.len() - matched) - 1)?;
        if matched < pattern.len() || self.nodes[cur as usize].pattern.is_none() {
            next_id(self.patterns.len())?;
        }

        // 以下 `as` 转换已由上面的检查保证不会截断
        for (depth, &sym) in pattern.iter().enumerate().skip(matched) {
            let next = self.nodes.len() as NodeId;
            self.nodes.push(Node::new(depth as u32 + 1));
            self.nodes[cur as usize].transitions.insert(sym, next);
            cur = next;
        }

        let node = &mut self.nodes[cur as usize];
        match node.pattern {
            Some(pi) => {
                trace!("pattern {} re-inserted, label replaced", String::from_utf8_lossy(pattern));
                Ok(std::mem::replace(&mut self.patterns[pi as usize].label, label))
            }
            None => {
                node.pattern = Some(self.patterns.len() as u32);
                self.patterns.push(Pattern { text: pattern.to_vec(), label });
                Ok(None)
            }
        }
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

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::alphabet::{DnaTable, SparseTable};

    #[test]
    fn shared_prefixes_share_nodes() {
        let mut t: Trie<DnaTable, ()> = Trie::new();
        t.insert(b"acgt", None).unwrap();
        t.insert(b"acga", None).unwrap();
        t.insert(b"ac", None).unwrap();
        // root + a, ac, acg, acgt, acga
        assert_eq!(t.num_nodes(), 6);
        assert_eq!(t.num_patterns(), 3);
    }

    #[test]
    fn empty_pattern_rejected_and_trie_unchanged() {
        let mut t: Trie<SparseTable, ()> = Trie::new();
        assert_eq!(t.insert(b"", None), Err(BuildError::EmptyPattern));
        assert_eq!(t.num_nodes(), 1);
        assert!(t.is_empty());
        // 之后仍可继续插入
        t.insert(b"x", None).unwrap();
        assert_eq!(t.num_patterns(), 1);
    }

    #[test]
    fn invalid_symbol_leaves_no_partial_path() {
        let mut t: Trie<DnaTable, ()> = Trie::new();
        let err = t.insert(b"acxg", None).unwrap_err();
        assert_eq!(err, BuildError::InvalidSymbol { symbol: b'x', offset: 2 });
        assert_eq!(t.num_nodes(), 1);
    }

    #[test]
    fn ids_past_u32_are_rejected_not_truncated() {
        assert_eq!(next_id(7), Ok(7));
        assert_eq!(next_id(NodeId::MAX as usize), Ok(NodeId::MAX));
        #[cfg(target_pointer_width = "64")]
        {
            let len = NodeId::MAX as usize + 1;
            assert_eq!(next_id(len), Err(BuildError::CapacityExceeded(len)));
        }
    }

    #[test]
    fn extending_an_existing_path_adds_only_new_nodes() {
        let mut t: Trie<DnaTable, ()> = Trie::new();
        t.insert(b"ac", None).unwrap();
        t.insert(b"acgt", None).unwrap();
        assert_eq!(t.num_nodes(), 5);
        t.insert(b"acg", None).unwrap();
        assert_eq!(t.num_nodes(), 5);
        assert_eq!(t.num_patterns(), 3);
    }

    #[test]
    fn duplicate_pattern_last_label_wins() {
        let mut t: Trie<DnaTable, String> = Trie::new();
        assert_eq!(t.insert(b"gatt", Some("read1".into())).unwrap(), None);
        let old = t.insert(b"gatt", Some("read2".into())).unwrap();
        assert_eq!(old.as_deref(), Some("read1"));
        assert_eq!(t.num_patterns(), 1);
        assert_eq!(t.patterns()[0].label.as_deref(), Some("read2"));
    }
}
