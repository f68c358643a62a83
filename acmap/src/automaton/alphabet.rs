use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::util::dna;

/// 单个节点的出边表：symbol -> child。
///
/// 两种实现满足同一契约：
/// - [`DnaTable`]：固定 5 槽数组（a c g t n），核酸数据用
/// - [`SparseTable`]：按 symbol 排序的稀疏表，任意字节都可作为字母
pub trait Transitions: Default + Clone {
    /// 该表能否表示 `symbol`。插入前用来校验整条模式串。
    fn accepts(symbol: u8) -> bool;

    /// 把一行原始输入规范化为该字母表上的符号序列。
    fn normalize(line: &[u8]) -> Vec<u8>;

    fn get(&self, symbol: u8) -> Option<NodeId>;

    /// 写入一条出边。调用方保证 `accepts(symbol)` 为真且该边此前不存在。
    fn insert(&mut self, symbol: u8, child: NodeId);

    /// 按任意顺序遍历全部出边。
    fn iter(&self) -> impl Iterator<Item = (u8, NodeId)> + '_;

    fn len(&self) -> usize {
        self.iter().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub const DNA_SYMBOLS: [u8; 5] = [b'a', b'c', b'g', b't', b'n'];

#[inline]
fn dna_slot(symbol: u8) -> Option<usize> {
    match symbol {
        b'a' => Some(0),
        b'c' => Some(1),
        b'g' => Some(2),
        b't' => Some(3),
        b'n' => Some(4),
        _ => None,
    }
}

/// 核酸字母表的定长出边表。输入需事先经过 `dna::normalize_seq` 规范化为小写。
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaTable {
    slots: [Option<NodeId>; 5],
}

impl Transitions for DnaTable {
    #[inline]
    fn accepts(symbol: u8) -> bool {
        dna_slot(symbol).is_some()
    }

    fn normalize(line: &[u8]) -> Vec<u8> {
        dna::normalize_seq(line)
    }

    #[inline]
    fn get(&self, symbol: u8) -> Option<NodeId> {
        dna_slot(symbol).and_then(|i| self.slots[i])
    }

    fn insert(&mut self, symbol: u8, child: NodeId) {
        if let Some(i) = dna_slot(symbol) {
            self.slots[i] = Some(child);
        }
    }

    fn iter(&self) -> impl Iterator<Item = (u8, NodeId)> + '_ {
        DNA_SYMBOLS
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(&s, c)| c.map(|c| (s, c)))
    }
}

/// 通用文本字母表的稀疏出边表，(symbol, child) 按 symbol 升序存放。
///
/// 符号是单个字节，UTF-8 文本按字节进入自动机，命中坐标也是字节偏移。
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseTable {
    edges: Vec<(u8, NodeId)>,
}

impl Transitions for SparseTable {
    #[inline]
    fn accepts(_symbol: u8) -> bool {
        true
    }

    fn normalize(line: &[u8]) -> Vec<u8> {
        dna::normalize_text(line)
    }

    #[inline]
    fn get(&self, symbol: u8) -> Option<NodeId> {
        // 出边通常很少，线性扫描比二分更快
        if self.edges.len() <= 8 {
            return self.edges.iter().find(|e| e.0 == symbol).map(|e| e.1);
        }
        self.edges
            .binary_search_by_key(&symbol, |e| e.0)
            .ok()
            .map(|i| self.edges[i].1)
    }

    fn insert(&mut self, symbol: u8, child: NodeId) {
        match self.edges.binary_search_by_key(&symbol, |e| e.0) {
            Ok(i) => self.edges[i].1 = child,
            Err(i) => self.edges.insert(i, (symbol, child)),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (u8, NodeId)> + '_ {
        self.edges.iter().copied()
    }

    fn len(&self) -> usize {
        self.edges.len()
    }
}
