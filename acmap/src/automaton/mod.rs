//! Aho-Corasick 多模式匹配自动机。
//!
//! 三个阶段依次进行：
//!
//! 1. [`Trie::insert`] 插入模式串（可带来源标签）
//! 2. [`Trie::compile`] 按层 BFS 计算失败链接，得到只读的 [`Automaton`]
//! 3. [`Scanner`] / [`Automaton::find_iter`] 流式扫描文本，报告每一次命中
//!
//! 节点存放在 arena（`Vec`）中，子节点和失败链接都是 [`NodeId`] 下标。

pub mod alphabet;
pub mod compile;
pub mod scan;
pub mod trie;

pub use alphabet::{DnaTable, SparseTable, Transitions};
pub use compile::Automaton;
pub use scan::{Match, Matches, Scanner};
pub use trie::{Pattern, Trie};

/// arena 中节点的下标。
pub type NodeId = u32;

/// 根节点固定位于 arena 的 0 号位置。
pub const ROOT: NodeId = 0;

/// 核酸模式（reads）使用的自动机。
pub type DnaAutomaton<L = String> = Automaton<DnaTable, L>;

/// 任意字节文本使用的自动机。
pub type TextAutomaton<L = String> = Automaton<SparseTable, L>;
