//! # acmap
//!
//! 基于 Aho-Corasick 自动机的多模式 read 匹配工具。
//!
//! 把一批模式串（短 read 或任意字符串）构建成自动机，然后把大段文本
//! （基因组，或多个基因组拼接）**只扫描一遍**，报告每个模式的每一次出现：
//!
//! - **Trie 构建**：插入模式串，终止节点记录模式与来源标签（read id）
//! - **自动机编译**：BFS 计算失败链接与输出链
//! - **流式匹配**：逐符号推进，沿输出链报告全部命中（含互为后缀的模式）
//! - **分类汇总**：按 read 统计命中的物种，输出分类报告
//!
//! ## 快速示例
//!
//! ```rust
//! use acmap::automaton::{DnaTable, Trie};
//! use acmap::util::dna;
//!
//! let mut trie: Trie<DnaTable, String> = Trie::new();
//! trie.insert(&dna::normalize_seq(b"GATTACA"), Some("read1".to_string())).unwrap();
//! trie.insert(&dna::normalize_seq(b"ACA"), Some("read2".to_string())).unwrap();
//! let ac = trie.compile();
//!
//! let text = dna::normalize_seq(b"TTGATTACAG");
//! for m in ac.find_all(&text) {
//!     println!("{:?} {}..={}", m.label, m.start, m.end);
//! }
//! assert_eq!(ac.find_all(&text).len(), 2);
//! ```
//!
//! ## 模块说明
//!
//! - [`automaton`] — Trie、失败链接编译、流式扫描
//! - [`io`] — FASTA / FASTQ 行源
//! - [`search`] — 模式加载、文本扫描、命中输出
//! - [`classify`] — 按 read / 物种汇总与报告
//! - [`index`] — 编译后自动机的持久化
//! - [`util`] — 序列规范化

pub mod automaton;
pub mod classify;
pub mod error;
pub mod index;
pub mod io;
pub mod search;
pub mod util;
