//! 演示如何在 library 模式下使用 acmap 进行多模式匹配。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_search
//! ```

use acmap::automaton::{DnaTable, SparseTable, Trie};
use acmap::classify::{Summary, Tally};
use acmap::util::dna;

fn main() {
    // 1. 参考序列（两个"物种"）
    let genomes: [(&str, &[u8]); 2] = [
        ("ref1", b"ACGTACGTAGCTGATCGTAGCTAGCTAGCTGATCGTAG"),
        ("ref2", b"TTGACCATGGCATCGATCGGGCTAGCTAACCGGTTAAC"),
    ];

    // 2. 以 read 为模式构建 trie
    let reads: [(&str, &[u8]); 4] = [
        ("read1", b"GCTGATCG"),
        ("read2", b"GCTAGCTA"),
        ("read3", b"CATCGATC"),
        ("read4", b"AAAAAAAA"),
    ];
    let mut trie: Trie<DnaTable, String> = Trie::new();
    for (id, seq) in &reads {
        if let Err(e) = trie.insert(&dna::normalize_seq(seq), Some(id.to_string())) {
            println!("跳过 {}: {}", id, e);
        }
    }
    println!("Trie: {} 个节点, {} 条模式", trie.num_nodes(), trie.num_patterns());

    // 3. 编译失败链接
    let ac = trie.compile();

    // 4. 扫描每个参考序列并汇总
    let mut tally = Tally::new();
    for (name, seq) in &genomes {
        let text = dna::normalize_seq(seq);
        println!("\n{}:", name);
        for m in ac.find_all(&text) {
            let label = m.label.map(String::as_str).unwrap_or("*");
            println!("  {} [{}..={}] {}", label, m.start, m.end, String::from_utf8_lossy(m.pattern));
            tally.record(label, name);
        }
    }

    // 5. 分类报告
    let organisms: Vec<String> = genomes.iter().map(|(n, _)| n.to_string()).collect();
    let summary = Summary::from_tally(&tally, &organisms, reads.len() as u64);
    println!();
    let _ = summary.write_to("example reads", &mut std::io::stdout());

    // 6. 通用文本字母表
    let mut words: Trie<SparseTable, ()> = Trie::new();
    for w in [&b"cat"[..], b"at", b"t"] {
        let _ = words.insert(w, None);
    }
    let ac = words.compile();
    println!("\nconcatenate:");
    for m in ac.find_iter(b"concatenate".iter().copied()) {
        println!("  ({}, {}, {})", String::from_utf8_lossy(m.pattern), m.start, m.end);
    }
}
