use anyhow::Result;
use log::info;
use std::io::Write;

use crate::automaton::{Automaton, DnaTable, SparseTable, Transitions};
use crate::index::store::{AnyAutomaton, IndexMeta, StoredIndex};

pub mod patterns;
pub mod text;

pub use patterns::{detect_format, load_pattern_file, load_patterns, LoadReport};
pub use text::{scan_fasta, scan_reader, ScanStats};

/// 自动机的工作字母表。
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Alphabet {
    /// a c g t n，定长出边表
    Dna,
    /// 任意字节，稀疏出边表
    Text,
}

/// 模式文件格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PatternFormat {
    Auto,
    Fastq,
    Fasta,
    Lines,
}

#[derive(Clone, Copy, Debug)]
pub struct SearchOpt {
    /// 每条 FASTA 记录单独计坐标
    pub reset_per_record: bool,
    /// 只输出每个文本文件的命中数
    pub count_only: bool,
}

/// 从模式文件构建并编译自动机。
pub fn build_automaton(
    pattern_path: &str,
    alphabet: Alphabet,
    format: PatternFormat,
) -> Result<(AnyAutomaton, LoadReport)> {
    Ok(match alphabet {
        Alphabet::Dna => {
            let (trie, report) = load_pattern_file::<DnaTable>(pattern_path, format)?;
            (AnyAutomaton::Dna(trie.compile()), report)
        }
        Alphabet::Text => {
            let (trie, report) = load_pattern_file::<SparseTable>(pattern_path, format)?;
            (AnyAutomaton::Text(trie.compile()), report)
        }
    })
}

/// 构建自动机并落盘为 `<output>.ac`。
pub fn build_index(
    pattern_path: &str,
    output: &str,
    alphabet: Alphabet,
    format: PatternFormat,
) -> Result<String> {
    let (automaton, load) = build_automaton(pattern_path, alphabet, format)?;
    info!(
        "automaton: {} nodes, {} patterns",
        automaton.num_nodes(),
        automaton.num_patterns()
    );
    let meta = IndexMeta {
        pattern_file: Some(pattern_path.to_string()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
        load,
    };
    let out_path = format!("{}.ac", output);
    StoredIndex::new(automaton, meta)
        .save_to_file(&out_path)
        .map_err(|e| anyhow::anyhow!("cannot write index to '{}': {}", out_path, e))?;
    Ok(out_path)
}

fn open_output(out_path: Option<&str>) -> Result<Box<dyn Write>> {
    Ok(if let Some(p) = out_path {
        Box::new(std::io::BufWriter::new(std::fs::File::create(p)?))
    } else {
        Box::new(std::io::BufWriter::new(std::io::stdout()))
    })
}

/// 输出列：source  pattern  label  start  end（缺省标签记为 `*`）。
/// source 为文本文件路径；按记录重置坐标时为记录 id。
fn write_matches<T: Transitions>(
    automaton: &Automaton<T, String>,
    text_path: &str,
    opt: SearchOpt,
    out: &mut dyn Write,
) -> Result<ScanStats> {
    let mut io_err: Option<std::io::Error> = None;
    let stats = scan_fasta(automaton, text_path, opt.reset_per_record, |record, m| {
        if opt.count_only || io_err.is_some() {
            return;
        }
        let source = if opt.reset_per_record { record } else { text_path };
        if let Err(e) = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            source,
            String::from_utf8_lossy(m.pattern),
            m.label.map(String::as_str).unwrap_or("*"),
            m.start,
            m.end,
        ) {
            io_err = Some(e);
        }
    })?;
    if let Some(e) = io_err {
        return Err(e.into());
    }
    if opt.count_only {
        writeln!(out, "{}\t{}", text_path, stats.matches)?;
    }
    Ok(stats)
}

/// 依次扫描每个文本文件并写出命中记录。
pub fn search_with_opt(
    automaton: &AnyAutomaton,
    text_paths: &[String],
    out_path: Option<&str>,
    opt: SearchOpt,
) -> Result<()> {
    let mut out = open_output(out_path)?;
    for path in text_paths {
        let stats = match automaton {
            AnyAutomaton::Dna(ac) => write_matches(ac, path, opt, &mut *out)?,
            AnyAutomaton::Text(ac) => write_matches(ac, path, opt, &mut *out)?,
        };
        info!(
            "{}: {} records, {} symbols, {} matches",
            path, stats.records, stats.symbols, stats.matches
        );
    }
    out.flush()?;
    Ok(())
}
