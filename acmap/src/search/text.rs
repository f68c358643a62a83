use anyhow::{anyhow, Result};
use log::debug;
use std::io::BufRead;

use crate::automaton::{Automaton, Match, Transitions};
use crate::io::fasta::{Line, SequenceLines};

/// 单个文本源的扫描统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub records: u64,
    pub symbols: u64,
    pub matches: u64,
}

/// 把 FASTA 文本逐行送入自动机，对每个命中调用 `sink(record_id, match)`。
///
/// 默认整份文件共享一个坐标空间（跨记录连续计数）；
/// `reset_per_record` 为真时每遇到一个 header 就重置游标。
pub fn scan_reader<'a, T, L, R, F>(
    automaton: &'a Automaton<T, L>,
    reader: R,
    reset_per_record: bool,
    mut sink: F,
) -> Result<ScanStats>
where
    T: Transitions,
    R: BufRead,
    F: FnMut(&str, Match<'a, L>),
{
    let mut lines = SequenceLines::new(reader);
    let mut scanner = automaton.scanner();
    let mut stats = ScanStats::default();
    let mut record = String::new();

    while let Some(line) = lines.next_line()? {
        match line {
            Line::Header(id) => {
                stats.records += 1;
                record.clear();
                record.push_str(id);
                if reset_per_record {
                    scanner.reset();
                }
            }
            Line::Sequence(raw) => {
                let seq = T::normalize(raw);
                stats.symbols += seq.len() as u64;
                scanner.feed(&seq, |m| {
                    stats.matches += 1;
                    sink(&record, m);
                });
            }
        }
    }
    Ok(stats)
}

/// 打开 FASTA 文件并扫描，错误信息带上文件路径。
pub fn scan_fasta<'a, T, L, F>(
    automaton: &'a Automaton<T, L>,
    path: &str,
    reset_per_record: bool,
    sink: F,
) -> Result<ScanStats>
where
    T: Transitions,
    F: FnMut(&str, Match<'a, L>),
{
    let fh = std::fs::File::open(path)
        .map_err(|e| anyhow!("cannot open text FASTA '{}': {}", path, e))?;
    let stats = scan_reader(automaton, std::io::BufReader::new(fh), reset_per_record, sink)
        .map_err(|e| anyhow!("failed to scan '{}': {}", path, e))?;
    debug!(
        "scanned {}: {} records, {} symbols, {} matches",
        path, stats.records, stats.symbols, stats.matches
    );
    Ok(stats)
}
