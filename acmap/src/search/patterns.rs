use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

use super::PatternFormat;
use crate::automaton::{Transitions, Trie};
use crate::io::fasta::FastaReader;
use crate::io::fastq::FastqReader;

/// 模式串加载统计。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// 读到的记录数（FASTQ/FASTA 记录或非空行）
    pub records: u64,
    /// 成功插入（含标签被覆盖的重复模式）
    pub inserted: u64,
    /// 因空序列或非法符号被拒绝
    pub rejected: u64,
    /// 与已有模式完全相同、覆盖了旧标签的插入
    pub relabelled: u64,
}

impl LoadReport {
    fn add<T: Transitions>(&mut self, trie: &mut Trie<T, String>, seq: &[u8], label: Option<String>) {
        self.records += 1;
        match trie.insert(&T::normalize(seq), label) {
            Ok(Some(old)) => {
                self.inserted += 1;
                self.relabelled += 1;
                debug!("duplicate pattern, label '{}' replaced", old);
            }
            Ok(None) => self.inserted += 1,
            Err(e) => {
                self.rejected += 1;
                debug!("record {} rejected: {}", self.records, e);
            }
        }
    }
}

/// 从首个非空行推断格式：`@` -> FASTQ，`>` -> FASTA，否则逐行模式。
pub fn detect_format<R: BufRead>(reader: &mut R) -> Result<PatternFormat> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(PatternFormat::Lines);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(i) => {
                return Ok(match buf[i] {
                    b'@' => PatternFormat::Fastq,
                    b'>' => PatternFormat::Fasta,
                    _ => PatternFormat::Lines,
                });
            }
            None => {
                let n = buf.len();
                reader.consume(n);
            }
        }
    }
}

/// 把模式源中的全部记录插入 `trie`。单条记录被拒绝不会中断加载。
///
/// - FASTQ：序列行为模式，read id 为标签
/// - FASTA：每条记录的完整序列为模式，记录 id 为标签
/// - Lines：每个非空行为一条模式，无标签；以 `@` `+` `>` 开头的行跳过
pub fn load_patterns<T, R>(
    mut reader: R,
    format: PatternFormat,
    trie: &mut Trie<T, String>,
) -> Result<LoadReport>
where
    T: Transitions,
    R: BufRead,
{
    let format = match format {
        PatternFormat::Auto => detect_format(&mut reader)?,
        f => f,
    };
    debug!("pattern format: {:?}", format);

    let mut report = LoadReport::default();
    match format {
        PatternFormat::Fastq => {
            let mut fq = FastqReader::new(reader);
            while let Some(rec) = fq.next_record()? {
                report.add(trie, &rec.seq, Some(rec.id));
            }
        }
        PatternFormat::Fasta => {
            let mut fa = FastaReader::new(reader);
            while let Some(rec) = fa.next_record()? {
                report.add(trie, &rec.seq, Some(rec.id));
            }
        }
        PatternFormat::Lines | PatternFormat::Auto => {
            let mut line = Vec::new();
            loop {
                line.clear();
                if reader.read_until(b'\n', &mut line)? == 0 {
                    break;
                }
                if matches!(line.first(), Some(b'@' | b'+' | b'>')) {
                    continue;
                }
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                report.add(trie, &line, None);
            }
        }
    }

    if report.rejected > 0 {
        warn!("{} of {} pattern records rejected", report.rejected, report.records);
    }
    if report.relabelled > 0 {
        warn!(
            "{} duplicate patterns: only the last label of each is kept",
            report.relabelled
        );
    }
    Ok(report)
}

/// 打开文件并加载模式串，返回 trie 与统计信息。
pub fn load_pattern_file<T: Transitions>(
    path: &str,
    format: PatternFormat,
) -> Result<(Trie<T, String>, LoadReport)> {
    let fh = std::fs::File::open(path)
        .map_err(|e| anyhow!("cannot open pattern file '{}': {}", path, e))?;
    let mut trie = Trie::new();
    let report = load_patterns(std::io::BufReader::new(fh), format, &mut trie)
        .map_err(|e| anyhow!("failed to read patterns from '{}': {}", path, e))?;
    info!(
        "patterns: {} records, {} inserted, {} distinct, {} nodes",
        report.records,
        report.inserted,
        trie.num_patterns(),
        trie.num_nodes()
    );
    Ok((trie, report))
}
