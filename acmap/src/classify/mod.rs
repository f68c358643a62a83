use anyhow::{anyhow, Result};
use log::info;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::automaton::{Automaton, Transitions};
use crate::index::store::AnyAutomaton;
use crate::search::scan_fasta;

pub mod report;

pub use report::Summary;

#[derive(Clone, Copy, Debug)]
pub struct ClassifyOpt {
    pub threads: usize,
    pub reset_per_record: bool,
}

/// 一个参考基因组：显示名 + FASTA 路径。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genome {
    pub name: String,
    pub path: String,
}

impl FromStr for Genome {
    type Err = anyhow::Error;

    /// `NAME=PATH`，或只给路径（以文件名去掉扩展名作为名字）。
    fn from_str(s: &str) -> Result<Self> {
        if let Some((name, path)) = s.split_once('=') {
            if name.is_empty() || path.is_empty() {
                return Err(anyhow!("invalid genome '{}', expected NAME=PATH", s));
            }
            return Ok(Genome { name: name.to_string(), path: path.to_string() });
        }
        let stem = Path::new(s)
            .file_stem()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("cannot derive a genome name from '{}'", s))?;
        Ok(Genome { name: stem.to_string(), path: s.to_string() })
    }
}

/// label -> attribution -> 命中数。
///
/// 自动机只逐条输出命中，汇总在这里完成。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<String, HashMap<String, u64>>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: &str, attribution: &str) {
        self.add(label, attribution, 1);
    }

    pub fn add(&mut self, label: &str, attribution: &str, n: u64) {
        if n == 0 {
            return;
        }
        *self
            .counts
            .entry(label.to_string())
            .or_default()
            .entry(attribution.to_string())
            .or_insert(0) += n;
    }

    pub fn merge(&mut self, other: Tally) {
        for (label, per) in other.counts {
            for (attr, n) in per {
                self.add(&label, &attr, n);
            }
        }
    }

    pub fn organisms_for(&self, label: &str) -> Option<&HashMap<String, u64>> {
        self.counts.get(label)
    }

    pub fn count(&self, label: &str, attribution: &str) -> u64 {
        self.counts
            .get(label)
            .and_then(|m| m.get(attribution))
            .copied()
            .unwrap_or(0)
    }

    /// 至少命中一次的 label 数
    pub fn num_labels(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HashMap<String, u64>)> {
        self.counts.iter()
    }
}

/// 扫描一个基因组，统计每个 label 的命中数。无标签的模式不计入。
pub fn count_hits<T: Transitions>(
    automaton: &Automaton<T, String>,
    genome: &Genome,
    reset_per_record: bool,
) -> Result<Tally> {
    let mut per_label: HashMap<&str, u64> = HashMap::new();
    let stats = scan_fasta(automaton, &genome.path, reset_per_record, |_, m| {
        if let Some(label) = m.label {
            *per_label.entry(label.as_str()).or_insert(0) += 1;
        }
    })?;
    info!(
        "{}: {} symbols, {} matches, {} labels hit",
        genome.name,
        stats.symbols,
        stats.matches,
        per_label.len()
    );

    let mut tally = Tally::new();
    for (label, n) in per_label {
        tally.add(label, &genome.name, n);
    }
    Ok(tally)
}

/// 用同一个只读自动机并行扫描所有基因组，合并各自的统计。
///
/// 每个扫描持有自己的游标与累计表，自动机在线程间只读共享。
pub fn classify_genomes<T>(
    automaton: &Automaton<T, String>,
    genomes: &[Genome],
    opt: ClassifyOpt,
) -> Result<Tally>
where
    T: Transitions + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads.max(1))
        .build()
        .map_err(|e| anyhow!("cannot start thread pool: {}", e))?;

    let parts: Vec<Tally> = pool.install(|| {
        genomes
            .par_iter()
            .map(|g| count_hits(automaton, g, opt.reset_per_record))
            .collect::<Result<Vec<_>>>()
    })?;

    let mut tally = Tally::new();
    for part in parts {
        tally.merge(part);
    }
    Ok(tally)
}

pub fn classify_with_opt(
    automaton: &AnyAutomaton,
    genomes: &[Genome],
    opt: ClassifyOpt,
) -> Result<Tally> {
    match automaton {
        AnyAutomaton::Dna(ac) => classify_genomes(ac, genomes, opt),
        AnyAutomaton::Text(ac) => classify_genomes(ac, genomes, opt),
    }
}
