use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::automaton::{DnaAutomaton, TextAutomaton};
use crate::search::LoadReport;

/// 当前索引文件格式版本；结构变化时递增
pub const FORMAT_VERSION: u32 = 1;

/// 索引构建元信息，随自动机一并持久化。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexMeta {
    pub pattern_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
    pub load: LoadReport,
}

/// 两种字母表的自动机之一。
#[derive(Debug, Serialize, Deserialize)]
pub enum AnyAutomaton {
    Dna(DnaAutomaton),
    Text(TextAutomaton),
}

impl AnyAutomaton {
    pub fn num_nodes(&self) -> usize {
        match self {
            AnyAutomaton::Dna(ac) => ac.num_nodes(),
            AnyAutomaton::Text(ac) => ac.num_nodes(),
        }
    }

    pub fn num_patterns(&self) -> usize {
        match self {
            AnyAutomaton::Dna(ac) => ac.num_patterns(),
            AnyAutomaton::Text(ac) => ac.num_patterns(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            AnyAutomaton::Dna(ac) => ac.validate(),
            AnyAutomaton::Text(ac) => ac.validate(),
        }
    }
}

/// 落盘的已编译自动机（bincode 序列化）。
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredIndex {
    pub version: u32,
    pub meta: IndexMeta,
    pub automaton: AnyAutomaton,
}

impl StoredIndex {
    pub fn new(automaton: AnyAutomaton, meta: IndexMeta) -> Self {
        Self { version: FORMAT_VERSION, meta, automaton }
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let f = std::fs::File::create(path)?;
        let mut w = std::io::BufWriter::new(f);
        bincode::serialize_into(&mut w, self)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let f = std::fs::File::open(path)?;
        let idx: Self = bincode::deserialize_from(std::io::BufReader::new(f))?;
        if idx.version != FORMAT_VERSION {
            bail!(
                "index '{}' has format version {}, expected {}",
                path,
                idx.version,
                FORMAT_VERSION
            );
        }
        if let Err(e) = idx.automaton.validate() {
            bail!("index '{}' is corrupt: {}", path, e);
        }
        Ok(idx)
    }
}
