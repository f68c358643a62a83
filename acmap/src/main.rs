use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::io::Write;

use acmap::classify::{self, ClassifyOpt, Genome, Summary};
use acmap::index::store::{AnyAutomaton, StoredIndex};
use acmap::search::{self, Alphabet, LoadReport, PatternFormat, SearchOpt};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "acmap", author, version, about = "Aho-Corasick multi-pattern read matcher", arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the automaton comes from: a prebuilt index or a pattern file.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct PatternSource {
    /// Prebuilt automaton (.ac) from `acmap build`
    #[arg(short = 'i', long = "index")]
    index: Option<String>,
    /// Pattern file (FASTQ reads, FASTA records or one pattern per line)
    #[arg(short = 'p', long = "patterns")]
    patterns: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build and compile the automaton for a pattern set
    Build {
        /// Pattern file (FASTQ reads, FASTA records or one pattern per line)
        patterns: String,
        /// Output prefix for the index file (<prefix>.ac)
        #[arg(short, long, default_value = "patterns")]
        output: String,
        #[arg(long, value_enum, default_value_t = Alphabet::Dna)]
        alphabet: Alphabet,
        #[arg(long, value_enum, default_value_t = PatternFormat::Auto)]
        format: PatternFormat,
    },
    /// Report every occurrence of every pattern in FASTA texts
    Search {
        #[command(flatten)]
        source: PatternSource,
        /// Text FASTA files, scanned one after another
        #[arg(required = true)]
        texts: Vec<String>,
        /// Output TSV path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
        /// Print only the number of matches per text
        #[arg(long)]
        count: bool,
        /// Restart coordinates at every FASTA record
        #[arg(long)]
        reset_per_record: bool,
        #[arg(long, value_enum, default_value_t = Alphabet::Dna)]
        alphabet: Alphabet,
        #[arg(long, value_enum, default_value_t = PatternFormat::Auto)]
        format: PatternFormat,
    },
    /// Classify reads by which reference genomes they occur in
    Classify {
        #[command(flatten)]
        source: PatternSource,
        /// Reference genomes as NAME=PATH (or just PATH)
        #[arg(required = true)]
        genomes: Vec<Genome>,
        /// Report path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Restart coordinates at every FASTA record
        #[arg(long)]
        reset_per_record: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::init();

    match cli.command {
        Commands::Build { patterns, output, alphabet, format } => {
            let path = search::build_index(&patterns, &output, alphabet, format)?;
            println!("automaton saved: {}", path);
            Ok(())
        }
        Commands::Search { source, texts, out, count, reset_per_record, alphabet, format } => {
            let (automaton, _) = load_automaton(&source, alphabet, format)?;
            let opt = SearchOpt { reset_per_record, count_only: count };
            search::search_with_opt(&automaton, &texts, out.as_deref(), opt)
        }
        Commands::Classify { source, genomes, out, threads, reset_per_record } => {
            // reads 总是核酸字母表
            let (automaton, load) = load_automaton(&source, Alphabet::Dna, PatternFormat::Auto)?;
            let opt = ClassifyOpt { threads, reset_per_record };
            run_classify(&automaton, &load, &source, &genomes, out.as_deref(), opt)
        }
    }
}

fn load_automaton(
    source: &PatternSource,
    alphabet: Alphabet,
    format: PatternFormat,
) -> Result<(AnyAutomaton, LoadReport)> {
    if let Some(index) = &source.index {
        let stored = StoredIndex::load_from_file(index)
            .map_err(|e| anyhow::anyhow!("cannot load index '{}': {}", index, e))?;
        info!(
            "loaded {} ({} patterns, built {})",
            index,
            stored.automaton.num_patterns(),
            stored.meta.build_timestamp.as_deref().unwrap_or("?")
        );
        return Ok((stored.automaton, stored.meta.load));
    }
    match &source.patterns {
        Some(p) => search::build_automaton(p, alphabet, format),
        None => anyhow::bail!("either --index or --patterns is required"),
    }
}

fn run_classify(
    automaton: &AnyAutomaton,
    load: &LoadReport,
    source: &PatternSource,
    genomes: &[Genome],
    out_path: Option<&str>,
    opt: ClassifyOpt,
) -> Result<()> {
    let tally = classify::classify_with_opt(automaton, genomes, opt)?;
    let organisms: Vec<String> = genomes.iter().map(|g| g.name.clone()).collect();
    let summary = Summary::from_tally(&tally, &organisms, load.records);

    let title = source
        .patterns
        .as_deref()
        .or(source.index.as_deref())
        .unwrap_or("reads");
    let mut out: Box<dyn Write> = match out_path {
        Some(p) => Box::new(std::io::BufWriter::new(std::fs::File::create(p)?)),
        None => Box::new(std::io::BufWriter::new(std::io::stdout())),
    };
    summary.write_to(title, &mut *out)?;
    out.flush()?;
    Ok(())
}
