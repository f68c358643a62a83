//! Line sources: FASTA / FASTQ parsing.

pub mod fasta;
pub mod fastq;
