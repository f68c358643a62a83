use anyhow::{anyhow, Result};
use std::io::BufRead;

use super::fasta::split_header;

#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

pub struct FastqReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    line_no: usize,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), done: false, line_no: 0 }
    }

    fn read_line(&mut self) -> Result<usize> {
        self.buf.clear();
        let n = self.reader.read_line(&mut self.buf)?;
        if n > 0 { self.line_no += 1; }
        Ok(n)
    }

    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        if self.done { return Ok(None); }

        // header line starting with '@'; blank lines between records are tolerated
        loop {
            if self.read_line()? == 0 { self.done = true; return Ok(None); }
            if !self.buf.trim().is_empty() { break; }
        }
        if !self.buf.starts_with('@') {
            return Err(anyhow!("line {}: FASTQ header not starting with '@'", self.line_no));
        }
        let (id, desc) = split_header(self.buf[1..].trim());

        // sequence line
        if self.read_line()? == 0 { return Err(anyhow!("unexpected EOF after header '{}'", id)); }
        let seq = self.buf.trim_end().as_bytes().to_vec();

        // plus line
        if self.read_line()? == 0 || !self.buf.starts_with('+') {
            return Err(anyhow!("line {}: missing '+' line for '{}'", self.line_no, id));
        }

        // quality line
        if self.read_line()? == 0 { return Err(anyhow!("missing quality line for '{}'", id)); }
        let qual = self.buf.trim_end().as_bytes().to_vec();

        // line-wrapped FASTQ is not supported
        if qual.len() != seq.len() {
            return Err(anyhow!("line {}: seq/qual length mismatch for '{}'", self.line_no, id));
        }

        Ok(Some(FastqRecord { id, desc, seq, qual }))
    }
}
