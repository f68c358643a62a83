use anyhow::{anyhow, Result};
use std::io::BufRead;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

/// Record-at-a-time FASTA reader. Sequence bytes are returned as-is minus
/// whitespace; callers normalise them for the automaton.
///
/// Blank lines before the first header are skipped; any other text there is
/// an error, as is a header with no id. Errors carry the 1-based line number.
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    line_no: usize,
    /// header text after `>` and the line it was read from
    pending: Option<(usize, String)>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), done: false, line_no: 0, pending: None }
    }

    fn read_line(&mut self) -> Result<usize> {
        self.buf.clear();
        let n = self
            .reader
            .read_line(&mut self.buf)
            .map_err(|e| anyhow!("line {}: {}", self.line_no + 1, e))?;
        if n > 0 { self.line_no += 1; }
        Ok(n)
    }

    fn take_header(&self) -> Option<(usize, String)> {
        self.buf.strip_prefix('>').map(|h| (self.line_no, h.trim().to_string()))
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done { return Ok(None); }

        let (header_line, header) = match self.pending.take() {
            Some(h) => h,
            None => loop {
                if self.read_line()? == 0 { self.done = true; return Ok(None); }
                if let Some(h) = self.take_header() { break h; }
                if !self.buf.trim().is_empty() {
                    return Err(anyhow!("line {}: sequence data before the first '>' header", self.line_no));
                }
            },
        };

        let (id, desc) = split_header(&header);
        if id.is_empty() {
            return Err(anyhow!("line {}: FASTA header without an id", header_line));
        }

        let mut seq: Vec<u8> = Vec::new();
        loop {
            let n = self
                .read_line()
                .map_err(|e| anyhow!("{} (in record '{}')", e, id))?;
            if n == 0 { self.done = true; break; }
            if let Some(h) = self.take_header() {
                self.pending = Some(h);
                break;
            }
            seq.extend(
                self.buf
                    .bytes()
                    .filter(|b| !matches!(b, b'\n' | b'\r' | b' ' | b'\t')),
            );
        }

        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

pub(crate) fn split_header(header: &str) -> (String, Option<String>) {
    let mut parts = header.splitn(2, char::is_whitespace);
    let id = parts.next().unwrap_or("").to_string();
    let desc = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    (id, desc)
}

/// One event from [`SequenceLines`].
#[derive(Debug, PartialEq, Eq)]
pub enum Line<'a> {
    /// Record id (text after `>` up to the first whitespace).
    Header(&'a str),
    /// Raw sequence line with the line terminator stripped.
    Sequence(&'a [u8]),
}

/// Line-oriented FASTA source for genome-sized texts: nothing beyond the
/// current line is held in memory.
pub struct SequenceLines<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    header: String,
}

impl<R: BufRead> SequenceLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new(), header: String::new() }
    }

    pub fn next_line(&mut self) -> Result<Option<Line<'_>>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_until(b'\n', &mut self.buf)?;
            if n == 0 {
                return Ok(None);
            }
            while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                self.buf.pop();
            }
            if self.buf.first() == Some(&b'>') {
                let text = String::from_utf8_lossy(&self.buf[1..]);
                self.header = split_header(text.trim()).0;
                return Ok(Some(Line::Header(&self.header)));
            }
            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(Line::Sequence(&self.buf)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_simple_fasta() {
        let data = b">chr1 first\nACgTNN\n>chr2\nAAA\n";
        let cursor = Cursor::new(&data[..]);
        let mut r = FastaReader::new(cursor);

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.id, "chr1");
        assert_eq!(r1.desc.as_deref(), Some("first"));
        assert_eq!(r1.seq, b"ACgTNN");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.id, "chr2");
        assert_eq!(r2.desc, None);
        assert_eq!(r2.seq, b"AAA");

        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn parse_fasta_with_crlf_and_whitespace() {
        let data = b">chr1 desc\r\nAC g t n\r\n acgt\r\n>chr2 \r\n N N N \r\n";
        let cursor = Cursor::new(&data[..]);
        let mut r = FastaReader::new(cursor);

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.id, "chr1");
        assert_eq!(r1.seq, b"ACgtnacgt");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.id, "chr2");
        assert_eq!(r2.desc, None);
        assert_eq!(r2.seq, b"NNN");

        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn empty_record_is_kept() {
        let data = b"\n>p1\n\n>p2\nAC\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.id, "p1");
        assert!(r1.seq.is_empty());
        assert_eq!(r.next_record().unwrap().unwrap().seq, b"AC");
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn rejects_sequence_before_header() {
        let data = b"\nACGT\n>chr1\nAC\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        let err = r.next_record().unwrap_err().to_string();
        assert!(err.contains("line 2"), "{}", err);
        assert!(err.contains("before the first '>' header"), "{}", err);
    }

    #[test]
    fn rejects_header_without_id_with_its_line() {
        let data = b">chr1\nAC\nGT\n>  \nAC\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        assert_eq!(r.next_record().unwrap().unwrap().seq, b"ACGT");
        let err = r.next_record().unwrap_err().to_string();
        assert!(err.contains("line 4"), "{}", err);
        assert!(err.contains("without an id"), "{}", err);
    }

    #[test]
    fn invalid_utf8_names_line_and_record() {
        let data = b">chr7\nAC\nG\xffT\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        let err = r.next_record().unwrap_err().to_string();
        assert!(err.contains("line 3"), "{}", err);
        assert!(err.contains("'chr7'"), "{}", err);
    }

    #[test]
    fn sequence_lines_reports_headers_and_skips_blanks() {
        let data = b">chr1 first\r\nACGT\n\n  \nGG\n>chr2\nTT";
        let mut r = SequenceLines::new(Cursor::new(&data[..]));

        assert_eq!(r.next_line().unwrap(), Some(Line::Header("chr1")));
        assert_eq!(r.next_line().unwrap(), Some(Line::Sequence(b"ACGT")));
        assert_eq!(r.next_line().unwrap(), Some(Line::Sequence(b"GG")));
        assert_eq!(r.next_line().unwrap(), Some(Line::Header("chr2")));
        assert_eq!(r.next_line().unwrap(), Some(Line::Sequence(b"TT")));
        assert_eq!(r.next_line().unwrap(), None);
    }
}
