use std::io::Write;

use super::Tally;

/// 分类汇总：每个物种被多少条 read 命中，以及唯一/多重/未命中的 read 数。
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_reads: u64,
    /// (物种, 命中该物种的 read 数, 命中次数)，顺序与输入的物种列表一致
    pub per_organism: Vec<(String, u64, u64)>,
    pub unique: u64,
    pub multiple: u64,
    pub unmatched: u64,
}

fn percent(n: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        n as f64 * 100.0 / total as f64
    }
}

impl Summary {
    /// `total_reads` 是加载的 read 总数（含未命中与被覆盖标签的 read）。
    pub fn from_tally(tally: &Tally, organisms: &[String], total_reads: u64) -> Self {
        let mut per_organism: Vec<(String, u64, u64)> =
            organisms.iter().map(|o| (o.clone(), 0, 0)).collect();
        let mut unique = 0u64;
        let mut multiple = 0u64;

        for (_, per) in tally.iter() {
            match per.len() {
                0 => {}
                1 => unique += 1,
                _ => multiple += 1,
            }
            for entry in per_organism.iter_mut() {
                if let Some(&n) = per.get(&entry.0) {
                    entry.1 += 1;
                    entry.2 += n;
                }
            }
        }

        let matched = unique + multiple;
        Self {
            total_reads,
            per_organism,
            unique,
            multiple,
            unmatched: total_reads.saturating_sub(matched),
        }
    }

    /// 命中 read 数最多的物种；并列时取列表中靠前者。
    pub fn top_organism(&self) -> Option<(&str, f64)> {
        let mut best: Option<&(String, u64, u64)> = None;
        for entry in &self.per_organism {
            if entry.1 > 0 && best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        let matched: u64 = self.per_organism.iter().map(|e| e.1).sum();
        best.map(|b| (b.0.as_str(), percent(b.1, matched)))
    }

    pub fn write_to(&self, title: &str, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "--- Classification Report for {} ---", title)?;
        writeln!(out)?;
        writeln!(out, "Reads matching each organism:")?;
        for (name, reads, hits) in &self.per_organism {
            writeln!(out, "  {:<20} {} reads, {} matches", name, reads, hits)?;
        }
        writeln!(out)?;
        writeln!(out, "Total reads: {}", self.total_reads)?;
        writeln!(
            out,
            "Reads matching exactly one organism: {} ({:.2}%)",
            self.unique,
            percent(self.unique, self.total_reads)
        )?;
        writeln!(
            out,
            "Reads matching multiple organisms: {} ({:.2}%)",
            self.multiple,
            percent(self.multiple, self.total_reads)
        )?;
        writeln!(
            out,
            "Reads with no matches: {} ({:.2}%)",
            self.unmatched,
            percent(self.unmatched, self.total_reads)
        )?;
        if let Some((name, pct)) = self.top_organism() {
            writeln!(out, "Top organism: {} ({:.2}% of matched assignments)", name, pct)?;
        }
        Ok(())
    }
}
