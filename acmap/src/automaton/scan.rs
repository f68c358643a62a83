use super::alphabet::Transitions;
use super::compile::Automaton;
use super::{NodeId, ROOT};

/// 一次命中：模式串在文本中的 1-based 闭区间 `[start, end]`。
///
/// 坐标是整个扫描过程中累计送入自动机的符号数，不按行重置。
/// 符号即字节：文本字母表下非 ASCII 字符（UTF-8 多字节）按字节计数，而不是按字符。
#[derive(Debug, PartialEq, Eq)]
pub struct Match<'a, L> {
    pub pattern: &'a [u8],
    pub label: Option<&'a L>,
    pub start: u64,
    pub end: u64,
}

impl<L> Clone for Match<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for Match<'_, L> {}

impl<'a, L> Match<'a, L> {
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// 0-based 半开区间，便于直接切片原始文本。
    pub fn span(&self) -> std::ops::Range<u64> {
        self.start - 1..self.end
    }
}

/// 扫描游标：当前状态 + 已消费的符号数。
///
/// 游标是扫描路径上唯一的可变状态；自动机本身只读，
/// 每个并发扫描持有自己的 `Scanner` 即可。
pub struct Scanner<'a, T, L> {
    automaton: &'a Automaton<T, L>,
    state: NodeId,
    position: u64,
}

impl<'a, T: Transitions, L> Scanner<'a, T, L> {
    pub fn new(automaton: &'a Automaton<T, L>) -> Self {
        Self { automaton, state: ROOT, position: 0 }
    }

    /// 已送入的符号总数，即下一个符号之前的 1-based 位置。
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn state(&self) -> NodeId {
        self.state
    }

    /// 回到根节点并把坐标清零，用于相互独立的记录之间（如不同基因组）。
    pub fn reset(&mut self) {
        self.state = ROOT;
        self.position = 0;
    }

    /// 推进一个符号，返回推进后状态的输出链起点。
    #[inline]
    fn step(&mut self, symbol: u8) -> Option<NodeId> {
        self.position += 1;
        self.state = self.automaton.next_state(self.state, symbol);
        self.automaton.first_output(self.state)
    }

    #[inline]
    fn emit(&self, node: NodeId) -> Match<'a, L> {
        let automaton: &'a Automaton<T, L> = self.automaton;
        let p = automaton.pattern_at(node);
        let len = p.text.len() as u64;
        Match {
            pattern: &p.text,
            label: p.label.as_ref(),
            start: self.position + 1 - len,
            end: self.position,
        }
    }

    /// 送入一段符号（通常是一行序列），对每次命中调用 `sink`。
    ///
    /// 同一结束位置上的命中按输出链顺序给出，即由长到短。
    pub fn feed<F>(&mut self, symbols: &[u8], mut sink: F)
    where
        F: FnMut(Match<'a, L>),
    {
        for &s in symbols {
            let mut out = self.step(s);
            while let Some(node) = out {
                sink(self.emit(node));
                out = self.automaton.next_output(node);
            }
        }
    }
}

/// [`Automaton::find_iter`] 返回的惰性迭代器，按需从文本中拉取符号。
pub struct Matches<'a, T, L, I> {
    scanner: Scanner<'a, T, L>,
    text: I,
    pending: Option<NodeId>,
}

impl<'a, T: Transitions, L, I: Iterator<Item = u8>> Iterator for Matches<'a, T, L, I> {
    type Item = Match<'a, L>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.pending {
                self.pending = self.scanner.automaton.next_output(node);
                return Some(self.scanner.emit(node));
            }
            let sym = self.text.next()?;
            self.pending = self.scanner.step(sym);
        }
    }
}

impl<T: Transitions, L> Automaton<T, L> {
    pub fn scanner(&self) -> Scanner<'_, T, L> {
        Scanner::new(self)
    }

    /// 惰性扫描：在迭代过程中逐个消费 `text` 的符号。
    pub fn find_iter<I>(&self, text: I) -> Matches<'_, T, L, I::IntoIter>
    where
        I: IntoIterator<Item = u8>,
    {
        Matches {
            scanner: Scanner::new(self),
            text: text.into_iter(),
            pending: None,
        }
    }

    /// 扫描一段完整文本，收集全部命中（按结束位置递增）。
    pub fn find_all(&self, text: &[u8]) -> Vec<Match<'_, L>> {
        let mut out = Vec::new();
        self.scanner().feed(text, |m| out.push(m));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::alphabet::{DnaTable, SparseTable};
    use crate::automaton::Trie;

    fn build(patterns: &[&[u8]]) -> Automaton<SparseTable, ()> {
        let mut t = Trie::new();
        for p in patterns {
            t.insert(p, None).unwrap();
        }
        t.compile()
    }

    fn triples<'a>(ms: &[Match<'a, ()>]) -> Vec<(&'a str, u64, u64)> {
        ms.iter()
            .map(|m| (std::str::from_utf8(m.pattern).unwrap(), m.start, m.end))
            .collect()
    }

    #[test]
    fn concatenate_end_to_end() {
        let ac = build(&[b"cat", b"at", b"t"]);
        let ms = ac.find_all(b"concatenate");
        // c1 o2 n3 c4 a5 t6 e7 n8 a9 t10 e11
        assert_eq!(
            triples(&ms),
            vec![("cat", 4, 6), ("at", 5, 6), ("t", 6, 6), ("at", 9, 10), ("t", 10, 10)]
        );
        let spans: Vec<_> = ms.iter().map(Match::span).collect();
        assert_eq!(spans, vec![3..6, 4..6, 5..6, 8..10, 9..10]);
    }

    #[test]
    fn overlapping_matches_all_reported() {
        let ac = build(&[b"aa", b"aaa"]);
        let ms = ac.find_all(b"aaaa");
        let mut aa: Vec<_> = ms.iter().filter(|m| m.pattern == b"aa").map(|m| (m.start, m.end)).collect();
        let mut aaa: Vec<_> = ms.iter().filter(|m| m.pattern == b"aaa").map(|m| (m.start, m.end)).collect();
        aa.sort_unstable();
        aaa.sort_unstable();
        assert_eq!(aa, vec![(1, 2), (2, 3), (3, 4)]);
        assert_eq!(aaa, vec![(1, 3), (2, 4)]);
        assert_eq!(ms.len(), 5);
    }

    #[test]
    fn suffix_pattern_reported_at_same_end() {
        let ac = build(&[b"gattaca", b"aca", b"ca"]);
        let ms = ac.find_all(b"gattaca");
        assert_eq!(triples(&ms), vec![("gattaca", 1, 7), ("aca", 5, 7), ("ca", 6, 7)]);
    }

    #[test]
    fn each_pattern_found_once_in_itself_regardless_of_order() {
        let pats: [&[u8]; 5] = [b"acgt", b"cgta", b"gtac", b"ta", b"acgtacgt"];
        let mut orders = vec![pats.to_vec()];
        let mut rev = pats.to_vec();
        rev.reverse();
        orders.push(rev);
        orders.push(vec![pats[2], pats[4], pats[0], pats[3], pats[1]]);

        for order in orders {
            let ac = build(&order);
            for p in &pats {
                let ms = ac.find_all(p);
                let own: Vec<_> = ms.iter().filter(|m| m.pattern == *p).collect();
                assert_eq!(own.len(), 1, "pattern {:?}", String::from_utf8_lossy(p));
                assert_eq!((own[0].start, own[0].end), (1, p.len() as u64));
            }
        }
    }

    #[test]
    fn no_match() {
        let ac = build(&[b"gcta"]);
        assert!(ac.find_all(b"aaaa").is_empty());
    }

    #[test]
    fn empty_text_and_empty_automaton() {
        let ac = build(&[b"ac"]);
        assert!(ac.find_all(b"").is_empty());

        let empty = build(&[]);
        assert!(empty.find_all(b"acgtacgt").is_empty());
    }

    #[test]
    fn positions_continue_across_lines() {
        let ac = build(&[b"gtac"]);
        let mut sc = ac.scanner();
        let mut hits = Vec::new();
        // 匹配跨越两行
        let lines: [&[u8]; 3] = [b"aagt", b"accc", b"gtac"];
        for line in lines {
            sc.feed(line, |m| hits.push((m.start, m.end)));
        }
        assert_eq!(hits, vec![(3, 6), (9, 12)]);
        assert_eq!(sc.position(), 12);
    }

    #[test]
    fn reset_starts_new_coordinate_space() {
        let ac = build(&[b"gtac"]);
        let mut sc = ac.scanner();
        let mut hits = Vec::new();
        sc.feed(b"aagt", |m| hits.push((m.start, m.end)));
        sc.reset();
        // reset 后不应拼接上一条记录的尾部
        sc.feed(b"acgtac", |m| hits.push((m.start, m.end)));
        assert_eq!(hits, vec![(3, 6)]);
    }

    #[test]
    fn text_positions_count_bytes_not_chars() {
        let ac = build(&["at".as_bytes(), "ç".as_bytes()]);
        // "ç" 占两个字节
        let ms = ac.find_all("çat".as_bytes());
        assert_eq!(triples(&ms), vec![("ç", 1, 2), ("at", 3, 4)]);
        assert_eq!(ms[1].span(), 2..4);
    }

    #[test]
    fn lazy_iterator_matches_eager_scan() {
        let ac = build(&[b"he", b"she", b"his", b"hers"]);
        let text = b"ushershishe";
        let eager = ac.find_all(text);
        let lazy: Vec<_> = ac.find_iter(text.iter().copied()).collect();
        assert_eq!(eager, lazy);
    }

    #[test]
    fn lazy_iterator_pulls_only_needed_symbols() {
        let ac = build(&[b"ab"]);
        let mut pulled = 0usize;
        let text = b"abxxxxxxxx".iter().copied().inspect(|_| pulled += 1);
        let first = ac.find_iter(text).next().unwrap();
        assert_eq!((first.start, first.end), (1, 2));
        assert_eq!(pulled, 2);
    }

    #[test]
    fn labels_surface_on_match() {
        let mut t: Trie<DnaTable, String> = Trie::new();
        t.insert(b"ggc", Some("r1".into())).unwrap();
        t.insert(b"gc", Some("r2".into())).unwrap();
        let ac = t.compile();
        let labels: Vec<_> = ac
            .find_all(b"aggct")
            .iter()
            .map(|m| m.label.map(String::as_str))
            .collect();
        assert_eq!(labels, vec![Some("r1"), Some("r2")]);
    }

    #[test]
    fn symbols_outside_alphabet_reset_to_root() {
        let mut t: Trie<DnaTable, ()> = Trie::new();
        t.insert(b"acg", None).unwrap();
        let ac = t.compile();
        // 'x' 打断了 "ac" 与 "g"
        assert!(ac.find_all(b"acxg").is_empty());
        assert_eq!(ac.find_all(b"xacg").len(), 1);
    }

    #[test]
    fn concurrent_scans_share_automaton() {
        let ac = build(&[b"ta", b"at"]);
        let texts: [&[u8]; 3] = [b"tatata", b"atat", b"cccc"];
        let counts: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = texts
                .iter()
                .map(|t| {
                    let ac = &ac;
                    s.spawn(move || ac.find_all(t).len())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(counts, vec![5, 3, 0]);
    }
}
