use criterion::{black_box, criterion_group, criterion_main, Criterion};

use acmap::automaton::{DnaAutomaton, DnaTable, Trie};

fn make_reference(len: usize) -> Vec<u8> {
    let bases = [b'a', b'c', b'g', b't'];
    let mut seq = Vec::with_capacity(len);
    let mut x: u32 = 42;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    seq
}

/// 从参考序列上等距截取 `n` 条长度为 `len` 的 read
fn sample_reads(reference: &[u8], n: usize, len: usize) -> Vec<Vec<u8>> {
    let step = (reference.len() - len) / n;
    (0..n).map(|i| reference[i * step..i * step + len].to_vec()).collect()
}

fn build_trie(reads: &[Vec<u8>]) -> Trie<DnaTable, String> {
    let mut trie = Trie::new();
    for (i, r) in reads.iter().enumerate() {
        let _ = trie.insert(r, Some(format!("read{}", i)));
    }
    trie
}

fn build_automaton(reads: &[Vec<u8>]) -> DnaAutomaton {
    build_trie(reads).compile()
}

fn bench_insert(c: &mut Criterion) {
    let reference = make_reference(100_000);
    let reads = sample_reads(&reference, 1_000, 100);

    c.bench_function("insert_1k_reads_100bp", |b| {
        b.iter(|| black_box(build_trie(black_box(&reads))));
    });
}

fn bench_compile(c: &mut Criterion) {
    let reference = make_reference(100_000);
    let reads = sample_reads(&reference, 1_000, 100);
    let trie = build_trie(&reads);

    c.bench_function("compile_1k_reads_100bp", |b| {
        b.iter(|| black_box(trie.clone().compile()));
    });
}

fn bench_scan(c: &mut Criterion) {
    let reference = make_reference(1_000_000);
    let reads = sample_reads(&reference, 1_000, 100);
    let ac = build_automaton(&reads);

    c.bench_function("scan_1mb_1k_reads", |b| {
        b.iter(|| {
            let mut n = 0usize;
            ac.scanner().feed(black_box(&reference), |_| n += 1);
            black_box(n)
        });
    });

    c.bench_function("find_iter_1mb_1k_reads", |b| {
        b.iter(|| black_box(ac.find_iter(reference.iter().copied()).count()));
    });
}

criterion_group!(benches, bench_insert, bench_compile, bench_scan);
criterion_main!(benches);
