use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;

use ot_store::record::Sample;

fn make_samples(n: usize, duplicate_every: usize) -> Vec<Sample> {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        if duplicate_every > 0 && i % duplicate_every == 0 && !out.is_empty() {
            let j = rng.gen_range(0..out.len());
            out.push(out[j]);
            continue;
        }
        out.push(Sample {
            black: rng.gen(),
            white: rng.gen(),
            mv: rng.gen_range(0..27),
        });
    }
    out
}

fn bench_dedup(c: &mut Criterion) {
    let samples = make_samples(100_000, 4);

    c.bench_function("ot_store_dedup_insert_100k", |b| {
        b.iter(|| {
            let mut seen: FxHashSet<Sample> = FxHashSet::default();
            for s in &samples {
                seen.insert(*black_box(s));
            }
            black_box(seen.len())
        })
    });
}

criterion_group!(benches, bench_dedup);
criterion_main!(benches);
