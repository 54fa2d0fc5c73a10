//! Microbenchmark for the parallel [`ScoredMatchSelector`] driver, isolated
//! from final sorting/selection.

use criterion::{Criterion, criterion_group, criterion_main};

use fuzzy_complete::{CandidateBatch, ContentType, Matcher, Pattern, Precision, ScoredMatchSelector};

fn synthetic_batch(n: usize) -> CandidateBatch {
    let mut batch = CandidateBatch::new(n * 16);
    for i in 0..n {
        let name = format!("loadDataFromCache{i}");
        batch.append(name.as_bytes(), ContentType::CodeCompletionSymbol);
    }
    batch
}

fn bench_selector(c: &mut Criterion) {
    // opt-in via `RUST_LOG=debug cargo bench`; silent otherwise.
    let _ = env_logger::try_init();

    let batches = vec![synthetic_batch(20_000)];
    let matcher = Matcher::default();
    let pattern = Pattern::new("ldfc");
    let selector = ScoredMatchSelector::new(&batches);

    c.bench_function("scored_matches_fast", |b| {
        b.iter(|| selector.scored_matches(&matcher, &pattern, Precision::Fast).len());
    });

    c.bench_function("scored_matches_thorough", |b| {
        b.iter(|| {
            selector
                .scored_matches(&matcher, &pattern, Precision::Thorough)
                .len()
        });
    });
}

criterion_group!(benches, bench_selector);
criterion_main!(benches);
