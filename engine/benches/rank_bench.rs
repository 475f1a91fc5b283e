use criterion::{criterion_group, criterion_main, Criterion};
use engine::{index::InvertedIndex, rank::rank, vector::TfIdfModel, DEFAULT_TOP_N};

/// Deterministic synthetic corpus: 500 documents drawn from a small
/// shared vocabulary so postings lists stay dense.
fn corpus() -> Vec<Vec<String>> {
    let words = [
        "engine", "index", "term", "vector", "cosine", "corpus", "query", "document", "weight",
        "frequency", "boolean", "ranked", "token", "store", "posting", "search",
    ];
    (0..500u64)
        .map(|doc| {
            let mut state = doc.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (0..120)
                .map(|_| {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                    words[(state >> 33) as usize % words.len()].to_string()
                })
                .collect()
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let docs = corpus();
    let index = InvertedIndex::build(&docs);
    let model = TfIdfModel::build(&docs).unwrap();
    let query: Vec<String> = ["cosine", "ranked", "search"]
        .iter()
        .map(|w| w.to_string())
        .collect();
    c.bench_function("rank_500_docs", |b| {
        b.iter(|| rank(&query, &index, &model, DEFAULT_TOP_N).unwrap())
    });
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
