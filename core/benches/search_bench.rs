use criterion::{criterion_group, criterion_main, Criterion};
use lexq_core::build::build_index;
use lexq_core::query::{query, QueryOptions};
use lexq_core::{Bm25Params, Document, TextTokenizer};

const WORDS: &[&str] = &[
    "search", "index", "ranking", "document", "query", "weight", "term", "frequency", "corpus", "vector",
    "cosine", "similarity", "token", "segment", "engine", "store", "refund", "shipping", "policy", "hours",
];

fn corpus(n: usize) -> Vec<Document<()>> {
    (0..n)
        .map(|i| {
            let text: Vec<&str> = (0..12).map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()]).collect();
            Document::new(i.to_string(), text.join(" "), "")
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let tok = TextTokenizer::english();
    let docs = corpus(1_000);
    c.bench_function("build_1k_docs", |b| b.iter(|| build_index(&docs, &tok, Bm25Params::default())));
}

fn bench_query(c: &mut Criterion) {
    let tok = TextTokenizer::english();
    let docs = corpus(1_000);
    let index = build_index(&docs, &tok, Bm25Params::default()).expect("build");
    let opts = QueryOptions::default();
    c.bench_function("query_1k_docs", |b| b.iter(|| query(&docs, &index, &tok, "refund shipping policy", &opts)));
}

criterion_group!(benches, bench_build, bench_query);
criterion_main!(benches);
