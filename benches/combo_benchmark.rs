//! Combination engine benchmarks.
//!
//! # Benchmarks
//!
//! - `combo_enumeration`: raw cross product of two view bags with the length filter
//! - `combo_extraction`: full triple-screened extraction per pair
//! - `statistics_pass`: collecting all pair fields over a synthetic corpus
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench combo_benchmark
//! ```

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use gramstat_core::{
    ComboConfig, ComboNgramExtractor, Document, DocumentPair, NgramOptions, NgramSettings,
    PairNgramConfig, StatisticsCollector, VocabularyStore, collect_pairs, combinations, generate,
};

const WORDS: &[&str] = &[
    "market", "share", "price", "rose", "fell", "bank", "rate", "growth", "quarter", "profit",
    "loss", "sales", "demand", "supply", "oil", "gold", "index", "bond", "yield", "dollar",
];

fn synthetic_document(rng: &mut fastrand::Rng, sentences: usize) -> Document {
    let sentences: Vec<Vec<&str>> = (0..sentences)
        .map(|_| {
            let len = rng.usize(6..16);
            (0..len).map(|_| WORDS[rng.usize(..WORDS.len())]).collect()
        })
        .collect();
    Document::from_sentences(sentences)
}

fn corpus(size: usize) -> Vec<DocumentPair> {
    let mut rng = fastrand::Rng::with_seed(42);
    (0..size)
        .map(|_| {
            DocumentPair::new(
                synthetic_document(&mut rng, 3),
                synthetic_document(&mut rng, 3),
            )
        })
        .collect()
}

fn config() -> PairNgramConfig {
    let mut config = PairNgramConfig::default();
    for settings in [
        &mut config.view1.settings,
        &mut config.view2.settings,
        &mut config.pooled.settings,
    ] {
        settings.ngram = NgramSettings::builder().range(1, 2).build();
        settings.top_k = 200;
    }
    let mut combo = ComboConfig::default();
    combo.settings.symmetric = true;
    config.with_combo(combo)
}

fn sealed_store(config: &PairNgramConfig, pairs: &[DocumentPair]) -> VocabularyStore {
    let mut collector = StatisticsCollector::new(VocabularyStore::new()).unwrap();
    config.register_fields(&mut collector).unwrap();
    collect_pairs(&mut collector, pairs).unwrap();
    collector.finalize()
}

fn bench_enumeration(c: &mut Criterion) {
    let pairs = corpus(1);
    let options = NgramOptions::new(1, 2).unwrap();
    let left = generate(&pairs[0].view1, &options).unwrap();
    let right = generate(&pairs[0].view2, &options).unwrap();

    c.bench_function("combo_enumeration", |b| {
        b.iter(|| {
            let total: u64 = combinations(black_box(&left), black_box(&right), 2, 4, true)
                .map(|candidate| candidate.product())
                .sum();
            black_box(total)
        });
    });
}

fn bench_extraction(c: &mut Criterion) {
    let config = config();
    let pairs = corpus(500);
    let extractor =
        ComboNgramExtractor::new(&config, Arc::new(sealed_store(&config, &pairs))).unwrap();
    // warm the lazily selected vocabularies
    extractor.vocabulary().unwrap();

    c.bench_function("combo_extraction", |b| {
        let mut index = 0;
        b.iter(|| {
            let features = extractor.extract(black_box(&pairs[index % pairs.len()])).unwrap();
            index += 1;
            black_box(features.len())
        });
    });
}

fn bench_statistics_pass(c: &mut Criterion) {
    let config = config();
    let pairs = corpus(200);

    c.bench_function("statistics_pass", |b| {
        b.iter(|| black_box(sealed_store(&config, &pairs).term_count("ngram_combo")));
    });
}

criterion_group!(
    benches,
    bench_enumeration,
    bench_extraction,
    bench_statistics_pass
);
criterion_main!(benches);
