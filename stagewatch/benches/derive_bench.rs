//! Benchmarks for stage derivation over growing logs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stagewatch::derive::{LogSummary, StageStatusDeriver};
use stagewatch::protocol::MessageNormalizer;
use stagewatch::testing::fixtures;

fn derive_benchmark(c: &mut Criterion) {
    let deriver = StageStatusDeriver::default();
    let run = fixtures::full_document_run();
    let mut group = c.benchmark_group("derive");

    for runs in [1usize, 10, 100] {
        let labels: Vec<&str> = run.iter().copied().cycle().take(run.len() * runs).collect();
        let events = fixtures::events_from_labels(&labels);

        group.bench_with_input(BenchmarkId::new("progress", events.len()), &events, |b, events| {
            b.iter(|| deriver.derive(black_box(events), true));
        });
        group.bench_with_input(BenchmarkId::new("summary", events.len()), &events, |b, events| {
            b.iter(|| LogSummary::from_events(black_box(events), 3));
        });
    }
    group.finish();
}

fn normalize_benchmark(c: &mut Criterion) {
    let normalizer = MessageNormalizer::new();
    let frame = fixtures::step_frame_with_details(
        "OCR Tamamlandı",
        serde_json::json!({"pages": 3, "confidence": 0.94}),
    );
    c.bench_function("normalize_step", |b| {
        b.iter(|| normalizer.normalize(black_box(&frame)));
    });
}

criterion_group!(benches, derive_benchmark, normalize_benchmark);
criterion_main!(benches);
