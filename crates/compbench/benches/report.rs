//! Harness-side overhead: document generation, payload sizing, predicate
//! evaluation and report building.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use compbench::{
    generate_documents, payload_size, query_suite, Compressor, Measurement, MeasurementTable,
    Operation, Report,
};

fn bench_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("documents");

    for size in [100, 1000, 10_000] {
        group.bench_with_input(BenchmarkId::new("generate", size), &size, |b, &size| {
            b.iter(|| black_box(generate_documents(size)));
        });

        let docs = generate_documents(size);
        group.bench_with_input(BenchmarkId::new("payload_size", size), &docs, |b, docs| {
            b.iter(|| black_box(payload_size(docs).unwrap()));
        });
    }

    group.finish();
}

fn bench_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicates");
    let docs = generate_documents(10_000);

    for spec in query_suite() {
        group.bench_with_input(BenchmarkId::new("scan", spec.id), &spec, |b, spec| {
            b.iter(|| {
                let hits = docs
                    .iter()
                    .filter(|d| spec.predicate.matches_document(d))
                    .count();
                black_box(hits);
            });
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let sizes = [100, 1000, 2000, 5000, 10000];
    let compressors = Compressor::ALL;

    let mut table = MeasurementTable::new(sizes.len(), compressors.len());
    for s in 0..sizes.len() {
        for c in 0..compressors.len() {
            for op in Operation::all() {
                let m = Measurement {
                    elapsed: Duration::from_micros((s * 100 + c * 10 + op.index()) as u64 + 1),
                    bytes: 1024,
                };
                table.record(s, c, op, m);
            }
        }
    }

    c.bench_function("report/build", |b| {
        b.iter(|| black_box(Report::build(&table, &sizes, &compressors).unwrap()));
    });

    let report = Report::build(&table, &sizes, &compressors).unwrap();
    c.bench_function("report/write_csv", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(16 * 1024);
            report.write_csv(&mut out).unwrap();
            black_box(out);
        });
    });
}

criterion_group!(benches, bench_documents, bench_predicates, bench_report);
criterion_main!(benches);
