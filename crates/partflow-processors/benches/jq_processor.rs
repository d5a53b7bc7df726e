//! Throughput of JqProcessor over batches of small JSON documents.
//!
//! Run with:
//! ```bash
//! cargo bench --bench jq_processor
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use partflow_core::{Batch, ExecutionContext, Processor};
use partflow_processors::{JqConfig, JqProcessor};

/// (name, query)
const QUERIES: &[(&str, &str)] = &[
    ("identity", "."),
    ("field", ".user.name"),
    ("construct", "{id, tags: [.tags[] | ascii_upcase]}"),
    ("reduce", "reduce .scores[] as $s (0; . + $s)"),
];

fn payload(i: usize) -> String {
    format!(
        r#"{{"id":{i},"user":{{"name":"user{i}","age":{age}}},"tags":["a","b","c"],"scores":[1,2,3,4,5]}}"#,
        i = i,
        age = 20 + i % 50
    )
}

fn bench_queries(c: &mut Criterion) {
    let ctx = ExecutionContext::new("bench");
    let mut group = c.benchmark_group("jq_processor");

    for &size in &[1usize, 64] {
        let payloads: Vec<String> = (0..size).map(payload).collect();
        group.throughput(Throughput::Elements(size as u64));

        for &(name, query) in QUERIES {
            let processor = match JqProcessor::new(JqConfig::new(query)) {
                Ok(p) => p,
                Err(e) => panic!("{}: {}", query, e),
            };
            group.bench_with_input(BenchmarkId::new(name, size), &payloads, |b, payloads| {
                b.iter(|| {
                    let batch = Batch::from_payloads(payloads.iter().cloned()).unwrap();
                    black_box(processor.process(batch, &ctx))
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
