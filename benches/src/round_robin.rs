use std::time::Duration;

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rrmux::prelude::*;
use tokio::runtime::Runtime;

/// In-memory sources, each holding `records` lines
fn generate_sources(sources: usize, records: usize) -> Vec<Vec<u8>> {
    (0..sources)
        .map(|i| {
            (0..records)
                .map(|r| format!("source #{i} record #{r}\n"))
                .collect::<String>()
                .into_bytes()
        })
        .collect()
}

fn into_readers(data: Vec<Vec<u8>>) -> Vec<BoxedReader> {
    data.into_iter()
        .map(|bytes| Box::new(std::io::Cursor::new(bytes)) as BoxedReader)
        .collect()
}

/// Merge throughput as the number of sources grows
fn bench_source_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_robin_sources");
    let runtime = Runtime::new().unwrap();

    for sources in [2, 16, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(sources), &sources, |b, &sources| {
            b.to_async(&runtime).iter_batched(
                || generate_sources(sources, 4_000 / sources),
                |data| async move {
                    let mut mux =
                        RoundRobinScheduler::new(into_readers(data), MuxConfig::default()).unwrap();
                    let mut output = Vec::new();
                    black_box(copy_records(&mut mux, &mut output).await.unwrap());
                    black_box(output);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Small read chunks cost one background attempt each
fn bench_chunk_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_robin_chunk_size");
    let runtime = Runtime::new().unwrap();

    for chunk_size in [16, 256, 4096] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.to_async(&runtime).iter_batched(
                    || generate_sources(8, 500),
                    |data| async move {
                        let config = MuxConfig::default()
                            .with_timeout(Duration::from_secs(1))
                            .with_read_chunk_size(chunk_size);
                        let mux = RoundRobinScheduler::new(into_readers(data), config).unwrap();
                        let mut records = Box::pin(mux.into_records());
                        let mut count = 0usize;
                        while let Some(record) = futures::StreamExt::next(&mut records).await {
                            black_box(record.unwrap());
                            count += 1;
                        }
                        black_box(count);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_source_counts, bench_chunk_sizes);
criterion_main!(benches);
