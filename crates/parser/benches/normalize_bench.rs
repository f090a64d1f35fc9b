//! Benchmarks for snippet normalization
//!
//! Run with: cargo bench -p parser --bench normalize_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use parser::PythonNormalizer;
use std::hint::black_box;

fn generate_snippets(count: usize) -> Vec<String> {
  (0..count)
    .map(|i| {
      format!(
        "def handler_{i}(event, context=None):\n  # process the event\n  items=[x*2 for x in event['items'] if x>{i}]\n  if not items: return None\n  return {{'count':len(items), 'first':items[0]}}\n"
      )
    })
    .collect()
}

fn bench_normalize(c: &mut Criterion) {
  let mut group = c.benchmark_group("normalize");

  for count in [1, 10, 100] {
    let snippets = generate_snippets(count);
    group.throughput(Throughput::Elements(count as u64));

    // One parser reused across snippets (pipeline behavior)
    group.bench_with_input(BenchmarkId::new("reused_parser", count), &snippets, |b, snippets| {
      let mut normalizer = PythonNormalizer::new().unwrap();
      b.iter(|| {
        for snippet in snippets {
          black_box(normalizer.normalize(snippet).unwrap());
        }
      });
    });

    group.bench_with_input(BenchmarkId::new("fresh_parser", count), &snippets, |b, snippets| {
      b.iter(|| {
        for snippet in snippets {
          black_box(parser::normalize(snippet).unwrap());
        }
      });
    });
  }

  group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
