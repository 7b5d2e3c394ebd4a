//! Cache query benchmarks against an in-memory remote source.
//!
//! Run with: `cargo bench --package tscache-bench`

use chrono::{TimeDelta, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tscache_bench::SyntheticSource;
use tscache_lib::{Cache, CacheConfig, Candle, JsonCodec};

/// Query spans in days of 1m candles.
const SPANS: &[(&str, i64)] = &[("1-day", 1), ("7-days", 7), ("30-days", 30)];

fn cache_benchmark(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

    let mut group = c.benchmark_group("query");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for (name, days) in SPANS {
        let end = start + TimeDelta::days(*days);
        group.throughput(Throughput::Elements((*days * 1440) as u64));

        // Every iteration starts from an empty cache directory
        group.bench_function(BenchmarkId::new("miss", name), |b| {
            b.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for _ in 0..iters {
                    let temp_dir = TempDir::new().unwrap();
                    let cache: Cache<Candle, _> =
                        Cache::new(temp_dir.path(), SyntheticSource::new(), 1000).unwrap();
                    let t = Instant::now();
                    let records = cache.query("BTCUSDT", "1m", start, end).unwrap();
                    total += t.elapsed();
                    assert!(!records.is_empty());
                }
                total
            });
        });

        let temp_dir = TempDir::new().unwrap();
        let cache: Cache<Candle, _> =
            Cache::new(temp_dir.path(), SyntheticSource::new(), 1000).unwrap();
        cache.query("BTCUSDT", "1m", start, end).unwrap();

        group.bench_function(BenchmarkId::new("hit", name), |b| {
            b.iter(|| cache.query("BTCUSDT", "1m", start, end).unwrap());
        });

        let json_dir = TempDir::new().unwrap();
        let json_cache: Cache<Candle, _, _> = Cache::with_codec(
            json_dir.path(),
            SyntheticSource::new(),
            CacheConfig::new(1000),
            JsonCodec,
        )
        .unwrap();
        json_cache.query("BTCUSDT", "1m", start, end).unwrap();

        group.bench_function(BenchmarkId::new("hit-json", name), |b| {
            b.iter(|| json_cache.query("BTCUSDT", "1m", start, end).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, cache_benchmark);
criterion_main!(benches);
