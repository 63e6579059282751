//! Performance benchmarks for stockyard
//!
//! Covers the per-request hot paths: metric recording, summary aggregation,
//! cache reads and writes, and quota consumption.

use chrono::{Duration as ChronoDuration, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use stockyard::config::{CacheConfig, RateLimitConfig};
use stockyard::monitoring::types::{RequestMetric, ResourceUsage, SummaryPeriod};
use stockyard::monitoring::{MetricsRecorder, StaticProbe, SummaryAggregator};
use stockyard::services::rate_limit::MemoryQuotaBackend;
use stockyard::services::{KeyValueCache, QuotaClass, QuotaLimiter};
use stockyard::storage::InMemoryStore;
use tokio::runtime::Runtime;

fn metrics(count: usize) -> Vec<RequestMetric> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let finished_at = now - ChronoDuration::seconds((i % 86_400) as i64);
            RequestMetric {
                id: i.to_string(),
                started_at: finished_at - ChronoDuration::milliseconds(40),
                finished_at,
                response_time_ms: (i % 500) as f64,
                endpoint: format!("/parts/{}", i % 25),
                method: "GET".to_string(),
                status_code: if i % 20 == 0 { 500 } else { 200 },
                user_id: None,
                resources: ResourceUsage::default(),
                db_query_time_ms: 0.0,
                db_query_count: 0,
            }
        })
        .collect()
}

/// Benchmark metric recording into bounded logs
fn bench_metric_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("metric_recording");

    for capacity in [1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("record_completed", capacity),
            capacity,
            |b, &capacity| {
                let recorder = MetricsRecorder::new(capacity, Arc::new(StaticProbe::default()), None);
                b.iter(|| {
                    black_box(recorder.record_completed(
                        "bench",
                        "/parts",
                        "GET",
                        200,
                        Duration::from_millis(12),
                        None,
                    ))
                });
            },
        );
    }

    group.finish();
}

/// Benchmark window aggregation
fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");

    for count in [1_000, 10_000].iter() {
        let data = metrics(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("summarize_24h", count), &data, |b, data| {
            b.iter(|| {
                black_box(SummaryAggregator::summarize(
                    SummaryPeriod::OneDay,
                    data,
                    &[],
                    Utc::now(),
                ))
            });
        });
    }

    group.finish();
}

/// Benchmark cache operations over the in-memory store
fn bench_cache_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cache_operations");
    let cache = KeyValueCache::new(Arc::new(InMemoryStore::new()), &CacheConfig::default());
    let payload = serde_json::json!({ "id": 7, "make": "Volvo", "year": 1998 });

    rt.block_on(async { cache.set("vehicle:7", &payload, None).await });

    group.bench_function("cache_get_hit", |b| {
        b.iter(|| rt.block_on(async { black_box(cache.get::<serde_json::Value>("vehicle:7").await) }));
    });

    group.bench_function("cache_set", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            rt.block_on(async { black_box(cache.set(&format!("vehicle:{}", i), &payload, None).await) })
        });
    });

    group.finish();
}

/// Benchmark quota consumption, sequential and concurrent
fn bench_quota(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("quota");
    let limiter = QuotaLimiter::with_backend(
        &RateLimitConfig::default(),
        Arc::new(MemoryQuotaBackend::new()),
    );

    group.bench_function("consume_local", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let key = format!("ip:10.0.{}.{}", i % 256, i / 256 % 256);
            rt.block_on(async { black_box(limiter.consume(QuotaClass::General, &key).await.unwrap()) })
        });
    });

    for num_tasks in [10, 100].iter() {
        group.bench_with_input(
            BenchmarkId::new("concurrent_consume", num_tasks),
            num_tasks,
            |b, &num_tasks| {
                b.iter(|| {
                    let limiter = limiter.clone();
                    rt.block_on(async move {
                        let mut handles = Vec::new();
                        for i in 0..num_tasks {
                            let limiter = limiter.clone();
                            handles.push(tokio::spawn(async move {
                                limiter
                                    .consume(QuotaClass::Api, &format!("apikey:{}", i % 8))
                                    .await
                                    .unwrap()
                            }));
                        }
                        for handle in handles {
                            black_box(handle.await.unwrap());
                        }
                    })
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_metric_recording,
    bench_summary,
    bench_cache_operations,
    bench_quota
);

criterion_main!(benches);
