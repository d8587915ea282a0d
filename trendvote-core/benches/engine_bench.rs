use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use trendvote_core::domain::Bar;
use trendvote_core::engine::{ConfluencePolicy, EngineConfig, SignalEngine};
use trendvote_core::sources::{AtrBandSource, EmaTrendSource, SourceRegistry};

fn synthetic_bars(count: usize) -> Vec<Bar> {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
    let mut close = 5000.0;
    (0..count)
        .map(|i| {
            // Deterministic drifting series with a slow cycle.
            close += ((i as f64) * 0.7).sin() * 2.0 + 0.05;
            Bar {
                symbol: "MNQ".into(),
                timestamp: t0 + Duration::seconds(60 * i as i64),
                open: close - 0.5,
                high: close + 2.0,
                low: close - 2.0,
                close,
                volume: 100.0,
            }
        })
        .collect()
}

fn build_engine() -> SignalEngine {
    let mut registry = SourceRegistry::new();
    registry.register(Box::new(EmaTrendSource::new("AIQ1", 9)), true, 0.0);
    registry.register(Box::new(EmaTrendSource::new("RR", 21)), true, 0.0);
    registry.register(Box::new(EmaTrendSource::new("DT", 55)), true, 0.0);
    registry.register(Box::new(AtrBandSource::new("SW", 14, 2.0)), true, 3.0);
    let config = EngineConfig {
        primary_chain: vec!["AIQ1".into()],
        confluence_policy: ConfluencePolicy::Fixed { min: 3 },
        ..EngineConfig::default()
    };
    match SignalEngine::new(config, registry, Vec::new()) {
        Ok(engine) => engine,
        Err(err) => panic!("bench engine config invalid: {err}"),
    }
}

fn bench_process_bar(c: &mut Criterion) {
    let bars = synthetic_bars(10_000);
    c.bench_function("process_10k_bars", |b| {
        b.iter(|| {
            let mut engine = build_engine();
            for bar in &bars {
                black_box(engine.process_bar(bar));
            }
            engine.signal_count()
        })
    });
}

criterion_group!(benches, bench_process_bar);
criterion_main!(benches);
