//! Property-based invariants for the engine state machines.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use trendvote_core::domain::{Bar, Direction};
use trendvote_core::engine::confluence;
use trendvote_core::engine::{
    ChoppinessFilter, ConfluencePolicy, EngineConfig, FlipDirection, SignalEngine, TriggerWindow,
    WindowEvent, WindowState,
};
use trendvote_core::sources::{ScriptedSource, SourceRegistry, SourceRead, TrendValue};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
}

fn bars(count: usize, step_seconds: i64) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let close = 5000.0 + (i % 7) as f64;
            Bar {
                symbol: "MNQ".into(),
                timestamp: t0() + Duration::seconds(step_seconds * i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 25.0,
            }
        })
        .collect()
}

fn trend_value() -> impl Strategy<Value = TrendValue> {
    prop_oneof![
        any::<bool>().prop_map(TrendValue::Bool),
        (-10.0f64..10.0).prop_map(TrendValue::Signed),
    ]
}

fn source_read() -> impl Strategy<Value = SourceRead> {
    ("[A-Z]{2,4}", any::<bool>(), trend_value(), 0.0f64..5.0).prop_map(
        |(key, enabled, value, min_magnitude)| SourceRead {
            key,
            enabled,
            value,
            min_magnitude,
        },
    )
}

fn engine_for(scripts: &[Vec<bool>], min: usize, cooldown_bars: Option<u32>) -> SignalEngine {
    let mut registry = SourceRegistry::new();
    for (i, script) in scripts.iter().enumerate() {
        let key = if i == 0 { "P".to_string() } else { format!("S{i}") };
        registry.register(Box::new(ScriptedSource::from_bools(&key, script)), true, 0.0);
    }
    let config = EngineConfig {
        primary_chain: vec!["P".into()],
        confluence_policy: ConfluencePolicy::Fixed { min },
        max_bars_after_flip: 3,
        cooldown_bars,
        cooldown_seconds: None,
        max_flips_per_minute: None,
        stability: None,
    };
    SignalEngine::new(config, registry, Vec::new()).unwrap()
}

proptest! {
    #[test]
    fn tally_votes_never_exceed_total(reads in prop::collection::vec(source_read(), 0..12)) {
        let snap = confluence::tally(&reads);
        prop_assert!(snap.bull + snap.bear <= snap.total);
        prop_assert_eq!(snap.total, reads.iter().filter(|r| r.enabled).count());
        prop_assert_eq!(snap.abstained(), snap.total - snap.bull - snap.bear);
    }

    #[test]
    fn window_age_never_exceeds_its_bound(
        flips in prop::collection::vec(
            prop_oneof![
                Just(None),
                Just(Some(FlipDirection::Up)),
                Just(Some(FlipDirection::Down)),
            ],
            1..60,
        ),
        max_bars in 0u32..6,
    ) {
        let mut window = TriggerWindow::new(max_bars);
        let mut was_open = false;
        for flip in flips {
            let event = window.on_bar(flip);
            match window.state() {
                WindowState::Closed => {}
                WindowState::OpenLong { bars_elapsed }
                | WindowState::OpenShort { bars_elapsed } => {
                    prop_assert!(bars_elapsed <= max_bars);
                }
            }
            if let Some(WindowEvent::Expired(_)) = event {
                // Expiry requires a window to have been open.
                prop_assert!(was_open);
                prop_assert_eq!(window.state(), WindowState::Closed);
            }
            was_open = window.direction().is_some();
        }
    }

    #[test]
    fn replays_are_deterministic(
        scripts in prop::collection::vec(
            prop::collection::vec(any::<bool>(), 30),
            2..5,
        ),
    ) {
        let mut a = engine_for(&scripts, 2, None);
        let mut b = engine_for(&scripts, 2, None);
        for bar in bars(30, 60) {
            let ra = a.process_bar(&bar).map(|s| (s.bar_index, s.direction, s.trigger_label));
            let rb = b.process_bar(&bar).map(|s| (s.bar_index, s.direction, s.trigger_label));
            prop_assert_eq!(ra, rb);
        }
        prop_assert_eq!(a.signal_count(), b.signal_count());
    }

    #[test]
    fn bar_cooldown_spaces_signals_apart(
        scripts in prop::collection::vec(
            prop::collection::vec(any::<bool>(), 40),
            2..5,
        ),
        cooldown in 1u32..8,
    ) {
        let mut engine = engine_for(&scripts, 1, Some(cooldown));
        let mut signal_bars: Vec<usize> = Vec::new();
        for bar in bars(40, 60) {
            if let Some(signal) = engine.process_bar(&bar) {
                signal_bars.push(signal.bar_index);
            }
        }
        for pair in signal_bars.windows(2) {
            prop_assert!(pair[1] - pair[0] >= cooldown as usize);
        }
    }

    #[test]
    fn choppiness_log_matches_a_naive_mirror(
        offsets in prop::collection::vec(0i64..200, 1..50),
    ) {
        // Record flips at cumulative offsets, pruning as time advances,
        // and compare against a brute-force trailing-minute count.
        let mut filter = ChoppinessFilter::new(Some(3));
        let mut mirror: Vec<i64> = Vec::new();
        let mut now = 0i64;
        for offset in offsets {
            now += offset;
            filter.record(t0() + Duration::seconds(now));
            mirror.push(now);
            filter.prune(t0() + Duration::seconds(now));
            let expected = mirror.iter().filter(|&&t| t >= now - 60).count();
            prop_assert_eq!(filter.recent_count(), expected);
            prop_assert_eq!(filter.passes(), expected <= 3);
        }
    }

    #[test]
    fn signals_always_meet_the_threshold(
        scripts in prop::collection::vec(
            prop::collection::vec(any::<bool>(), 30),
            3..6,
        ),
        min in 1usize..4,
    ) {
        let mut engine = engine_for(&scripts, min, None);
        for bar in bars(30, 60) {
            if let Some(signal) = engine.process_bar(&bar) {
                prop_assert!(signal.confluence_aligned >= min);
                prop_assert!(signal.confluence_aligned <= signal.confluence_total);
                prop_assert_eq!(signal.confluence_total, scripts.len());
                // The label always credits the primary plus someone else.
                let mut parts = signal.trigger_label.splitn(2, '+');
                prop_assert_eq!(parts.next(), Some("P"));
                let confirmer = parts.next();
                prop_assert!(confirmer.is_some_and(|c| c != "P"));
            }
        }
    }

    #[test]
    fn signals_only_fire_inside_open_windows(
        scripts in prop::collection::vec(
            prop::collection::vec(any::<bool>(), 30),
            2..5,
        ),
    ) {
        // After any emitting bar the window is closed: one signal per window.
        let mut engine = engine_for(&scripts, 1, None);
        for bar in bars(30, 60) {
            if engine.process_bar(&bar).is_some() {
                prop_assert_eq!(engine.window_state(), WindowState::Closed);
            }
        }
    }
}

#[test]
fn direction_long_short_are_mutually_opposite() {
    assert_eq!(Direction::Long.opposite().opposite(), Direction::Long);
}
