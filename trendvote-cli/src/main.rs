//! trendvote CLI — replay bar files through the signal engine.
//!
//! Commands:
//! - `run` — replay a CSV bar file against a TOML engine config
//! - `demo` — run a seeded synthetic random walk through a stock setup

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trendvote_core::domain::Bar;
use trendvote_core::engine::{EngineConfig, SignalEngine};
use trendvote_core::fingerprint;
use trendvote_core::sinks::{CsvSink, SignalSink, TracingSink};
use trendvote_core::sources::{build_registry, SourceConfig};

#[derive(Parser)]
#[command(name = "trendvote", about = "trendvote — bar replay for the confluence signal engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV bar file against a TOML engine config.
    Run {
        /// Path to a TOML config file ([engine] + [[sources]]).
        #[arg(long)]
        config: PathBuf,

        /// CSV bar file: timestamp,open,high,low,close,volume.
        #[arg(long)]
        bars: PathBuf,

        /// Write emitted signals to this CSV file.
        #[arg(long)]
        signals_out: Option<PathBuf>,

        /// Write per-bar engine state (tally + window) to this CSV file.
        #[arg(long)]
        state_out: Option<PathBuf>,
    },
    /// Run a seeded synthetic random walk through a stock setup.
    Demo {
        /// Number of one-minute bars to synthesize.
        #[arg(long, default_value_t = 2000)]
        bars: usize,

        /// RNG seed; same seed, same bars, same signals.
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

/// Full replay configuration: engine parameters plus the ordered source
/// list. Fingerprinted as a unit.
#[derive(Debug, Serialize, Deserialize)]
struct ReplayConfig {
    engine: EngineConfig,
    sources: Vec<SourceConfig>,
}

impl ReplayConfig {
    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
struct BarRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
    #[serde(default)]
    symbol: Option<String>,
}

fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening bar file {}", path.display()))?;
    let mut bars = Vec::new();
    for (i, row) in reader.deserialize::<BarRow>().enumerate() {
        let row = row.with_context(|| format!("bar file row {}", i + 1))?;
        bars.push(Bar {
            symbol: row.symbol.unwrap_or_default(),
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    Ok(bars)
}

fn build_engine(config: &ReplayConfig, signals_out: Option<&Path>) -> Result<SignalEngine> {
    let registry = build_registry(&config.sources)?;
    let mut sinks: Vec<Box<dyn SignalSink>> = vec![Box::new(TracingSink::new())];
    if let Some(path) = signals_out {
        let sink = CsvSink::create(path)
            .with_context(|| format!("creating signal log {}", path.display()))?;
        sinks.push(Box::new(sink));
    }
    Ok(SignalEngine::new(config.engine.clone(), registry, sinks)?)
}

/// Per-bar engine-state dump row, mirroring the tally and window the host
/// panel would display.
#[derive(Debug, Serialize)]
struct StateRow {
    timestamp: String,
    close: f64,
    bull: usize,
    bear: usize,
    total: usize,
    window: &'static str,
}

fn window_label(state: trendvote_core::engine::WindowState) -> &'static str {
    use trendvote_core::engine::WindowState;
    match state {
        WindowState::Closed => "closed",
        WindowState::OpenLong { .. } => "open_long",
        WindowState::OpenShort { .. } => "open_short",
    }
}

fn replay(
    mut engine: SignalEngine,
    bars: &[Bar],
    mut state_writer: Option<csv::Writer<std::fs::File>>,
) -> Result<usize> {
    for bar in bars {
        engine.process_bar(bar);
        if let Some(writer) = state_writer.as_mut() {
            let snapshot = engine.last_snapshot();
            writer.serialize(StateRow {
                timestamp: bar.timestamp.to_rfc3339(),
                close: bar.close,
                bull: snapshot.bull,
                bear: snapshot.bear,
                total: snapshot.total,
                window: window_label(engine.window_state()),
            })?;
        }
    }
    if let Some(writer) = state_writer.as_mut() {
        writer.flush()?;
    }
    Ok(engine.signal_count())
}

fn echo_config(config: &ReplayConfig) {
    info!(
        run_id = %fingerprint::run_id(config),
        primary_chain = ?config.engine.primary_chain,
        policy = ?config.engine.confluence_policy,
        max_bars_after_flip = config.engine.max_bars_after_flip,
        cooldown_bars = ?config.engine.cooldown_bars,
        cooldown_seconds = ?config.engine.cooldown_seconds,
        max_flips_per_minute = ?config.engine.max_flips_per_minute,
        sources = config.sources.len(),
        "engine configuration"
    );
}

fn run_replay(
    config_path: &Path,
    bars_path: &Path,
    signals_out: Option<&Path>,
    state_out: Option<&Path>,
) -> Result<()> {
    let config = ReplayConfig::from_file(config_path)?;
    echo_config(&config);
    let bars = load_bars(bars_path)?;
    let engine = build_engine(&config, signals_out)?;
    let state_writer = state_out
        .map(|path| {
            csv::Writer::from_path(path)
                .with_context(|| format!("creating state log {}", path.display()))
        })
        .transpose()?;
    info!(primary = engine.primary_key(), bars = bars.len(), "replay starting");
    let signals = replay(engine, &bars, state_writer)?;
    println!("{} bars processed, {} signals", bars.len(), signals);
    Ok(())
}

fn synthetic_bars(count: usize, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
    let mut close = 5000.0;
    (0..count)
        .map(|i| {
            let drift: f64 = rng.gen_range(-3.0..3.0);
            let open = close;
            close = (close + drift).max(1.0);
            let high = open.max(close) + rng.gen_range(0.0..1.5);
            let low = open.min(close) - rng.gen_range(0.0..1.5);
            Bar {
                symbol: "DEMO".into(),
                timestamp: t0 + Duration::seconds(60 * i as i64),
                open,
                high,
                low,
                close,
                volume: rng.gen_range(10.0..500.0),
            }
        })
        .collect()
}

fn demo_config() -> ReplayConfig {
    let source = |key: &str, source_type: &str, params: &[(&str, f64)]| SourceConfig {
        key: key.into(),
        source_type: source_type.into(),
        params: params.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        enabled: true,
        min_magnitude: 0.0,
    };
    let mut atr = source("SW", "atr_band", &[("period", 14.0), ("multiplier", 2.0)]);
    atr.min_magnitude = 3.0;
    ReplayConfig {
        engine: EngineConfig {
            primary_chain: vec!["AIQ1".into()],
            confluence_policy: trendvote_core::engine::ConfluencePolicy::Fixed { min: 3 },
            ..EngineConfig::default()
        },
        sources: vec![
            source("AIQ1", "ema_trend", &[("period", 9.0)]),
            source("RR", "ema_trend", &[("period", 21.0)]),
            source("DT", "ema_trend", &[("period", 55.0)]),
            atr,
        ],
    }
}

fn run_demo(bar_count: usize, seed: u64) -> Result<()> {
    let config = demo_config();
    echo_config(&config);
    info!(seed, "synthetic demo stream");
    let bars = synthetic_bars(bar_count, seed);
    let engine = build_engine(&config, None)?;
    let signals = replay(engine, &bars, None)?;
    println!("{} bars processed, {} signals", bars.len(), signals);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            bars,
            signals_out,
            state_out,
        } => run_replay(&config, &bars, signals_out.as_deref(), state_out.as_deref()),
        Commands::Demo { bars, seed } => run_demo(bars, seed),
    }
}
