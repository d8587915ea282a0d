//! The per-bar event loop.
//!
//! Single-threaded and synchronous: the host feeds completed bars in order
//! and each bar runs one fixed pipeline — advance sources, detect flips,
//! tally confluence, drive the trigger window, scan for a confirmation, run
//! the gate chain, emit. Processing a bar is infallible; the only fatal
//! error class is a bad configuration at construction.

use tracing::debug;

use crate::domain::{Bar, SignalRecord};
use crate::engine::config::{ConfigError, EngineConfig};
use crate::engine::confluence::{self, ConfluenceSnapshot};
use crate::engine::emitter::SignalEmitter;
use crate::engine::flip::FlipDetector;
use crate::engine::gates::{ChoppinessFilter, CooldownGate, GateReason, StabilityGate};
use crate::engine::window::{self, TriggerWindow, WindowEvent, WindowState};
use crate::sinks::SignalSink;
use crate::sources::{resolve_primary, SourceRegistry};

pub struct SignalEngine {
    config: EngineConfig,
    registry: SourceRegistry,
    primary_key: String,
    flips: FlipDetector,
    window: TriggerWindow,
    stability: StabilityGate,
    choppiness: ChoppinessFilter,
    cooldown: CooldownGate,
    emitter: SignalEmitter,
    bar_index: usize,
    signal_count: usize,
    last_snapshot: ConfluenceSnapshot,
    warned_empty_tally: bool,
}

impl SignalEngine {
    /// Build an engine over an already-populated registry. Fails fast on
    /// misconfiguration; afterwards nothing can error per bar.
    pub fn new(
        config: EngineConfig,
        registry: SourceRegistry,
        sinks: Vec<Box<dyn SignalSink>>,
    ) -> Result<Self, ConfigError> {
        let cooldown_mode = config.validate()?;
        let primary_key = resolve_primary(&registry, &config.primary_chain)
            .ok_or_else(|| ConfigError::PrimaryUnresolved(config.primary_chain.clone()))?;
        if let Some(stability) = &config.stability {
            for key in [&stability.trigger_a, &stability.trigger_b] {
                if !registry.contains(key) {
                    return Err(ConfigError::UnknownStabilityTrigger(key.clone()));
                }
            }
        }
        Ok(Self {
            window: TriggerWindow::new(config.max_bars_after_flip),
            stability: StabilityGate::new(config.stability.clone()),
            choppiness: ChoppinessFilter::new(config.max_flips_per_minute),
            cooldown: CooldownGate::new(cooldown_mode),
            emitter: SignalEmitter::new(sinks),
            flips: FlipDetector::new(),
            config,
            registry,
            primary_key,
            bar_index: 0,
            signal_count: 0,
            last_snapshot: ConfluenceSnapshot::default(),
            warned_empty_tally: false,
        })
    }

    /// Process one completed bar. Returns the signal emitted on this bar,
    /// if any.
    pub fn process_bar(&mut self, bar: &Bar) -> Option<SignalRecord> {
        self.cooldown.on_bar();

        let reads = self.registry.advance(bar);
        let flips = self.flips.detect(&reads, self.bar_index, bar.timestamp);
        self.stability.record_flips(&flips);
        for flip in &flips {
            self.choppiness.record(flip.timestamp);
        }
        self.choppiness.prune(bar.timestamp);

        let snapshot = confluence::tally(&reads);
        if snapshot.total == 0 && !self.warned_empty_tally {
            debug!(bar = self.bar_index, "no enabled sources; nothing can fire");
            self.warned_empty_tally = true;
        }

        let primary_flip = flips
            .iter()
            .find(|f| f.key == self.primary_key)
            .map(|f| f.direction);
        match self.window.on_bar(primary_flip) {
            Some(WindowEvent::Opened(direction)) => {
                self.emitter.notify_window_opened(direction, bar.timestamp);
            }
            Some(WindowEvent::Expired(direction)) => {
                debug!(%direction, bar = self.bar_index, "window expired unconfirmed");
                self.emitter.notify_window_expired(direction, bar.timestamp);
            }
            None => {}
        }

        let mut emitted = None;
        if let Some(direction) = self.window.direction() {
            if let Some(confirming_key) =
                window::find_confirmation(direction, &self.primary_key, &reads, &flips)
            {
                let aligned = snapshot.aligned(direction);
                let required = self.config.confluence_policy.effective_minimum(snapshot.total);
                let veto = if aligned < required {
                    Some(GateReason::Confluence)
                } else if !self.stability.passes(&confirming_key, bar.timestamp) {
                    Some(GateReason::Stability)
                } else if !self.choppiness.passes() {
                    Some(GateReason::Choppiness)
                } else if !self.cooldown.passes(bar.timestamp) {
                    Some(GateReason::Cooldown)
                } else {
                    None
                };
                match veto {
                    Some(reason) => {
                        debug!(
                            %direction,
                            %reason,
                            confirming = %confirming_key,
                            aligned,
                            required,
                            bar = self.bar_index,
                            "confirmation vetoed"
                        );
                        self.emitter
                            .notify_gated(direction, reason, &snapshot, bar.timestamp);
                    }
                    None => {
                        let record = self.emitter.emit(
                            direction,
                            &self.primary_key,
                            &confirming_key,
                            snapshot,
                            bar.timestamp,
                            self.bar_index,
                        );
                        self.cooldown.record_signal(bar.timestamp);
                        self.window.close();
                        self.signal_count += 1;
                        emitted = Some(record);
                    }
                }
            }
        }

        self.last_snapshot = snapshot;
        self.bar_index += 1;
        emitted
    }

    /// Resolved primary trigger key.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn window_state(&self) -> WindowState {
        self.window.state()
    }

    pub fn signal_count(&self) -> usize {
        self.signal_count
    }

    /// Confluence tally of the most recently processed bar.
    pub fn last_snapshot(&self) -> ConfluenceSnapshot {
        self.last_snapshot
    }

    pub fn bars_processed(&self) -> usize {
        self.bar_index
    }

    /// Toggle a source between bars. Returns false for unknown keys.
    pub fn set_source_enabled(&mut self, key: &str, enabled: bool) -> bool {
        self.registry.set_enabled(key, enabled)
    }
}
