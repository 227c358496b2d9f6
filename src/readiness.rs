//! Stylesheet readiness gate.
//!
//! Layer paint in class mode comes from a stylesheet that loads independently
//! of the layer data. Until it is active, overlays render with fallback paint.
//! The gate polls a probe until the stylesheet is confirmed active (or a time
//! budget runs out) and then bumps the generation exactly once so overlays
//! are rebuilt with their real paint.
//!
//! ```text
//! Unchecked --begin--> Polling --probe ok / budget spent--> Ready
//!                        ^   |
//!                        +---+ probe failed, retry after interval
//! ```
//!
//! The gate is driven from the UI frame loop: [`ReadinessGate::tick`] returns
//! how long until the next check so the caller can schedule a repaint. Once
//! `Ready` nothing further is scheduled.

use std::time::Duration;
use web_time::Instant;

/// Why the gate opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyReason {
    /// The probe saw the expected style
    Confirmed,
    /// The time budget ran out first (fail open)
    TimedOut,
}

/// Current gate state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadinessPhase {
    Unchecked,
    Polling {
        started: Instant,
        next_check: Instant,
        attempts: u32,
    },
    Ready(ReadyReason),
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStep {
    /// Not polling (unchecked or already ready)
    Idle,
    /// Still polling; check again after this long
    Waiting(Duration),
    /// The gate opened on this tick
    Transitioned(ReadyReason),
}

/// One-shot readiness gate with a generation counter.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    poll_interval: Duration,
    budget: Duration,
    phase: ReadinessPhase,
    generation: u64,
}

impl ReadinessGate {
    pub fn new(poll_interval: Duration, budget: Duration) -> Self {
        Self {
            poll_interval,
            budget,
            phase: ReadinessPhase::Unchecked,
            generation: 0,
        }
    }

    pub fn phase(&self) -> ReadinessPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, ReadinessPhase::Ready(_))
    }

    /// Only ever increases, by exactly one, when the gate opens.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts polling. Has no effect unless the gate is still unchecked.
    ///
    /// The first probe is due immediately.
    pub fn begin(&mut self, now: Instant) -> bool {
        if self.phase != ReadinessPhase::Unchecked {
            return false;
        }
        log::debug!("Waiting for layer stylesheet");
        self.phase = ReadinessPhase::Polling {
            started: now,
            next_check: now,
            attempts: 0,
        };
        true
    }

    /// Runs the probe if a check is due.
    pub fn tick(&mut self, now: Instant, probe: impl FnOnce() -> bool) -> GateStep {
        let ReadinessPhase::Polling {
            started,
            next_check,
            attempts,
        } = self.phase
        else {
            return GateStep::Idle;
        };

        if now < next_check {
            return GateStep::Waiting(next_check - now);
        }

        let attempts = attempts + 1;
        if probe() {
            return self.open(ReadyReason::Confirmed, attempts);
        }

        if now.duration_since(started) >= self.budget {
            return self.open(ReadyReason::TimedOut, attempts);
        }

        self.phase = ReadinessPhase::Polling {
            started,
            next_check: now + self.poll_interval,
            attempts,
        };
        GateStep::Waiting(self.poll_interval)
    }

    fn open(&mut self, reason: ReadyReason, attempts: u32) -> GateStep {
        self.phase = ReadinessPhase::Ready(reason);
        self.generation += 1;
        match reason {
            ReadyReason::Confirmed => {
                log::info!("Layer stylesheet active after {} probe(s)", attempts)
            }
            ReadyReason::TimedOut => log::warn!(
                "Layer stylesheet not detected after {} probe(s), showing layers anyway",
                attempts
            ),
        }
        GateStep::Transitioned(reason)
    }
}
