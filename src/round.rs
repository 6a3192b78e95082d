//! Round orchestration: IDLE -> COUNTDOWN -> CAPTURE -> RESOLVED -> COOLDOWN.
//!
//! Every transition is gated on an `Instant` passed in by the caller; the
//! machine never sleeps and never reads the clock itself, so tests drive it
//! with a scripted timeline and a scripted classification sequence.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use crate::opponent::OpponentChooser;
use crate::outcome::{resolve, Outcome, ScoreTally};
use crate::stability::StabilityFilter;
use crate::types::{Classification, Symbol};

/// Per-phase durations, sourced from `AppConfig` (tuning constants, not
/// algorithmic ones).
#[derive(Debug, Clone, Copy)]
pub struct RoundTiming {
    pub countdown: Duration,
    pub capture_window: Duration,
    pub resolved_display: Duration,
    pub cooldown: Duration,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            countdown: Duration::from_secs(3),
            capture_window: Duration::from_millis(2500),
            resolved_display: Duration::from_secs(2),
            cooldown: Duration::from_millis(800),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown {
        deadline: Instant,
    },
    Capture {
        deadline: Instant,
    },
    Resolved {
        human: Symbol,
        opponent: Option<Symbol>,
        outcome: Outcome,
        until: Instant,
    },
    Cooldown {
        until: Instant,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Countdown { .. } => "COUNTDOWN",
            Self::Capture { .. } => "CAPTURE",
            Self::Resolved { .. } => "RESOLVED",
            Self::Cooldown { .. } => "COOLDOWN",
        }
    }
}

/// Observable transitions, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    RoundStarted,
    CountdownAborted,
    CaptureOpened,
    Resolved {
        human: Symbol,
        opponent: Option<Symbol>,
        outcome: Outcome,
    },
    RoundReset,
}

/// Read-only view for the renderer: phase plus whatever timing/symbol data
/// that phase carries, and the current tally.
#[derive(Debug, Clone, Copy)]
pub struct RoundSnapshot {
    pub phase: Phase,
    /// Remaining time in the current timed phase, zero when untimed/expired.
    pub remaining: Duration,
    pub tally: ScoreTally,
}

pub struct RoundMachine<R: Rng> {
    phase: Phase,
    timing: RoundTiming,
    stability: StabilityFilter,
    chooser: OpponentChooser<R>,
    tally: ScoreTally,
}

impl<R: Rng> RoundMachine<R> {
    pub fn new(timing: RoundTiming, dwell_frames: u32, chooser: OpponentChooser<R>) -> Self {
        Self {
            phase: Phase::Idle,
            timing,
            stability: StabilityFilter::new(dwell_frames),
            chooser,
            tally: ScoreTally::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tally(&self) -> ScoreTally {
        self.tally
    }

    /// Dwell progress of the stability filter, for HUD feedback while
    /// capturing.
    pub fn capture_progress(&self) -> f32 {
        self.stability.progress()
    }

    /// Advance the machine with one classified frame at time `now`.
    pub fn step(&mut self, now: Instant, class: &Classification) -> Option<RoundEvent> {
        let stable = self.stability.push(class);

        match self.phase {
            Phase::Idle => {
                if class.hand_present {
                    self.phase = Phase::Countdown {
                        deadline: now + self.timing.countdown,
                    };
                    info!("hand detected, countdown started");
                    return Some(RoundEvent::RoundStarted);
                }
                None
            }

            Phase::Countdown { deadline } => {
                if !class.hand_present {
                    // No penalty; the player just pulled their hand away.
                    self.phase = Phase::Idle;
                    debug!("hand lost during countdown");
                    return Some(RoundEvent::CountdownAborted);
                }
                if now >= deadline {
                    // Dwell accumulated during the countdown must not count
                    // toward the capture; the throw happens now.
                    self.stability.reset();
                    self.phase = Phase::Capture {
                        deadline: now + self.timing.capture_window,
                    };
                    info!("capture window open");
                    return Some(RoundEvent::CaptureOpened);
                }
                None
            }

            Phase::Capture { deadline } => {
                if let Some(human) = stable {
                    let opponent = self.chooser.draw();
                    let outcome = resolve(human, opponent);
                    self.tally.record(outcome);
                    self.phase = Phase::Resolved {
                        human,
                        opponent: Some(opponent),
                        outcome,
                        until: now + self.timing.resolved_display,
                    };
                    info!(
                        human = human.as_str(),
                        opponent = opponent.as_str(),
                        outcome = outcome.as_str(),
                        "round resolved"
                    );
                    return Some(RoundEvent::Resolved {
                        human,
                        opponent: Some(opponent),
                        outcome,
                    });
                }
                if now >= deadline {
                    self.phase = Phase::Resolved {
                        human: Symbol::Unknown,
                        opponent: None,
                        outcome: Outcome::NoDecision,
                        until: now + self.timing.resolved_display,
                    };
                    info!("capture window elapsed with no stable gesture");
                    return Some(RoundEvent::Resolved {
                        human: Symbol::Unknown,
                        opponent: None,
                        outcome: Outcome::NoDecision,
                    });
                }
                None
            }

            Phase::Resolved { until, .. } => {
                if now >= until {
                    self.phase = Phase::Cooldown {
                        until: now + self.timing.cooldown,
                    };
                }
                None
            }

            Phase::Cooldown { until } => {
                if now >= until {
                    // Residual hand position from the last round must not
                    // immediately restart; the stability state goes with it.
                    self.stability.reset();
                    self.phase = Phase::Idle;
                }
                None
            }
        }
    }

    /// Force the machine back to Idle from any phase. Idempotent; the tally
    /// is never touched.
    pub fn abort(&mut self) -> Option<RoundEvent> {
        self.stability.reset();
        if self.phase == Phase::Idle {
            return None;
        }
        self.phase = Phase::Idle;
        info!("round aborted");
        Some(RoundEvent::RoundReset)
    }

    /// Zero the session tally. Idempotent, accepted in any phase.
    pub fn reset_scores(&mut self) {
        self.tally.reset();
        info!("score reset");
    }

    pub fn snapshot(&self, now: Instant) -> RoundSnapshot {
        let remaining = match self.phase {
            Phase::Countdown { deadline } | Phase::Capture { deadline } => {
                deadline.saturating_duration_since(now)
            }
            Phase::Resolved { until, .. } | Phase::Cooldown { until } => {
                until.saturating_duration_since(now)
            }
            Phase::Idle => Duration::ZERO,
        };
        RoundSnapshot {
            phase: self.phase,
            remaining,
            tally: self.tally,
        }
    }
}
