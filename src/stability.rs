//! Dwell-window debounce over per-frame classifications.
//!
//! A single jittery frame must never commit a round, so a symbol only counts
//! once it has held for `dwell` consecutive frames. The bias is deliberately
//! toward false negatives: a flicker to Unknown (or a dropped hand) restarts
//! the dwell from scratch.

use tracing::debug;

use crate::types::{Classification, Symbol};

pub struct StabilityFilter {
    dwell: u32,
    current: Symbol,
    run: u32,
    emitted: bool,
}

impl StabilityFilter {
    pub fn new(dwell: u32) -> Self {
        Self {
            dwell: dwell.max(1),
            current: Symbol::Unknown,
            run: 0,
            emitted: false,
        }
    }

    /// Feed one classification. Returns `Some(symbol)` exactly once, on the
    /// frame that completes the dwell requirement for a non-Unknown symbol.
    pub fn push(&mut self, class: &Classification) -> Option<Symbol> {
        if class.symbol == self.current {
            self.run = self.run.saturating_add(1);
        } else {
            self.current = class.symbol;
            self.run = 1;
            self.emitted = false;
        }

        if self.current != Symbol::Unknown && self.run >= self.dwell && !self.emitted {
            self.emitted = true;
            debug!(symbol = self.current.as_str(), frames = self.run, "stable gesture");
            return Some(self.current);
        }
        None
    }

    /// Consecutive frames the current symbol has held.
    pub fn current_run(&self) -> u32 {
        self.run
    }

    /// Fraction of the dwell requirement satisfied, for HUD feedback.
    pub fn progress(&self) -> f32 {
        if self.current == Symbol::Unknown {
            return 0.0;
        }
        (self.run as f32 / self.dwell as f32).min(1.0)
    }

    /// Drop all accumulated evidence. Called at phase boundaries so dwell
    /// from before the capture window cannot leak into it.
    pub fn reset(&mut self) {
        self.current = Symbol::Unknown;
        self.run = 0;
        self.emitted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn frame(symbol: Symbol) -> Classification {
        Classification {
            symbol,
            extended_fingers: 0,
            hand_present: symbol != Symbol::Unknown,
            at: Instant::now(),
        }
    }

    #[test]
    fn emits_once_after_dwell() {
        let mut f = StabilityFilter::new(3);
        assert_eq!(f.push(&frame(Symbol::Rock)), None);
        assert_eq!(f.push(&frame(Symbol::Rock)), None);
        assert_eq!(f.push(&frame(Symbol::Rock)), Some(Symbol::Rock));
        // Holding the pose does not re-emit.
        assert_eq!(f.push(&frame(Symbol::Rock)), None);
        assert_eq!(f.push(&frame(Symbol::Rock)), None);
    }

    #[test]
    fn unknown_mid_window_resets_dwell() {
        let mut f = StabilityFilter::new(3);
        f.push(&frame(Symbol::Scissors));
        f.push(&frame(Symbol::Scissors));
        assert_eq!(f.push(&frame(Symbol::Unknown)), None);
        // Two more scissors frames are not enough; the dwell restarted.
        assert_eq!(f.push(&frame(Symbol::Scissors)), None);
        assert_eq!(f.push(&frame(Symbol::Scissors)), None);
        assert_eq!(f.push(&frame(Symbol::Scissors)), Some(Symbol::Scissors));
    }

    #[test]
    fn symbol_change_restarts_dwell() {
        let mut f = StabilityFilter::new(2);
        f.push(&frame(Symbol::Rock));
        assert_eq!(f.push(&frame(Symbol::Paper)), None);
        assert_eq!(f.push(&frame(Symbol::Paper)), Some(Symbol::Paper));
    }

    #[test]
    fn unknown_never_becomes_stable() {
        let mut f = StabilityFilter::new(2);
        for _ in 0..10 {
            assert_eq!(f.push(&frame(Symbol::Unknown)), None);
        }
        assert_eq!(f.progress(), 0.0);
    }

    #[test]
    fn reset_allows_reemission() {
        let mut f = StabilityFilter::new(2);
        f.push(&frame(Symbol::Rock));
        assert_eq!(f.push(&frame(Symbol::Rock)), Some(Symbol::Rock));
        f.reset();
        f.push(&frame(Symbol::Rock));
        assert_eq!(f.push(&frame(Symbol::Rock)), Some(Symbol::Rock));
    }
}
