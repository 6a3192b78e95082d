//! Round resolution and session score keeping.

use crate::types::Symbol;

/// Result of one round. `NoDecision` means no stable human gesture arrived
/// inside the capture window; it is distinct from a tie and never scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HumanWin,
    OpponentWin,
    Tie,
    NoDecision,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HumanWin => "YOU WIN",
            Self::OpponentWin => "CPU WINS",
            Self::Tie => "TIE",
            Self::NoDecision => "NO GESTURE",
        }
    }
}

/// Total over all symbol pairs: the fixed cycle Rock > Scissors > Paper >
/// Rock, equal symbols tie, any Unknown operand yields NoDecision.
pub fn resolve(human: Symbol, opponent: Symbol) -> Outcome {
    use Symbol::*;
    match (human, opponent) {
        (Unknown, _) | (_, Unknown) => Outcome::NoDecision,
        (a, b) if a == b => Outcome::Tie,
        (Rock, Scissors) | (Scissors, Paper) | (Paper, Rock) => Outcome::HumanWin,
        _ => Outcome::OpponentWin,
    }
}

/// Session win/loss/tie counters. Mutated only from the single round path,
/// so no synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTally {
    pub human_wins: u32,
    pub opponent_wins: u32,
    pub ties: u32,
}

impl ScoreTally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::HumanWin => self.human_wins += 1,
            Outcome::OpponentWin => self.opponent_wins += 1,
            Outcome::Tie => self.ties += 1,
            Outcome::NoDecision => {}
        }
    }

    pub fn total_scored(&self) -> u32 {
        self.human_wins + self.opponent_wins + self.ties
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Symbol::*;

    #[test]
    fn cycle_dominance() {
        assert_eq!(resolve(Rock, Scissors), Outcome::HumanWin);
        assert_eq!(resolve(Scissors, Paper), Outcome::HumanWin);
        assert_eq!(resolve(Paper, Rock), Outcome::HumanWin);

        assert_eq!(resolve(Scissors, Rock), Outcome::OpponentWin);
        assert_eq!(resolve(Paper, Scissors), Outcome::OpponentWin);
        assert_eq!(resolve(Rock, Paper), Outcome::OpponentWin);
    }

    #[test]
    fn equal_symbols_tie() {
        for s in [Rock, Paper, Scissors] {
            assert_eq!(resolve(s, s), Outcome::Tie);
        }
    }

    #[test]
    fn unknown_is_never_scored_as_tie_or_loss() {
        for s in [Rock, Paper, Scissors, Unknown] {
            assert_eq!(resolve(Unknown, s), Outcome::NoDecision);
            assert_eq!(resolve(s, Unknown), Outcome::NoDecision);
        }
    }

    #[test]
    fn tally_ignores_no_decision() {
        let mut tally = ScoreTally::default();
        tally.record(Outcome::HumanWin);
        tally.record(Outcome::NoDecision);
        tally.record(Outcome::Tie);
        tally.record(Outcome::OpponentWin);
        tally.record(Outcome::NoDecision);
        assert_eq!(
            tally,
            ScoreTally {
                human_wins: 1,
                opponent_wins: 1,
                ties: 1
            }
        );
        assert_eq!(tally.total_scored(), 3);
        tally.reset();
        assert_eq!(tally, ScoreTally::default());
    }
}
