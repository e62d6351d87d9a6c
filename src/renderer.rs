use crate::celebration::Confetti;
use crate::entry::Entry;
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoundStatus {
    pub current: u32,
    pub max: u32,
}

impl RoundStatus {
    pub fn is_complete(&self) -> bool {
        self.current > self.max
    }
}

impl Display for RoundStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_complete() {
            f.write_str("All Rounds Complete!")
        } else {
            write!(f, "Round {} of {}", self.current, self.max)
        }
    }
}

/// Presentation side of the lottery. The controller is its only caller.
pub trait Renderer {
    fn show_entry(&mut self, entry: &Entry);
    fn show_winner(&mut self, entry: &Entry);
    fn show_round_status(&mut self, status: RoundStatus);
    fn play_celebration(&mut self);
    /// The set of falling particles changed.
    fn show_confetti(&mut self, confetti: &[Confetti]);
    /// The celebration's background effect ran its course.
    fn finish_celebration(&mut self);
    fn cancel_celebration(&mut self);
    /// `winners[i]` won round `i + 1`.
    fn show_final_results(&mut self, winners: &[Entry]);
    fn reset(&mut self);
}

/// `Round 1: name` lines for the final announcement.
pub fn results_lines(winners: &[Entry]) -> Vec<String> {
    winners
        .iter()
        .enumerate()
        .map(|(i, e)| format!("Round {}: {}", i + 1, e.name()))
        .collect()
}
