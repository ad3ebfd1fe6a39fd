use crate::game::Outcome;
use serde::Serialize;

/// Win/loss/push counters for a batch of simulated rounds.
#[derive(Serialize, PartialEq, Eq, Copy, Clone, Default, Debug)]
pub struct RoundStats {
    player_wins: u32,
    dealer_wins: u32,
    pushes: u32,
}

impl RoundStats {
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }

    /// Counters with one win pre-seeded on each side, so a ratio never
    /// divides by zero even for tiny batches or extreme strategies.
    pub fn smoothed() -> Self {
        Self {
            player_wins: 1,
            dealer_wins: 1,
            pushes: 0,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::PlayerWon => self.player_wins += 1,
            Outcome::DealerWon => self.dealer_wins += 1,
            Outcome::Push => self.pushes += 1,
        }
    }

    /// Player wins over dealer wins.
    pub fn ratio(&self) -> f64 {
        f64::from(self.player_wins) / f64::from(self.dealer_wins)
    }

    /// Rounds that produced a winner.
    pub fn decisive(&self) -> u32 {
        self.player_wins + self.dealer_wins
    }

    pub fn player_wins(&self) -> u32 {
        self.player_wins
    }

    pub fn dealer_wins(&self) -> u32 {
        self.dealer_wins
    }

    pub fn pushes(&self) -> u32 {
        self.pushes
    }
}
