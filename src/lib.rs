//! Simulates rounds of dealer-vs-player Blackjack, evaluates pluggable
//! hit-or-stay strategies, and brute-force searches strategy parameter space
//! for settings that maximize the player's win ratio.

pub mod deck;
pub mod game;
pub mod optimizer;
pub mod stats;
pub mod strategy;
