use crate::deck::{Card, DeckError, Pile};
use crate::strategy::Strategy;
use rand::Rng;
use std::fmt;

/// How a single round ended.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Outcome {
    PlayerWon,
    DealerWon,
    /// A score tie. Nobody won or lost.
    Push,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerWon => write!(f, "player"),
            Self::DealerWon => write!(f, "dealer"),
            Self::Push => write!(f, "push"),
        }
    }
}

/// A hand together with the strategy that decides when to stop drawing.
pub struct Player {
    hand: Pile,
    strategy: Box<dyn Strategy>,
}

impl Player {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self {
            hand: Pile::new(),
            strategy,
        }
    }

    pub fn should_hit(&self, upcard: Card) -> bool {
        self.strategy.should_hit(&self.hand, upcard)
    }
}

/// One table: a deck, the dealer's hand, and the player. The deck is owned
/// exclusively and mutated in place; whoever constructs the game decides
/// whether to shuffle the deck first.
pub struct Game {
    deck: Pile,
    dealer: Pile,
    player: Player,
    verbose: bool,
}

impl Game {
    pub fn new(deck: Pile, strategy: Box<dyn Strategy>, verbose: bool) -> Self {
        Self {
            deck,
            dealer: Pile::new(),
            player: Player::new(strategy),
            verbose,
        }
    }

    fn vmsg(&self, msg: &str) {
        if self.verbose {
            println!("{}", msg);
        }
    }

    fn vscore(&self, msg: &str) {
        if self.verbose {
            println!(
                "Player: {} points, Dealer: {} points. {}",
                self.player.hand.score(),
                self.dealer.score(),
                msg
            );
        }
    }

    /// Simulate one round of Blackjack.
    ///
    /// Deal order is player, dealer, player, dealer; the dealer's first card
    /// is the upcard the strategy sees for the rest of the round. Every draw
    /// renews the deck once if it runs out mid-round. The dealer draws
    /// mechanically until it meets or exceeds the player's score; this is the
    /// house rule here, there is no dealer-stands-on-17.
    pub fn one_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Outcome, DeckError> {
        if self.deck.len() < 4 {
            self.deck.renew(rng);
        }

        self.vmsg("Starting a round of Blackjack");
        if self.verbose {
            println!(
                "Deck: {} (shuffled: {})",
                self.deck,
                self.deck.is_shuffled()
            );
        }

        if self.deck.len() < 4 {
            return Err(DeckError::OutOfCards);
        }

        self.player.hand.take_from(&mut self.deck, rng)?;
        let upcard = self.dealer.take_from(&mut self.deck, rng)?;
        self.player.hand.take_from(&mut self.deck, rng)?;
        self.dealer.take_from(&mut self.deck, rng)?;

        if self.verbose {
            println!("Player cards: {}", self.player.hand);
            println!("Dealer cards: {}", self.dealer);
            println!("Initial draw is complete.");
        }

        if self.player.hand.blackjack() {
            self.vmsg("Player has blackjack. Regardless of what the dealer may have, the player won.");
            return Ok(Outcome::PlayerWon);
        }

        if self.player.hand.score() == 22 && self.dealer.score() == 22 {
            self.vmsg("Both have two aces. The dealer won.");
            return Ok(Outcome::DealerWon);
        }

        if self.verbose {
            println!("Player uses the {} strategy.", self.player.strategy);
        }

        // player's turn to draw cards
        while self.player.hand.score() < 17 {
            if !self.player.should_hit(upcard) {
                break;
            }
            self.player.hand.take_from(&mut self.deck, rng)?;
            if self.verbose {
                println!("Player cards: {}", self.player.hand);
            }
            if self.player.hand.score() > 21 {
                self.vscore("The dealer won because the player scored higher than 21.");
                return Ok(Outcome::DealerWon);
            }
        }

        // dealer's turn: draw until the player's score is met or beaten
        while self.dealer.score() < self.player.hand.score() {
            self.dealer.take_from(&mut self.deck, rng)?;
            if self.verbose {
                println!("Dealer cards: {}", self.dealer);
            }
            if self.dealer.score() > 21 {
                self.vscore("The player won because the dealer scored higher than 21.");
                return Ok(Outcome::PlayerWon);
            }
        }

        let ps = self.player.hand.score();
        let ds = self.dealer.score();
        Ok(if ps > ds {
            self.vscore("The player won on points.");
            Outcome::PlayerWon
        } else if ps < ds {
            self.vscore("The dealer won on points.");
            Outcome::DealerWon
        } else {
            self.vscore("It's a push.");
            Outcome::Push
        })
    }

    /// Keep the deck as it is, but clear both hands for the next round.
    pub fn prepare_new_round(&mut self) {
        self.dealer.clear();
        self.player.hand.clear();
    }

    /// Winner plus the cards everyone is holding.
    pub fn summary(&self, outcome: Outcome) -> String {
        format!(
            "{}\nplayer: {}\ndealer: {}",
            outcome, self.player.hand, self.dealer
        )
    }

    pub fn dealer_score(&self) -> u32 {
        self.dealer.score()
    }

    pub fn player_score(&self) -> u32 {
        self.player.hand.score()
    }
}
