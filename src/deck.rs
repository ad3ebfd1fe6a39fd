use rand::prelude::*;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

pub const ALL_SUITS: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];
pub const ALL_RANKS: [Rank; 13] = [
    Rank::R2,
    Rank::R3,
    Rank::R4,
    Rank::R5,
    Rank::R6,
    Rank::R7,
    Rank::R8,
    Rank::R9,
    Rank::R10,
    Rank::RJ,
    Rank::RQ,
    Rank::RK,
    Rank::RA,
];
const DECK_LEN: usize = ALL_RANKS.len() * ALL_SUITS.len();

#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Club => write!(f, "C"),
            Self::Diamond => write!(f, "D"),
            Self::Heart => write!(f, "H"),
            Self::Spade => write!(f, "S"),
        }
    }
}

#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub enum Rank {
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    RJ,
    RQ,
    RK,
    RA,
}

impl Rank {
    /// Score of a card of this rank: face value for 2-10, 10 for courts, and
    /// always 11 for an ace. Aces are never re-valued as 1 anywhere.
    pub fn score(self) -> u32 {
        match self {
            Rank::R2 => 2,
            Rank::R3 => 3,
            Rank::R4 => 4,
            Rank::R5 => 5,
            Rank::R6 => 6,
            Rank::R7 => 7,
            Rank::R8 => 8,
            Rank::R9 => 9,
            Rank::R10 | Rank::RJ | Rank::RQ | Rank::RK => 10,
            Rank::RA => 11,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::R2 => write!(f, "2"),
            Self::R3 => write!(f, "3"),
            Self::R4 => write!(f, "4"),
            Self::R5 => write!(f, "5"),
            Self::R6 => write!(f, "6"),
            Self::R7 => write!(f, "7"),
            Self::R8 => write!(f, "8"),
            Self::R9 => write!(f, "9"),
            Self::R10 => write!(f, "10"),
            Self::RJ => write!(f, "J"),
            Self::RQ => write!(f, "Q"),
            Self::RK => write!(f, "K"),
            Self::RA => write!(f, "A"),
        }
    }
}

/// A playing card. Identity is suit + rank; the only number it exposes is its
/// score.
#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub struct Card {
    suit: Suit,
    rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    pub fn score(self) -> u32 {
        self.rank.score()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

#[derive(Debug, PartialEq)]
pub enum CardParseError {
    BadLength(String),
    BadSuit(String),
    BadRank(String),
}

impl Error for CardParseError {}

impl fmt::Display for CardParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLength(s) => write!(f, "invalid length: {} ({})", s.chars().count(), s),
            Self::BadSuit(s) => write!(f, "invalid card suit: {}", s),
            Self::BadRank(s) => write!(f, "invalid card rank: {}", s),
        }
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Parse a 2 or 3 character card token like "H7" or "s10": one suit
    /// letter (C, D, H, S) followed by a rank (2-10, J, Q, K, A).
    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if !(2..=3).contains(&len) {
            return Err(CardParseError::BadLength(s.to_string()));
        }
        let mut chars = s.chars();
        let suit = match chars.next().unwrap().to_ascii_uppercase() {
            'C' => Suit::Club,
            'D' => Suit::Diamond,
            'H' => Suit::Heart,
            'S' => Suit::Spade,
            other => return Err(CardParseError::BadSuit(other.to_string())),
        };
        let rank_token: String = chars.collect::<String>().to_ascii_uppercase();
        let rank = match rank_token.as_str() {
            "2" => Rank::R2,
            "3" => Rank::R3,
            "4" => Rank::R4,
            "5" => Rank::R5,
            "6" => Rank::R6,
            "7" => Rank::R7,
            "8" => Rank::R8,
            "9" => Rank::R9,
            "10" => Rank::R10,
            "J" => Rank::RJ,
            "Q" => Rank::RQ,
            "K" => Rank::RK,
            "A" => Rank::RA,
            _ => return Err(CardParseError::BadRank(rank_token)),
        };
        Ok(Card::new(suit, rank))
    }
}

#[derive(Debug, PartialEq)]
pub enum DeckError {
    OutOfCards,
}

impl Error for DeckError {}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::OutOfCards => write!(f, "deck is empty even after renewing it"),
        }
    }
}

/// Errors while loading a pile of cards from a deck file.
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Parse(CardParseError),
}

impl Error for LoadError {}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {}", e),
            Self::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<CardParseError> for LoadError {
    fn from(e: CardParseError) -> Self {
        Self::Parse(e)
    }
}

fn fresh_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_LEN);
    for &suit in ALL_SUITS.iter() {
        for &rank in ALL_RANKS.iter() {
            cards.push(Card::new(suit, rank));
        }
    }
    cards
}

/// An ordered, renewable, shuffleable sequence of cards. Serves both as the
/// deck that rounds draw from and as each participant's hand.
///
/// The cards present right after construction (or after the last load) are
/// remembered so the pile can be renewed once it runs dry.
#[derive(Default, Clone, Debug)]
pub struct Pile {
    cards: VecDeque<Card>,
    initial: Vec<Card>,
    shuffled: bool,
}

impl Pile {
    /// An empty pile. Renewing it produces 52 fresh cards.
    pub fn new() -> Self {
        Self::default()
    }

    /// A full deck of 52 unique cards in suit-major order.
    pub fn standard() -> Self {
        let cards = fresh_deck();
        Self {
            initial: cards.clone(),
            cards: cards.into_iter().collect(),
            shuffled: false,
        }
    }

    /// Load a pile from a deck file: each line is a comma separated list of
    /// card tokens, and the lines concatenate in order. The front of the file
    /// is the top of the pile.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut pile = Self::new();
        for line in BufReader::new(reader).lines() {
            pile.add_line(&line?)?;
        }
        Ok(pile)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        Self::from_reader(File::open(path)?)
    }

    /// Append a comma separated list of card tokens (whitespace around each
    /// token is ignored, blank lines are skipped). The remembered initial
    /// sequence follows the new contents.
    pub fn add_line(&mut self, line: &str) -> Result<(), CardParseError> {
        if line.trim().is_empty() {
            return Ok(());
        }
        for token in line.split(',') {
            self.cards.push_back(token.trim().parse()?);
        }
        self.initial = self.cards.iter().copied().collect();
        Ok(())
    }

    /// Pop a card from the top of the pile. Does not renew.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    /// Draw the top card of `source` into this pile. An empty source is
    /// renewed once; if it is still empty after that, the round cannot
    /// continue.
    pub fn take_from<R: Rng + ?Sized>(
        &mut self,
        source: &mut Pile,
        rng: &mut R,
    ) -> Result<Card, DeckError> {
        let card = match source.draw() {
            Some(c) => c,
            None => {
                source.renew(rng);
                source.draw().ok_or(DeckError::OutOfCards)?
            }
        };
        self.cards.push_back(card);
        Ok(card)
    }

    /// Shuffle the pile in place. A pile that has been shuffled once stays
    /// marked as shuffled, so renewing it shuffles the fresh cards too.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
        self.shuffled = true;
    }

    /// Reset the pile to its remembered initial cards, or to 52 fresh cards
    /// if it never had any.
    pub fn renew<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards = if self.initial.is_empty() {
            fresh_deck().into_iter().collect()
        } else {
            self.initial.iter().copied().collect()
        };
        if self.shuffled {
            self.shuffle(rng);
        }
    }

    /// Drop all cards. The remembered initial sequence is kept.
    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Sum of the card scores.
    pub fn score(&self) -> u32 {
        self.cards.iter().map(|c| c.score()).sum()
    }

    pub fn blackjack(&self) -> bool {
        self.score() == 21
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }
}

impl FromStr for Pile {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pile = Self::new();
        pile.add_line(s)?;
        Ok(pile)
    }
}

impl fmt::Display for Pile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.cards
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::io::Cursor;

    #[test]
    fn parse_format_round_trip() {
        for &suit in ALL_SUITS.iter() {
            for &rank in ALL_RANKS.iter() {
                let card = Card::new(suit, rank);
                assert_eq!(card.to_string().parse::<Card>().unwrap(), card);
                // lowercase tokens parse too
                let lower = card.to_string().to_ascii_lowercase();
                assert_eq!(lower.parse::<Card>().unwrap(), card);
            }
        }
    }

    #[test]
    fn parse_bad_length() {
        for s in ["", "H", "HJQK", "S101"].iter() {
            match s.parse::<Card>() {
                Err(CardParseError::BadLength(tok)) => assert_eq!(tok.as_str(), *s),
                other => panic!("expected BadLength for {:?}, got {:?}", s, other),
            }
        }
    }

    #[test]
    fn parse_bad_suit() {
        for s in ["T7", "X2", "1A"].iter() {
            match s.parse::<Card>() {
                Err(CardParseError::BadSuit(_)) => {}
                other => panic!("expected BadSuit for {:?}, got {:?}", s, other),
            }
        }
    }

    #[test]
    fn parse_bad_rank() {
        for s in ["H1", "H11", "SX", "C20"].iter() {
            match s.parse::<Card>() {
                Err(CardParseError::BadRank(_)) => {}
                other => panic!("expected BadRank for {:?}, got {:?}", s, other),
            }
        }
    }

    #[test]
    fn scores() {
        assert_eq!("C2".parse::<Card>().unwrap().score(), 2);
        assert_eq!("H9".parse::<Card>().unwrap().score(), 9);
        assert_eq!("S10".parse::<Card>().unwrap().score(), 10);
        assert_eq!("DJ".parse::<Card>().unwrap().score(), 10);
        assert_eq!("dq".parse::<Card>().unwrap().score(), 10);
        assert_eq!("HK".parse::<Card>().unwrap().score(), 10);
        assert_eq!("SA".parse::<Card>().unwrap().score(), 11);
    }

    #[test]
    fn standard_has_52_unique_cards() {
        let pile = Pile::standard();
        assert_eq!(pile.len(), DECK_LEN);
        let unique: HashSet<Card> = pile.cards.iter().copied().collect();
        assert_eq!(unique.len(), DECK_LEN);
    }

    #[test]
    fn draw_removes_from_front() {
        let mut pile: Pile = "H7, S10, CA".parse().unwrap();
        assert_eq!(pile.draw().unwrap().to_string(), "H7");
        assert_eq!(pile.draw().unwrap().to_string(), "S10");
        assert_eq!(pile.draw().unwrap().to_string(), "CA");
        assert_eq!(pile.draw(), None);
    }

    #[test]
    fn score_and_blackjack() {
        let pile: Pile = "CA, CK".parse().unwrap();
        assert_eq!(pile.score(), 21);
        assert!(pile.blackjack());
        let pile: Pile = "C2, C3".parse().unwrap();
        assert_eq!(pile.score(), 5);
        assert!(!pile.blackjack());
        assert_eq!(Pile::new().score(), 0);
    }

    #[test]
    fn renew_restores_initial_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pile: Pile = "H7, S10, CA".parse().unwrap();
        pile.draw();
        pile.draw();
        pile.renew(&mut rng);
        assert_eq!(pile.to_string(), "H7, S10, CA");
    }

    #[test]
    fn renew_of_empty_initial_gives_52() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pile = Pile::new();
        assert!(pile.is_empty());
        pile.renew(&mut rng);
        assert_eq!(pile.len(), DECK_LEN);
    }

    #[test]
    fn renew_preserves_shuffled_state() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pile = Pile::standard();
        pile.shuffle(&mut rng);
        assert!(pile.is_shuffled());
        while pile.draw().is_some() {}
        pile.renew(&mut rng);
        assert!(pile.is_shuffled());
        assert_eq!(pile.len(), DECK_LEN);
        let unique: HashSet<Card> = pile.cards.iter().copied().collect();
        assert_eq!(unique.len(), DECK_LEN);
    }

    #[test]
    fn take_from_renews_exhausted_source() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut source: Pile = "H7, S10".parse().unwrap();
        let mut hand = Pile::new();
        hand.take_from(&mut source, &mut rng).unwrap();
        hand.take_from(&mut source, &mut rng).unwrap();
        assert!(source.is_empty());
        // source renews back to H7, S10 and hands out H7 again
        let card = hand.take_from(&mut source, &mut rng).unwrap();
        assert_eq!(card.to_string(), "H7");
        assert_eq!(hand.score(), 7 + 10 + 7);
    }

    #[test]
    fn clear_keeps_initial_for_renewal() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pile: Pile = "H7, S10".parse().unwrap();
        pile.clear();
        assert!(pile.is_empty());
        pile.renew(&mut rng);
        assert_eq!(pile.to_string(), "H7, S10");
    }

    #[test]
    fn from_reader_concatenates_lines_in_order() {
        let pile = Pile::from_reader(Cursor::new("H7, S10\nCA\n\nD2\n")).unwrap();
        assert_eq!(pile.to_string(), "H7, S10, CA, D2");
    }

    #[test]
    fn from_reader_propagates_parse_errors() {
        match Pile::from_reader(Cursor::new("H7\nXX\n")) {
            Err(LoadError::Parse(CardParseError::BadSuit(_))) => {}
            other => panic!("expected BadSuit, got {:?}", other.map(|p| p.to_string())),
        }
    }

    #[test]
    fn pile_from_str_tolerates_whitespace() {
        let pile: Pile = " h7 ,  s10,CA ".parse().unwrap();
        assert_eq!(pile.to_string(), "H7, S10, CA");
    }
}
