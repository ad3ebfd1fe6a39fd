use crate::deck::{Card, Pile};
use rand::{Rng, RngCore};
use std::fmt;

/// A hit-or-stay decision policy with an enumerable parameter space.
///
/// `should_hit` must be a pure function of the hand score and the dealer
/// upcard score so it can be called any number of times without drift. The
/// parameter vector (possibly empty) is walked with `next_parameter`, either
/// one odometer step at a time or by uniform random assignment.
pub trait Strategy: fmt::Display {
    /// Draw another card, or stop?
    fn should_hit(&self, hand: &Pile, upcard: Card) -> bool;

    /// Set all parameters to their lowest values.
    fn reset_parameters(&mut self);

    /// Advance to the next parameter setting. In odometer mode (`random` is
    /// false) the last parameter increments fastest, wrapping and carrying
    /// into the next; the return value is false exactly once, when the carry
    /// runs off the most significant parameter. In random mode each
    /// parameter is assigned a uniform value within its range.
    fn next_parameter(&mut self, random: bool, rng: &mut dyn RngCore) -> bool;

    /// Exact number of distinct settings that enumeration visits, counting
    /// the one `reset_parameters` lands on. 1 for parameterless strategies.
    fn possibilities(&self) -> u32;

    /// Value-independent snapshot including the current parameter values.
    fn clone_box(&self) -> Box<dyn Strategy>;
}

/// Draws a card at every opportunity.
#[derive(Clone, Copy, Default, Debug)]
pub struct AlwaysHit;

impl Strategy for AlwaysHit {
    fn should_hit(&self, _hand: &Pile, _upcard: Card) -> bool {
        true
    }

    fn reset_parameters(&mut self) {}

    fn next_parameter(&mut self, _random: bool, _rng: &mut dyn RngCore) -> bool {
        false
    }

    fn possibilities(&self) -> u32 {
        1
    }

    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(*self)
    }
}

impl fmt::Display for AlwaysHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Always Hit")
    }
}

/// Never draws a card.
#[derive(Clone, Copy, Default, Debug)]
pub struct AlwaysStay;

impl Strategy for AlwaysStay {
    fn should_hit(&self, _hand: &Pile, _upcard: Card) -> bool {
        false
    }

    fn reset_parameters(&mut self) {}

    fn next_parameter(&mut self, _random: bool, _rng: &mut dyn RngCore) -> bool {
        false
    }

    fn possibilities(&self) -> u32 {
        1
    }

    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(*self)
    }
}

impl fmt::Display for AlwaysStay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Always Stay")
    }
}

/// Hand-tuned thresholds keyed on the dealer upcard, based on the "How to
/// play Blackjack" description at bicyclecards.com.
#[derive(Clone, Copy, Default, Debug)]
pub struct Basic;

impl Strategy for Basic {
    fn should_hit(&self, hand: &Pile, upcard: Card) -> bool {
        let ds = upcard.score();
        if ds >= 7 {
            return hand.score() <= 17;
        }
        if 3 < ds && ds < 7 {
            return hand.score() < 12;
        }
        hand.score() < 13
    }

    fn reset_parameters(&mut self) {}

    fn next_parameter(&mut self, _random: bool, _rng: &mut dyn RngCore) -> bool {
        false
    }

    fn possibilities(&self) -> u32 {
        1
    }

    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(*self)
    }
}

impl fmt::Display for Basic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Basic")
    }
}

/// Another fixed stay table, inspired by the betandbeat.com advice on when to
/// stop hitting. Later rules override earlier ones.
#[derive(Clone, Copy, Default, Debug)]
pub struct Third;

impl Strategy for Third {
    fn should_hit(&self, hand: &Pile, upcard: Card) -> bool {
        let ds = upcard.score();
        let hs = hand.score();
        let mut stay = hs >= 17;
        if (2..=6).contains(&ds) {
            stay = hs >= 13;
        }
        if hs == 20 {
            stay = true;
        }
        if (4..=6).contains(&ds) {
            stay = hs >= 12;
        }
        if ds <= 7 && hs == 18 {
            stay = true;
        }
        !stay
    }

    fn reset_parameters(&mut self) {}

    fn next_parameter(&mut self, _random: bool, _rng: &mut dyn RngCore) -> bool {
        false
    }

    fn possibilities(&self) -> u32 {
        1
    }

    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(*self)
    }
}

impl fmt::Display for Third {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Third")
    }
}

// Parameter ranges for BasicOptimized, half-open (min, max).
const UPPER: (u32, u32) = (3, 11);
const LOWER: (u32, u32) = (3, 11);
const LIMIT1: (u32, u32) = (16, 21);
const LIMIT2: (u32, u32) = (0, 21);
const LIMIT3: (u32, u32) = (2, 17);

/// Integer stop-drawing thresholds over three dealer-score bands. The
/// default values were found by running with the -o flag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BasicOptimized {
    upper: u32,
    lower: u32,
    limit1: u32,
    limit2: u32,
    limit3: u32,
}

impl Default for BasicOptimized {
    fn default() -> Self {
        Self {
            upper: 4,
            lower: 3,
            limit1: 20,
            limit2: 5,
            limit3: 14,
        }
    }
}

impl BasicOptimized {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BasicOptimized {
    fn should_hit(&self, hand: &Pile, upcard: Card) -> bool {
        let ds = upcard.score();
        if ds >= self.upper {
            return hand.score() < self.limit1;
        }
        if self.lower < ds && ds < self.upper {
            return hand.score() < self.limit2;
        }
        hand.score() < self.limit3
    }

    fn reset_parameters(&mut self) {
        self.upper = UPPER.0;
        self.lower = LOWER.0;
        self.limit1 = LIMIT1.0;
        self.limit2 = LIMIT2.0;
        self.limit3 = LIMIT3.0;
    }

    fn next_parameter(&mut self, random: bool, rng: &mut dyn RngCore) -> bool {
        if random {
            self.upper = rng.gen_range(UPPER.0, UPPER.1);
            self.lower = rng.gen_range(LOWER.0, LOWER.1);
            self.limit1 = rng.gen_range(LIMIT1.0, LIMIT1.1);
            self.limit2 = rng.gen_range(LIMIT2.0, LIMIT2.1);
            self.limit3 = rng.gen_range(LIMIT3.0, LIMIT3.1);
            return true;
        }
        // odometer: limit3 spins fastest, upper slowest
        self.limit3 += 1;
        if self.limit3 >= LIMIT3.1 {
            self.limit3 = LIMIT3.0;
            self.limit2 += 1;
            if self.limit2 >= LIMIT2.1 {
                self.limit2 = LIMIT2.0;
                self.limit1 += 1;
                if self.limit1 >= LIMIT1.1 {
                    self.limit1 = LIMIT1.0;
                    self.lower += 1;
                    if self.lower >= LOWER.1 {
                        self.lower = LOWER.0;
                        self.upper += 1;
                        if self.upper >= UPPER.1 {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    fn possibilities(&self) -> u32 {
        (UPPER.1 - UPPER.0)
            * (LOWER.1 - LOWER.0)
            * (LIMIT1.1 - LIMIT1.0)
            * (LIMIT2.1 - LIMIT2.0)
            * (LIMIT3.1 - LIMIT3.0)
    }

    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(*self)
    }
}

impl fmt::Display for BasicOptimized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "B ({},{},{},{},{})",
            self.upper, self.lower, self.limit1, self.limit2, self.limit3
        )
    }
}

// Parameter grid for SecondOptimized: each real steps by STEP from 0 up to
// (not including) its max.
const STEP: f64 = 0.15;
const A_MAX: f64 = 13.0;
const B_MAX: f64 = 9.0;
const C_MAX: f64 = 19.0;
// accumulated float error over a full axis sweep is far below this, so wrap
// comparisons always see the ideal number of grid points
const WRAP_EPS: f64 = 1e-9;

fn grid_points(max: f64) -> u32 {
    ((max - WRAP_EPS) / STEP).ceil() as u32
}

/// Linear discriminant rule: hit while `hand*a + dealer*b > c`. The default
/// coefficients were found by running with the -2 -o flags.
#[derive(Clone, Copy, Debug)]
pub struct SecondOptimized {
    a: f64,
    b: f64,
    c: f64,
}

impl Default for SecondOptimized {
    fn default() -> Self {
        Self {
            a: 3.728042,
            b: 4.422105,
            c: 12.990700,
        }
    }
}

impl SecondOptimized {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for SecondOptimized {
    fn should_hit(&self, hand: &Pile, upcard: Card) -> bool {
        hand.score() as f64 * self.a + upcard.score() as f64 * self.b > self.c
    }

    fn reset_parameters(&mut self) {
        self.a = 0.0;
        self.b = 0.0;
        self.c = 0.0;
    }

    fn next_parameter(&mut self, random: bool, rng: &mut dyn RngCore) -> bool {
        if random {
            self.a = rng.gen_range(0.0, A_MAX);
            self.b = rng.gen_range(0.0, B_MAX);
            self.c = rng.gen_range(0.0, C_MAX);
            return true;
        }
        self.c += STEP;
        if self.c >= C_MAX - WRAP_EPS {
            self.c = 0.0;
            self.b += STEP;
            if self.b >= B_MAX - WRAP_EPS {
                self.b = 0.0;
                self.a += STEP;
                if self.a >= A_MAX - WRAP_EPS {
                    return false;
                }
            }
        }
        true
    }

    fn possibilities(&self) -> u32 {
        grid_points(A_MAX) * grid_points(B_MAX) * grid_points(C_MAX)
    }

    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(*self)
    }
}

impl fmt::Display for SecondOptimized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S ({:.6}, {:.6}, {:.6})", self.a, self.b, self.c)
    }
}
