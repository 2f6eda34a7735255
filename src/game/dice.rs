//! Dice rolls in `NdS` notation and coin flips.

use std::str::FromStr;

use rand::Rng;

use crate::error::UserError;

/// Most dice in one roll.
const MAX_DICE: u32 = 20;

/// Valid side counts.
const SIDES: std::ops::RangeInclusive<u32> = 2..=1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coin {
    Heads,
    Tails,
}

impl Coin {
    pub fn flip<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Coin::Heads
        } else {
            Coin::Tails
        }
    }

    /// Gold for heads, silver for tails.
    pub fn color(self) -> u32 {
        match self {
            Coin::Heads => 0xFFD700,
            Coin::Tails => 0xC0C0C0,
        }
    }

    pub fn shout(self) -> &'static str {
        match self {
            Coin::Heads => "HEADS!",
            Coin::Tails => "TAILS!",
        }
    }
}

/// A parsed roll such as `3d8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub count: u32,
    pub sides: u32,
}

impl Default for DiceRoll {
    fn default() -> Self {
        Self { count: 1, sides: 6 }
    }
}

impl FromStr for DiceRoll {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let notation = s.trim().to_lowercase();
        let invalid = || UserError::InvalidDice {
            reason: "Invalid dice notation! Use a format like `1d6`, `2d20`, or `d100`".to_string(),
        };

        let (count, sides) = notation.split_once('d').ok_or_else(invalid)?;
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(count) || sides.is_empty() || !all_digits(sides) {
            return Err(invalid());
        }

        // Oversized numbers are out of range rather than malformed.
        let count = if count.is_empty() {
            1
        } else {
            count.parse().unwrap_or(u32::MAX)
        };
        let sides = sides.parse().unwrap_or(u32::MAX);

        if !(1..=MAX_DICE).contains(&count) {
            return Err(UserError::InvalidDice {
                reason: format!("Number of dice must be between 1 and {MAX_DICE}!"),
            });
        }
        if !SIDES.contains(&sides) {
            return Err(UserError::InvalidDice {
                reason: format!(
                    "Dice sides must be between {} and {}!",
                    SIDES.start(),
                    SIDES.end()
                ),
            });
        }

        Ok(DiceRoll { count, sides })
    }
}

/// Flavor text for notable rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flair {
    CriticalFail,
    CriticalSuccess,
    Legendary,
    Disaster,
}

impl Flair {
    pub fn title(self) -> &'static str {
        match self {
            Flair::CriticalFail => ":skull: Critical Fail!",
            Flair::CriticalSuccess => ":star: Critical Success!",
            Flair::Legendary => ":fire: LEGENDARY!",
            Flair::Disaster => ":skull: DISASTER!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub rolls: Vec<u32>,
    pub total: u32,
}

impl DiceRoll {
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> RollOutcome {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        let total = rolls.iter().sum();
        RollOutcome { rolls, total }
    }

    pub fn emoji(self) -> &'static str {
        match self.sides {
            4 => ":small_red_triangle:",
            6 => ":game_die:",
            8 => ":large_orange_diamond:",
            10 => ":keycap_ten:",
            12 => ":large_blue_diamond:",
            20 => ":dart:",
            100 => ":100:",
            _ => ":game_die:",
        }
    }

    /// Flavor for a single die at either extreme, or several dice all at one extreme.
    pub fn flair(self, outcome: &RollOutcome) -> Option<Flair> {
        let all = |value: u32| outcome.rolls.iter().all(|roll| *roll == value);
        match (self.count, outcome.rolls.as_slice()) {
            (1, [1]) => Some(Flair::CriticalFail),
            (1, [roll]) if *roll == self.sides => Some(Flair::CriticalSuccess),
            (1, _) => None,
            _ if all(self.sides) => Some(Flair::Legendary),
            _ if all(1) => Some(Flair::Disaster),
            _ => None,
        }
    }

    /// Detail text for a flair.
    pub fn flair_text(self, flair: Flair) -> String {
        match flair {
            Flair::CriticalFail => "Ouch, that's a 1!".to_string(),
            Flair::CriticalSuccess => format!("Maximum roll of {}!", self.sides),
            Flair::Legendary => "All maximum rolls!".to_string(),
            Flair::Disaster => "All ones... yikes!".to_string(),
        }
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}
