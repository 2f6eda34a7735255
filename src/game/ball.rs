//! Poké Ball kinds and their catch modifiers.

use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::UserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ball {
    Poke,
    Great,
    Ultra,
    Master,
}

impl Ball {
    /// Every ball, cheapest first.
    pub const ALL: [Ball; 4] = [Ball::Poke, Ball::Great, Ball::Ultra, Ball::Master];

    pub fn name(self) -> &'static str {
        match self {
            Ball::Poke => "Poké Ball",
            Ball::Great => "Great Ball",
            Ball::Ultra => "Ultra Ball",
            Ball::Master => "Master Ball",
        }
    }

    /// The short name users type, e.g. `great`.
    pub fn key(self) -> &'static str {
        match self {
            Ball::Poke => "poke",
            Ball::Great => "great",
            Ball::Ultra => "ultra",
            Ball::Master => "master",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Ball::Poke => "⚪",
            Ball::Great => "🔵",
            Ball::Ultra => "🟡",
            Ball::Master => "🟣",
        }
    }

    /// Multiplier on the species catch rate. `None` means a guaranteed catch.
    pub fn modifier(self) -> Option<f64> {
        match self {
            Ball::Poke => Some(1.0),
            Ball::Great => Some(1.5),
            Ball::Ultra => Some(2.0),
            Ball::Master => None,
        }
    }

    /// Shop price in PokéCoins.
    pub fn price(self) -> u64 {
        match self {
            Ball::Poke => 100,
            Ball::Great => 1_000,
            Ball::Ultra => 10_000,
            Ball::Master => 50_000,
        }
    }

    /// Weight of one ball when totalling an inventory's value.
    pub fn value_points(self) -> u64 {
        match self {
            Ball::Poke => 1,
            Ball::Great => 3,
            Ball::Ultra => 6,
            Ball::Master => 50,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Ball::Poke => "A standard ball with no bonus.",
            Ball::Great => "1.5x catch rate.",
            Ball::Ultra => "2x catch rate.",
            Ball::Master => "Never fails.",
        }
    }

    /// Chance of catching a species with base rate `base` using this ball.
    pub fn final_catch_rate(self, base: f64) -> f64 {
        match self.modifier() {
            Some(modifier) => (base * modifier).min(1.0),
            None => 1.0,
        }
    }
}

impl Display for Ball {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Ball {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ball = match s.trim().to_lowercase().as_str() {
            "poke" | "normal" | "pokeball" | "poke_ball" => Ball::Poke,
            "great" | "great_ball" => Ball::Great,
            "ultra" | "ultra_ball" => Ball::Ultra,
            "master" | "master_ball" => Ball::Master,
            _ => {
                return Err(UserError::UnknownBall {
                    input: s.to_string(),
                })
            }
        };
        Ok(ball)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_legacy_names() {
        assert_eq!("normal".parse::<Ball>().unwrap(), Ball::Poke);
        assert_eq!(" PokeBall ".parse::<Ball>().unwrap(), Ball::Poke);
        assert_eq!("poke_ball".parse::<Ball>().unwrap(), Ball::Poke);
        assert_eq!("Great_Ball".parse::<Ball>().unwrap(), Ball::Great);
        assert_eq!("ultra".parse::<Ball>().unwrap(), Ball::Ultra);
        assert_eq!("MASTER_BALL".parse::<Ball>().unwrap(), Ball::Master);
        assert!(matches!(
            "premier".parse::<Ball>(),
            Err(UserError::UnknownBall { .. })
        ));
    }

    #[test]
    fn modifiers_are_capped() {
        assert_eq!(Ball::Poke.final_catch_rate(0.4), 0.4);
        assert!((Ball::Great.final_catch_rate(0.4) - 0.6).abs() < 1e-9);
        assert_eq!(Ball::Ultra.final_catch_rate(0.6), 1.0);
        assert_eq!(Ball::Master.final_catch_rate(0.01), 1.0);
    }
}
