//! Game rules and state for the Pokemon mini-game, plus the dice and coin games.
//!
//! Nothing in here talks to Discord. Anything that depends on the clock or on
//! randomness takes them as arguments.

pub mod ball;
pub mod catch;
pub mod dice;
pub mod leaderboard;
pub mod player;
pub mod pokedex;
pub mod wild;

use chrono::TimeDelta;

pub use ball::Ball;
pub use player::Player;
pub use pokedex::Pokedex;
pub use pokedex::Rarity;
pub use pokedex::Species;
pub use wild::WildSpawnState;

/// PokéCoins granted by the daily bonus.
pub const DAILY_BONUS: u64 = 100;

/// PokéCoins a new trainer starts with.
pub const STARTING_COINS: u64 = 100;

/// Poké Balls a new trainer starts with.
pub const STARTING_POKE_BALLS: u32 = 5;

/// Most balls that can be bought in a single purchase.
pub const MAX_PURCHASE: u32 = 100;

/// Tunable limits that apply to every player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Time between personal encounters.
    pub encounter_cooldown: TimeDelta,
    /// Successful catches allowed within an hour.
    pub max_catches_per_hour: usize,
}

impl Rules {
    /// The cooldown is clamped to 1..=60 minutes.
    pub fn new(encounter_cooldown_minutes: u32, max_catches_per_hour: usize) -> Self {
        let minutes = encounter_cooldown_minutes.clamp(1, 60);
        Self {
            encounter_cooldown: TimeDelta::minutes(i64::from(minutes)),
            max_catches_per_hour,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Rules::new(5, 5)
    }
}

/// An [RngCore](rand::RngCore) that always yields the same word, for exact rolls in tests.
/// `FixedRng(0)` rolls `0.0`; `FixedRng(u64::MAX)` rolls just under `1.0`.
#[cfg(test)]
pub(crate) struct FixedRng(pub u64);

#[cfg(test)]
impl rand::RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        (self.0 >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest {
            *byte = self.0 as u8;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cooldown_is_clamped() {
        assert_eq!(Rules::new(0, 5).encounter_cooldown, TimeDelta::minutes(1));
        assert_eq!(Rules::new(500, 5).encounter_cooldown, TimeDelta::minutes(60));
        assert_eq!(Rules::default().encounter_cooldown, TimeDelta::minutes(5));
    }
}
