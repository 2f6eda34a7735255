//! Shared wild spawns posted to a server channel on a timer.

use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::Species;
use crate::error::UserError;

/// Channel name searched for when nothing else is configured.
pub const DEFAULT_SPAWN_CHANNEL: &str = "pokemon";

/// Who caught a wild Pokemon, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildCatcher {
    pub user_id: u64,
    pub username: String,
    pub caught_at: DateTime<Utc>,
}

/// A single user's throw at a wild Pokemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildAttempt {
    pub username: String,
    pub attempted_at: DateTime<Utc>,
    pub success: bool,
}

/// The Pokemon currently posted in the spawn channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildPokemon {
    pub species: Species,
    pub spawned_at: DateTime<Utc>,
    pub channel_id: u64,
    pub caught_by: Option<WildCatcher>,
    /// Keyed by user id. Each user gets one throw per spawn.
    pub attempts: HashMap<u64, WildAttempt>,
}

/// Persistent state of the wild spawn system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildSpawnState {
    pub last_spawn: Option<DateTime<Utc>>,
    pub current: Option<WildPokemon>,
    /// Name of the text channel spawns are posted to.
    pub spawn_channel: String,
}

impl Default for WildSpawnState {
    fn default() -> Self {
        Self {
            last_spawn: None,
            current: None,
            spawn_channel: DEFAULT_SPAWN_CHANNEL.to_string(),
        }
    }
}

/// What `wildstatus` reports.
#[derive(Debug, Clone, PartialEq)]
pub enum WildStatus {
    Available {
        species: Species,
        minutes_available: i64,
        channel_id: u64,
    },
    Caught {
        by: WildCatcher,
    },
    Empty,
}

impl WildSpawnState {
    pub fn with_channel(spawn_channel: impl Into<String>) -> Self {
        Self {
            spawn_channel: spawn_channel.into(),
            ..Default::default()
        }
    }

    /// Posts a new Pokemon, replacing the previous one and its attempts.
    pub fn spawn(&mut self, species: Species, channel_id: u64, now: DateTime<Utc>) {
        self.current = Some(WildPokemon {
            species,
            spawned_at: now,
            channel_id,
            caught_by: None,
            attempts: HashMap::new(),
        });
        self.last_spawn = Some(now);
    }

    /// The current Pokemon, if nobody has caught it yet.
    pub fn available(&self) -> Option<&WildPokemon> {
        self.current
            .as_ref()
            .filter(|wild| wild.caught_by.is_none())
    }

    /// Checks whether `user_id` may throw at the current Pokemon from this channel,
    /// returning the species to throw at.
    ///
    /// With nothing available, a channel not named like the spawn channel is
    /// refused as the wrong channel first.
    pub fn check_catch(
        &self,
        user_id: u64,
        channel_id: u64,
        channel_name: Option<&str>,
    ) -> Result<Species, UserError> {
        let wrong_channel = || UserError::WrongChannel {
            channel: self.spawn_channel.clone(),
        };

        let Some(current) = self.available() else {
            return match channel_name {
                Some(name) if !name.eq_ignore_ascii_case(&self.spawn_channel) => {
                    Err(wrong_channel())
                }
                _ => Err(UserError::NoWildPokemon),
            };
        };
        if current.channel_id != channel_id {
            return Err(wrong_channel());
        }
        if self.has_attempted(user_id) {
            return Err(UserError::WildAlreadyAttempted);
        }
        Ok(current.species.clone())
    }

    pub fn has_attempted(&self, user_id: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|wild| wild.attempts.contains_key(&user_id))
    }

    pub fn record_attempt(
        &mut self,
        user_id: u64,
        username: impl Into<String>,
        success: bool,
        now: DateTime<Utc>,
    ) {
        if let Some(wild) = self.current.as_mut() {
            let attempt = WildAttempt {
                username: username.into(),
                attempted_at: now,
                success,
            };
            wild.attempts.insert(user_id, attempt);
        }
    }

    pub fn mark_caught(&mut self, user_id: u64, username: impl Into<String>, now: DateTime<Utc>) {
        if let Some(wild) = self.current.as_mut() {
            wild.caught_by = Some(WildCatcher {
                user_id,
                username: username.into(),
                caught_at: now,
            });
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn set_channel(&mut self, name: impl Into<String>) {
        self.spawn_channel = name.into();
    }

    pub fn status(&self, now: DateTime<Utc>) -> WildStatus {
        match &self.current {
            Some(WildPokemon {
                caught_by: Some(by),
                ..
            }) => WildStatus::Caught { by: by.clone() },
            Some(wild) => WildStatus::Available {
                species: wild.species.clone(),
                minutes_available: (now - wild.spawned_at).num_minutes(),
                channel_id: wild.channel_id,
            },
            None => WildStatus::Empty,
        }
    }

    /// Whole minutes since the last spawn.
    pub fn minutes_since_spawn(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_spawn.map(|last| (now - last).num_minutes())
    }
}

/// Whether the `misses`-th spawn in a row without a channel should be logged.
/// The first three are, then every tenth.
pub fn should_warn(misses: u32) -> bool {
    misses <= 3 || misses % 10 == 0
}

/// Finds the channel named `target`, preferring an exact match over a case-insensitive one.
pub fn pick_spawn_channel<'a, I>(channels: I, target: &str) -> Option<u64>
where
    I: IntoIterator<Item = (u64, &'a str)>,
    I::IntoIter: Clone,
{
    let channels = channels.into_iter();
    channels
        .clone()
        .find(|(_, name)| *name == target)
        .or_else(|| {
            channels
                .clone()
                .find(|(_, name)| name.eq_ignore_ascii_case(target))
        })
        .map(|(id, _)| id)
}

#[cfg(test)]
mod test {
    use chrono::TimeDelta;
    use chrono::TimeZone;

    use super::*;
    use crate::game::pokedex::test::species;
    use crate::game::Rarity;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn spawn_resets_attempts() {
        let mut state = WildSpawnState::default();
        assert_eq!(state.status(t0()), WildStatus::Empty);
        assert_eq!(state.spawn_channel, "pokemon");

        state.spawn(species(16, "Pidgey", Rarity::Common, 0.85), 55, t0());
        state.record_attempt(1, "ash", false, t0());
        assert!(state.has_attempted(1));
        assert!(!state.has_attempted(2));

        state.spawn(species(19, "Rattata", Rarity::Common, 0.85), 55, t0());
        assert!(!state.has_attempted(1));
        assert_eq!(state.last_spawn, Some(t0()));
    }

    #[test]
    fn caught_pokemon_is_no_longer_available() {
        let mut state = WildSpawnState::default();
        state.spawn(species(16, "Pidgey", Rarity::Common, 0.85), 55, t0());

        let later = t0() + TimeDelta::minutes(12);
        assert!(matches!(
            state.status(later),
            WildStatus::Available { minutes_available: 12, .. }
        ));

        state.mark_caught(7, "misty", later);
        assert!(state.available().is_none());
        assert!(matches!(state.status(later), WildStatus::Caught { ref by } if by.username == "misty"));
        assert_eq!(state.minutes_since_spawn(later), Some(12));

        state.clear();
        assert_eq!(state.status(later), WildStatus::Empty);
    }

    #[test]
    fn wild_catch_checks_run_in_order() {
        let mut state = WildSpawnState::with_channel("safari");
        assert!(matches!(
            state.check_catch(1, 55, Some("general")),
            Err(UserError::WrongChannel { ref channel }) if channel == "safari"
        ));
        assert!(matches!(
            state.check_catch(1, 55, Some("Safari")),
            Err(UserError::NoWildPokemon)
        ));
        assert!(matches!(state.check_catch(1, 55, None), Err(UserError::NoWildPokemon)));

        state.spawn(species(16, "Pidgey", Rarity::Common, 0.85), 55, t0());
        assert!(matches!(
            state.check_catch(1, 66, Some("safari")),
            Err(UserError::WrongChannel { .. })
        ));
        assert_eq!(state.check_catch(1, 55, Some("safari")).unwrap().name, "Pidgey");

        state.record_attempt(1, "ash", false, t0());
        assert!(matches!(
            state.check_catch(1, 55, Some("safari")),
            Err(UserError::WildAlreadyAttempted)
        ));
        assert!(state.check_catch(2, 55, Some("safari")).is_ok());

        state.record_attempt(2, "misty", true, t0());
        state.mark_caught(2, "misty", t0());
        assert!(matches!(
            state.check_catch(3, 55, Some("safari")),
            Err(UserError::NoWildPokemon)
        ));
    }

    #[test]
    fn missing_channel_warnings_thin_out() {
        let warned: Vec<u32> = (1..=40).filter(|misses| should_warn(*misses)).collect();
        assert_eq!(warned, vec![1, 2, 3, 10, 20, 30, 40]);
    }

    #[test]
    fn exact_channel_name_wins() {
        let channels = [(1, "general"), (2, "Pokemon"), (3, "pokemon")];
        assert_eq!(pick_spawn_channel(channels, "pokemon"), Some(3));
        assert_eq!(pick_spawn_channel(channels, "POKEMON"), Some(2));
        assert_eq!(pick_spawn_channel(channels, "trading"), None);
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = WildSpawnState::with_channel("wild-area");
        state.spawn(species(16, "Pidgey", Rarity::Common, 0.85), 55, t0());
        state.record_attempt(123456789012345678, "brock", true, t0());

        let json = serde_json::to_string(&state).unwrap();
        let back: WildSpawnState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
