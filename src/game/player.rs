//! Per-trainer state: collection, ball inventory, currency and cooldowns.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::Ball;
use super::Rarity;
use super::Rules;
use super::Species;
use super::DAILY_BONUS;
use super::MAX_PURCHASE;
use super::STARTING_COINS;
use super::STARTING_POKE_BALLS;
use crate::error::UserError;
use crate::format;

/// Hours between daily bonus claims.
const DAILY_COOLDOWN_HOURS: i64 = 24;

/// Window of the catch limit, in hours.
const CATCH_WINDOW_HOURS: i64 = 1;

/// Ball counts held by a trainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub poke: u32,
    pub great: u32,
    pub ultra: u32,
    pub master: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            poke: STARTING_POKE_BALLS,
            great: 0,
            ultra: 0,
            master: 0,
        }
    }
}

impl Inventory {
    fn slot(&mut self, ball: Ball) -> &mut u32 {
        match ball {
            Ball::Poke => &mut self.poke,
            Ball::Great => &mut self.great,
            Ball::Ultra => &mut self.ultra,
            Ball::Master => &mut self.master,
        }
    }

    pub fn count(&self, ball: Ball) -> u32 {
        match ball {
            Ball::Poke => self.poke,
            Ball::Great => self.great,
            Ball::Ultra => self.ultra,
            Ball::Master => self.master,
        }
    }

    /// Removes one ball. Returns `false` if there was none to remove.
    pub fn take(&mut self, ball: Ball) -> bool {
        let slot = self.slot(ball);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn add(&mut self, ball: Ball, count: u32) {
        let slot = self.slot(ball);
        *slot = slot.saturating_add(count);
    }

    /// Number of balls of every kind.
    pub fn total(&self) -> u32 {
        Ball::ALL.iter().map(|ball| self.count(*ball)).sum()
    }

    /// Sum of count times [Ball::value_points].
    pub fn total_value(&self) -> u64 {
        Ball::ALL
            .iter()
            .map(|ball| u64::from(self.count(*ball)) * ball.value_points())
            .sum()
    }
}

/// Lifetime counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub total_caught: u32,
    pub total_encounters: u32,
    pub join_date: DateTime<Utc>,
}

/// Where a Pokemon in a collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchSource {
    Encounter,
    WildSpawn,
}

/// A Pokemon owned by a trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaughtPokemon {
    /// 1-based position in the owner's collection.
    pub collection_id: u32,
    pub species: Species,
    pub caught_at: DateTime<Utc>,
    pub caught_with: Ball,
    pub caught_from: CatchSource,
}

/// Everything the game remembers about one trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub collection: Vec<CaughtPokemon>,
    pub inventory: Inventory,
    pub stats: PlayerStats,
    pub last_encounter: Option<DateTime<Utc>>,
    /// The personal encounter waiting to be caught.
    pub current_encounter: Option<Species>,
    /// Set once a ball has been thrown at [Player::current_encounter].
    pub encounter_attempted: bool,
    /// Times of recent successful catches.
    pub catch_history: Vec<DateTime<Utc>>,
    pub coins: u64,
    pub last_daily_claim: Option<DateTime<Utc>>,
}

impl Player {
    /// A fresh trainer who joined at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            collection: Vec::new(),
            inventory: Inventory::default(),
            stats: PlayerStats {
                total_caught: 0,
                total_encounters: 0,
                join_date: now,
            },
            last_encounter: None,
            current_encounter: None,
            encounter_attempted: false,
            catch_history: Vec::new(),
            coins: STARTING_COINS,
            last_daily_claim: None,
        }
    }

    /// Time left before another encounter, or `None` if one is allowed now.
    pub fn encounter_cooldown_remaining(&self, now: DateTime<Utc>, rules: &Rules) -> Option<TimeDelta> {
        let last = self.last_encounter?;
        let remaining = last + rules.encounter_cooldown - now;
        (remaining > TimeDelta::zero()).then_some(remaining)
    }

    /// Replaces the current encounter and starts the cooldown.
    pub fn start_encounter(&mut self, species: Species, now: DateTime<Utc>) {
        self.current_encounter = Some(species);
        self.encounter_attempted = false;
        self.last_encounter = Some(now);
        self.stats.total_encounters += 1;
    }

    /// Forgets the whole catch history once any entry is an hour old.
    pub fn prune_catch_history(&mut self, now: DateTime<Utc>) {
        if self.counted_catches(now) == 0 {
            self.catch_history.clear();
        }
    }

    pub fn can_catch(&mut self, now: DateTime<Utc>, rules: &Rules) -> bool {
        self.prune_catch_history(now);
        self.catch_history.len() < rules.max_catches_per_hour
    }

    /// Catches that still count toward the hourly limit, without pruning.
    fn counted_catches(&self, now: DateTime<Utc>) -> usize {
        let expired = self
            .catch_history
            .iter()
            .any(|caught| now - *caught >= TimeDelta::hours(CATCH_WINDOW_HOURS));
        if expired {
            0
        } else {
            self.catch_history.len()
        }
    }

    pub fn remaining_catches(&self, now: DateTime<Utc>, rules: &Rules) -> usize {
        rules
            .max_catches_per_hour
            .saturating_sub(self.counted_catches(now))
    }

    /// Time until the catch limit lifts, or `None` if the player is under it.
    pub fn catch_limit_resets_in(&mut self, now: DateTime<Utc>, rules: &Rules) -> Option<TimeDelta> {
        if self.can_catch(now, rules) {
            return None;
        }
        let oldest = self.catch_history.iter().min()?;
        let remaining = *oldest + TimeDelta::hours(CATCH_WINDOW_HOURS) - now;
        (remaining > TimeDelta::zero()).then_some(remaining)
    }

    /// Adds a caught Pokemon to the collection and counts it toward the hourly limit.
    /// Returns its collection id.
    pub fn record_catch(
        &mut self,
        species: Species,
        ball: Ball,
        source: CatchSource,
        now: DateTime<Utc>,
    ) -> u32 {
        let collection_id = self.collection.len() as u32 + 1;
        self.collection.push(CaughtPokemon {
            collection_id,
            species,
            caught_at: now,
            caught_with: ball,
            caught_from: source,
        });
        self.stats.total_caught += 1;
        self.catch_history.push(now);
        collection_id
    }

    /// Successful catches as a percentage of encounters.
    pub fn catch_rate_percent(&self) -> f64 {
        if self.stats.total_encounters == 0 {
            return 0.0;
        }
        f64::from(self.stats.total_caught) / f64::from(self.stats.total_encounters) * 100.0
    }

    pub fn add_coins(&mut self, amount: u64) -> u64 {
        self.coins = self.coins.saturating_add(amount);
        self.coins
    }

    /// Deducts `amount` if affordable.
    pub fn spend_coins(&mut self, amount: u64) -> bool {
        if self.coins < amount {
            return false;
        }
        self.coins -= amount;
        true
    }

    /// Time left before the daily bonus can be claimed again.
    pub fn daily_cooldown_remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        let last = self.last_daily_claim?;
        let remaining = last + TimeDelta::hours(DAILY_COOLDOWN_HOURS) - now;
        (remaining > TimeDelta::zero()).then_some(remaining)
    }

    /// Grants the daily bonus and returns the amount granted.
    pub fn claim_daily(&mut self, now: DateTime<Utc>) -> Result<u64, UserError> {
        if let Some(remaining) = self.daily_cooldown_remaining(now) {
            return Err(UserError::DailyAlreadyClaimed {
                wait: format::hours_minutes(remaining),
            });
        }
        self.add_coins(DAILY_BONUS);
        self.last_daily_claim = Some(now);
        Ok(DAILY_BONUS)
    }

    /// Buys `quantity` balls. Returns the total cost.
    pub fn buy(&mut self, ball: Ball, quantity: u32) -> Result<u64, UserError> {
        if !(1..=MAX_PURCHASE).contains(&quantity) {
            return Err(UserError::InvalidQuantity {
                max: MAX_PURCHASE,
            });
        }

        let cost = ball.price() * u64::from(quantity);
        if !self.spend_coins(cost) {
            return Err(UserError::InsufficientFunds {
                cost,
                balance: self.coins,
            });
        }
        self.inventory.add(ball, quantity);
        Ok(cost)
    }

    /// Collection grouped by rarity, rarest first.
    pub fn collection_by_rarity(&self) -> BTreeMap<std::cmp::Reverse<Rarity>, Vec<&CaughtPokemon>> {
        let mut grouped: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for caught in &self.collection {
            grouped
                .entry(std::cmp::Reverse(caught.species.rarity))
                .or_default()
                .push(caught);
        }
        grouped
    }

    /// Case-insensitive lookup in the collection.
    pub fn find_caught(&self, name: &str) -> Option<&CaughtPokemon> {
        let name = name.trim();
        self.collection
            .iter()
            .find(|caught| caught.species.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;
    use crate::game::pokedex::test::species;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_players_get_starter_kit() {
        let player = Player::new(t0());
        assert_eq!(player.inventory.count(Ball::Poke), 5);
        assert_eq!(player.inventory.total(), 5);
        assert_eq!(player.coins, 100);
        assert_eq!(player.stats.join_date, t0());
        assert_eq!(player.catch_rate_percent(), 0.0);
    }

    #[test]
    fn encounter_cooldown() {
        let rules = Rules::default();
        let mut player = Player::new(t0());
        assert_eq!(player.encounter_cooldown_remaining(t0(), &rules), None);

        player.start_encounter(species(1, "Pidgey", Rarity::Common, 0.8), t0());
        assert_eq!(player.stats.total_encounters, 1);
        assert!(!player.encounter_attempted);

        let later = t0() + TimeDelta::seconds(28);
        assert_eq!(
            player.encounter_cooldown_remaining(later, &rules),
            Some(TimeDelta::seconds(272))
        );
        assert_eq!(
            player.encounter_cooldown_remaining(t0() + TimeDelta::minutes(5), &rules),
            None
        );
    }

    #[test]
    fn old_catch_clears_whole_history() {
        let rules = Rules::default();
        let mut player = Player::new(t0());
        player.catch_history = vec![
            t0(),
            t0() + TimeDelta::minutes(30),
            t0() + TimeDelta::minutes(40),
            t0() + TimeDelta::minutes(50),
            t0() + TimeDelta::minutes(55),
        ];

        let at_limit = t0() + TimeDelta::minutes(56);
        assert!(!player.can_catch(at_limit, &rules));
        assert_eq!(
            player.catch_limit_resets_in(at_limit, &rules),
            Some(TimeDelta::minutes(4))
        );

        let an_hour_on = t0() + TimeDelta::hours(1);
        assert_eq!(player.remaining_catches(an_hour_on, &rules), 5);
        assert_eq!(player.catch_history.len(), 5);

        player.prune_catch_history(an_hour_on);
        assert!(player.catch_history.is_empty());
    }

    #[test]
    fn remaining_catches_leaves_history_alone() {
        let rules = Rules::default();
        let mut player = Player::new(t0());
        player.catch_history = vec![t0(), t0() + TimeDelta::minutes(10)];

        let soon = t0() + TimeDelta::minutes(20);
        assert_eq!(player.remaining_catches(soon, &rules), 3);
        assert_eq!(player.catch_history.len(), 2);
    }

    #[test]
    fn daily_bonus_once_per_day() {
        let mut player = Player::new(t0());
        assert_eq!(player.claim_daily(t0()).unwrap(), 100);
        assert_eq!(player.coins, 200);

        let err = player.claim_daily(t0() + TimeDelta::minutes(55)).unwrap_err();
        assert!(matches!(err, UserError::DailyAlreadyClaimed { ref wait } if wait == "23h 5m"));

        assert!(player.claim_daily(t0() + TimeDelta::hours(24)).is_ok());
        assert_eq!(player.coins, 300);
    }

    #[test]
    fn buying_checks_quantity_and_funds() {
        let mut player = Player::new(t0());
        player.coins = 1_200;

        assert!(matches!(
            player.buy(Ball::Poke, 0),
            Err(UserError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            player.buy(Ball::Poke, 101),
            Err(UserError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            player.buy(Ball::Great, 2),
            Err(UserError::InsufficientFunds { cost: 2_000, balance: 1_200 })
        ));
        assert_eq!(player.coins, 1_200);

        assert_eq!(player.buy(Ball::Great, 1).unwrap(), 1_000);
        assert_eq!(player.buy(Ball::Poke, 2).unwrap(), 200);
        assert_eq!(player.coins, 0);
        assert_eq!(player.inventory.count(Ball::Great), 1);
        assert_eq!(player.inventory.count(Ball::Poke), 7);
        assert_eq!(player.inventory.total_value(), 7 + 3);
    }

    #[test]
    fn collection_groups_rarest_first() {
        let mut player = Player::new(t0());
        for (id, rarity) in [(1, Rarity::Common), (2, Rarity::Legendary), (3, Rarity::Common)] {
            let caught = species(id, &format!("Mon{id}"), rarity, 0.5);
            player.record_catch(caught, Ball::Poke, CatchSource::Encounter, t0());
        }

        let grouped = player.collection_by_rarity();
        let order: Vec<_> = grouped.iter().map(|(r, v)| (r.0, v.len())).collect();
        assert_eq!(order, vec![(Rarity::Legendary, 1), (Rarity::Common, 2)]);
        assert_eq!(player.find_caught("mon3").map(|c| c.collection_id), Some(3));
    }

    #[test]
    fn round_trips_through_json() {
        let mut player = Player::new(t0());
        player.start_encounter(species(7, "Squirtle", Rarity::Uncommon, 0.55), t0());
        let json = serde_json::to_string(&player).unwrap();
        let back: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(back, player);
    }
}
