//! Catch resolution for personal encounters and wild spawns.

use chrono::DateTime;
use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use super::player::CatchSource;
use super::Ball;
use super::Player;
use super::Rules;
use super::Species;
use crate::format;

/// Reasons a catch is refused before any ball is thrown.
#[derive(Debug, Error, PartialEq)]
pub enum CatchRefusal {
    #[error("You need to encounter a Pokemon first! Use `encounter` to find a wild Pokemon.")]
    NoEncounter,
    #[error("You already threw a ball at this Pokemon. Use `encounter` to find another one.")]
    AlreadyAttempted,
    #[error("You've reached the limit of {limit} catches per hour. Try again in {resets_in}.")]
    CatchLimitReached { limit: usize, resets_in: String },
    #[error("You don't have any {0}s left!")]
    NoBall(Ball),
}

/// The numbers behind a thrown ball.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchAttempt {
    pub species: Species,
    pub ball: Ball,
    /// The species' own catch rate.
    pub base_rate: f64,
    /// The rate after the ball modifier.
    pub final_rate: f64,
    /// Uniform roll in `[0, 1)`. The catch succeeds when `roll <= final_rate`.
    pub roll: f64,
}

impl CatchAttempt {
    fn throw<R: Rng + ?Sized>(species: Species, ball: Ball, rng: &mut R) -> Self {
        let base_rate = species.catch_rate;
        let final_rate = ball.final_catch_rate(base_rate);
        let roll: f64 = rng.gen();
        Self {
            species,
            ball,
            base_rate,
            final_rate,
            roll,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.roll <= self.final_rate
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatchOutcome {
    Caught {
        attempt: CatchAttempt,
        /// Position of the new Pokemon in the collection.
        collection_id: u32,
    },
    Escaped {
        attempt: CatchAttempt,
    },
}

impl CatchOutcome {
    pub fn attempt(&self) -> &CatchAttempt {
        match self {
            CatchOutcome::Caught { attempt, .. } | CatchOutcome::Escaped { attempt } => attempt,
        }
    }

    pub fn is_caught(&self) -> bool {
        matches!(self, CatchOutcome::Caught { .. })
    }
}

/// Refuses with [CatchRefusal::CatchLimitReached] if the hourly limit is used up.
fn check_limit(player: &mut Player, now: DateTime<Utc>, rules: &Rules) -> Result<(), CatchRefusal> {
    if player.can_catch(now, rules) {
        return Ok(());
    }
    let resets_in = player
        .catch_limit_resets_in(now, rules)
        .map(format::minutes_seconds)
        .unwrap_or_else(|| "a moment".to_string());

    Err(CatchRefusal::CatchLimitReached {
        limit: rules.max_catches_per_hour,
        resets_in,
    })
}

/// Throws `ball` at the player's current encounter.
///
/// The ball is spent and the encounter is marked attempted whether or not the
/// catch succeeds, so an escaped Pokemon cannot be retried.
pub fn attempt_catch<R: Rng + ?Sized>(
    player: &mut Player,
    ball: Ball,
    now: DateTime<Utc>,
    rules: &Rules,
    rng: &mut R,
) -> Result<CatchOutcome, CatchRefusal> {
    let Some(species) = player.current_encounter.clone() else {
        return Err(CatchRefusal::NoEncounter);
    };
    if player.encounter_attempted {
        return Err(CatchRefusal::AlreadyAttempted);
    }
    check_limit(player, now, rules)?;
    if !player.inventory.take(ball) {
        return Err(CatchRefusal::NoBall(ball));
    }
    player.encounter_attempted = true;

    let attempt = CatchAttempt::throw(species, ball, rng);
    if !attempt.succeeded() {
        return Ok(CatchOutcome::Escaped { attempt });
    }

    let collection_id =
        player.record_catch(attempt.species.clone(), ball, CatchSource::Encounter, now);
    player.current_encounter = None;
    player.encounter_attempted = false;

    Ok(CatchOutcome::Caught {
        attempt,
        collection_id,
    })
}

/// Throws a Poké Ball at a wild spawn. Wild catches always use the base rate.
pub fn attempt_wild_catch<R: Rng + ?Sized>(
    player: &mut Player,
    species: &Species,
    now: DateTime<Utc>,
    rules: &Rules,
    rng: &mut R,
) -> Result<CatchOutcome, CatchRefusal> {
    check_limit(player, now, rules)?;
    if !player.inventory.take(Ball::Poke) {
        return Err(CatchRefusal::NoBall(Ball::Poke));
    }

    let attempt = CatchAttempt::throw(species.clone(), Ball::Poke, rng);
    if !attempt.succeeded() {
        return Ok(CatchOutcome::Escaped { attempt });
    }

    let collection_id =
        player.record_catch(species.clone(), Ball::Poke, CatchSource::WildSpawn, now);
    Ok(CatchOutcome::Caught {
        attempt,
        collection_id,
    })
}

#[cfg(test)]
mod test {
    use chrono::TimeDelta;
    use chrono::TimeZone;

    use super::*;
    use crate::game::pokedex::test::species;
    use crate::game::FixedRng;
    use crate::game::Rarity;

    /// Always rolls 0.0.
    fn lucky() -> FixedRng {
        FixedRng(0)
    }

    /// Always rolls just under 1.0.
    fn unlucky() -> FixedRng {
        FixedRng(u64::MAX)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn encountered(catch_rate: f64) -> Player {
        let mut player = Player::new(t0());
        player.start_encounter(species(16, "Pidgey", Rarity::Common, catch_rate), t0());
        player
    }

    #[test]
    fn no_encounter_is_refused() {
        let mut player = Player::new(t0());
        let result = attempt_catch(&mut player, Ball::Poke, t0(), &Rules::default(), &mut lucky());
        assert_eq!(result, Err(CatchRefusal::NoEncounter));
        assert_eq!(player.inventory.count(Ball::Poke), 5);
    }

    #[test]
    fn successful_catch_joins_collection() {
        let rules = Rules::default();
        let mut player = encountered(0.5);

        let outcome = attempt_catch(&mut player, Ball::Poke, t0(), &rules, &mut lucky()).unwrap();
        assert!(outcome.is_caught());
        assert!(matches!(outcome, CatchOutcome::Caught { collection_id: 1, .. }));

        assert_eq!(player.inventory.count(Ball::Poke), 4);
        assert_eq!(player.collection.len(), 1);
        assert_eq!(player.collection[0].caught_from, CatchSource::Encounter);
        assert_eq!(player.stats.total_caught, 1);
        assert_eq!(player.catch_history, vec![t0()]);
        assert!(player.current_encounter.is_none());
        assert!(!player.encounter_attempted);
        assert_eq!(player.catch_rate_percent(), 100.0);
    }

    #[test]
    fn escaped_encounter_cannot_be_retried() {
        let rules = Rules::default();
        let mut player = encountered(0.5);

        let outcome = attempt_catch(&mut player, Ball::Great, t0(), &rules, &mut unlucky());
        assert_eq!(outcome, Err(CatchRefusal::NoBall(Ball::Great)));

        let outcome = attempt_catch(&mut player, Ball::Poke, t0(), &rules, &mut unlucky()).unwrap();
        assert!(!outcome.is_caught());
        assert_eq!(outcome.attempt().final_rate, 0.5);
        assert!(player.encounter_attempted);
        assert!(player.current_encounter.is_some());

        let retry = attempt_catch(&mut player, Ball::Poke, t0(), &rules, &mut lucky());
        assert_eq!(retry, Err(CatchRefusal::AlreadyAttempted));
        assert_eq!(player.inventory.count(Ball::Poke), 4);
    }

    #[test]
    fn master_ball_never_misses() {
        let mut player = encountered(0.01);
        player.inventory.add(Ball::Master, 1);

        let outcome =
            attempt_catch(&mut player, Ball::Master, t0(), &Rules::default(), &mut unlucky())
                .unwrap();
        assert!(outcome.is_caught());
        assert_eq!(outcome.attempt().final_rate, 1.0);
        assert_eq!(player.inventory.count(Ball::Master), 0);
    }

    #[test]
    fn limit_is_checked_before_ball_is_spent() {
        let rules = Rules::new(5, 2);
        let mut player = encountered(0.9);
        player.catch_history = vec![t0() - TimeDelta::minutes(20), t0() - TimeDelta::minutes(10)];

        let result = attempt_catch(&mut player, Ball::Poke, t0(), &rules, &mut lucky());
        assert_eq!(
            result,
            Err(CatchRefusal::CatchLimitReached {
                limit: 2,
                resets_in: "40m".to_string()
            })
        );
        assert_eq!(player.inventory.count(Ball::Poke), 5);
        assert!(!player.encounter_attempted);
    }

    #[test]
    fn wild_catch_uses_poke_balls() {
        let rules = Rules::default();
        let wild = species(19, "Rattata", Rarity::Common, 0.85);
        let mut player = Player::new(t0());

        let outcome = attempt_wild_catch(&mut player, &wild, t0(), &rules, &mut lucky()).unwrap();
        assert!(outcome.is_caught());
        assert_eq!(player.collection[0].caught_from, CatchSource::WildSpawn);
        assert_eq!(player.collection[0].caught_with, Ball::Poke);

        player.inventory.poke = 0;
        let result = attempt_wild_catch(&mut player, &wild, t0(), &rules, &mut lucky());
        assert_eq!(result, Err(CatchRefusal::NoBall(Ball::Poke)));
    }
}
