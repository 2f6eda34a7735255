//! Player rankings.

use poise::ChoiceParameter;

use super::player::CaughtPokemon;
use super::Player;
use super::Rarity;

/// Entries shown on a board.
pub const TOP_N: usize = 10;

/// Base-stat total from which a catch earns the rarity bonus.
const STRONG_STAT_TOTAL: u32 = 600;

/// Points added for a Pokemon with a base-stat total of at least [STRONG_STAT_TOTAL].
const STRONG_BONUS: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ChoiceParameter)]
pub enum Board {
    #[name = "pokemon"]
    Pokemon,
    #[name = "power"]
    Power,
    #[name = "rarity"]
    Rarity,
}

impl Board {
    pub const ALL: [Board; 3] = [Board::Pokemon, Board::Power, Board::Rarity];

    /// Short label of the score column.
    pub fn label(self) -> &'static str {
        match self {
            Board::Pokemon => "Pokemon",
            Board::Power => "Power",
            Board::Rarity => "Rarity Score",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Board::Pokemon => "🏆 Pokemon Collection Leaderboard",
            Board::Power => "💪 Total Power Leaderboard",
            Board::Rarity => "💎 Rarity Score Leaderboard",
        }
    }

    pub fn blurb(self) -> &'static str {
        match self {
            Board::Pokemon => "Top 10 players by number of Pokemon caught",
            Board::Power => "Top 10 players by combined Pokemon power (Attack + Defense + HP)",
            Board::Rarity => {
                "Top 10 players by rarity score (Legendary=100pts, Rare=50pts, Uncommon=25pts, +25 for 600+ stat totals)"
            }
        }
    }

    pub fn score(self, player: &Player) -> u64 {
        match self {
            Board::Pokemon => player.collection.len() as u64,
            Board::Power => player.collection.iter().map(power).sum(),
            Board::Rarity => player.collection.iter().map(rarity_points).sum(),
        }
    }
}

/// Attack + defense + HP.
fn power(caught: &CaughtPokemon) -> u64 {
    let stats = &caught.species.stats;
    u64::from(stats.attack) + u64::from(stats.defense) + u64::from(stats.hp)
}

fn rarity_points(caught: &CaughtPokemon) -> u64 {
    let base = match caught.species.rarity {
        Rarity::Legendary => 100,
        Rarity::Rare => 50,
        Rarity::Uncommon => 25,
        Rarity::Common => 0,
    };
    let bonus = if caught.species.stats.total >= STRONG_STAT_TOTAL {
        STRONG_BONUS
    } else {
        0
    };
    base + bonus
}

/// A ranked player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    /// 1-based.
    pub rank: usize,
    pub user_id: u64,
    pub score: u64,
}

/// Every player with a positive score, best first. Ties go to the lower user id.
pub fn standings<'a, I>(players: I, board: Board) -> Vec<Standing>
where
    I: IntoIterator<Item = (u64, &'a Player)>,
{
    let mut scored: Vec<(u64, u64)> = players
        .into_iter()
        .map(|(user_id, player)| (user_id, board.score(player)))
        .filter(|(_, score)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (user_id, score))| Standing {
            rank: i + 1,
            user_id,
            score,
        })
        .collect()
}

/// The standing of `user_id`, or `None` if unranked.
pub fn rank_of(standings: &[Standing], user_id: u64) -> Option<Standing> {
    standings.iter().find(|s| s.user_id == user_id).copied()
}

/// Medal for the podium, bold position otherwise.
pub fn badge(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("**{n}.**"),
    }
}

/// Display name used when a user can't be fetched.
pub fn fallback_name(user_id: u64) -> String {
    let digits = user_id.to_string();
    let tail = &digits[digits.len().saturating_sub(4)..];
    format!("Player #{tail}")
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::game::player::CatchSource;
    use crate::game::pokedex::test::species;
    use crate::game::Ball;

    fn player_with(catches: &[(Rarity, u32)]) -> Player {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut player = Player::new(now);
        for (i, (rarity, total)) in catches.iter().enumerate() {
            let mut caught = species(i as u32 + 1, "Mon", *rarity, 0.5);
            caught.stats.total = *total;
            player.record_catch(caught, Ball::Poke, CatchSource::Encounter, now);
        }
        player
    }

    #[test]
    fn scores() {
        let player = player_with(&[(Rarity::Legendary, 680), (Rarity::Common, 200), (Rarity::Uncommon, 300)]);
        assert_eq!(Board::Pokemon.score(&player), 3);
        // Test species have hp 10, attack 20, defense 30.
        assert_eq!(Board::Power.score(&player), 180);
        assert_eq!(Board::Rarity.score(&player), 125 + 0 + 25);
    }

    #[test]
    fn standings_skip_zero_and_break_ties_by_id() {
        let empty = player_with(&[]);
        let one = player_with(&[(Rarity::Rare, 400)]);
        let two = player_with(&[(Rarity::Common, 200), (Rarity::Common, 200)]);
        let also_one = player_with(&[(Rarity::Common, 200)]);

        let players = [(40, &empty), (30, &one), (20, &two), (10, &also_one)];
        let board = standings(players, Board::Pokemon);
        let order: Vec<_> = board.iter().map(|s| (s.rank, s.user_id, s.score)).collect();
        assert_eq!(order, vec![(1, 20, 2), (2, 10, 1), (3, 30, 1)]);

        assert_eq!(rank_of(&board, 30).map(|s| s.rank), Some(3));
        assert_eq!(rank_of(&board, 40), None);

        let rarity = standings(players, Board::Rarity);
        assert_eq!(rarity.len(), 1);
        assert_eq!(rarity[0].user_id, 30);
    }

    #[test]
    fn badges_and_fallback_names() {
        assert_eq!(badge(1), "🥇");
        assert_eq!(badge(3), "🥉");
        assert_eq!(badge(4), "**4.**");
        assert_eq!(fallback_name(123456789012345678), "Player #5678");
        assert_eq!(fallback_name(42), "Player #42");
    }
}
