//! Embeds shared by commands and the spawn loop.

use chrono::DateTime;
use chrono::Utc;
use itertools::Itertools;
use serenity::ChannelId;
use serenity::CreateEmbed;
use serenity::CreateEmbedFooter;
use serenity::Mentionable;

use crate::game::catch::CatchOutcome;
use crate::game::dice::Coin;
use crate::game::dice::DiceRoll;
use crate::game::dice::RollOutcome;
use crate::game::player::Inventory;
use crate::game::wild::WildStatus;
use crate::game::Ball;
use crate::game::Species;
use crate::serenity;

const CAUGHT_COLOR: u32 = 0x2ECC71;
const ESCAPED_COLOR: u32 = 0xE74C3C;
const WILD_COLOR: u32 = 0xF1C40F;
const DICE_COLOR: u32 = 0xFF6B6B;
const EMPTY_COLOR: u32 = 0x95A5A6;

/// One line per ball kind, e.g. "⚪ Poké Ball: 5".
pub fn ball_counts(inventory: &Inventory) -> String {
    Ball::ALL
        .iter()
        .map(|ball| format!("{} {}: {}", ball.emoji(), ball.name(), inventory.count(*ball)))
        .join("\n")
}

fn percent(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

/// Full catalogue entry for `pokeinfo`.
pub fn species_card(species: &Species) -> CreateEmbed {
    let stats = &species.stats;
    let stat_block = format!(
        "HP: {}\nAttack: {}\nDefense: {}\nSp. Atk: {}\nSp. Def: {}\nSpeed: {}\n**Total: {}**",
        stats.hp,
        stats.attack,
        stats.defense,
        stats.sp_attack,
        stats.sp_defense,
        stats.speed,
        stats.total
    );

    CreateEmbed::new()
        .title(format!("#{:03} {}", species.id, species.name))
        .description(&species.description)
        .color(species.color())
        .field("Type", species.type_line(), true)
        .field(
            "Rarity",
            format!("{} {}", species.rarity.emoji(), species.rarity),
            true,
        )
        .field("Catch Rate", percent(species.catch_rate), true)
        .field("Generation", species.generation.to_string(), true)
        .field("Base Stats", stat_block, false)
        .image(species.image_url())
}

/// A freshly drawn personal encounter.
pub fn encounter(species: &Species, inventory: &Inventory, prefix: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("A wild {} appeared!", species.name))
        .description(format!(
            "{} **{}** Pokemon\nType: {}\nBase catch rate: {}",
            species.rarity.emoji(),
            species.rarity,
            species.type_line(),
            percent(species.catch_rate)
        ))
        .color(species.color())
        .thumbnail(species.image_url())
        .field("Your Poké Balls", ball_counts(inventory), false)
        .footer(CreateEmbedFooter::new(format!(
            "Use {prefix}catch [ball] to throw a ball. You only get one throw!"
        )))
}

/// Result of `catch`.
pub fn catch_result(outcome: &CatchOutcome, inventory: &Inventory) -> CreateEmbed {
    let attempt = outcome.attempt();
    let species = &attempt.species;
    let odds = format!(
        "{} {} · base {} → {}",
        attempt.ball.emoji(),
        attempt.ball,
        percent(attempt.base_rate),
        percent(attempt.final_rate)
    );

    let embed = match outcome {
        CatchOutcome::Caught { collection_id, .. } => CreateEmbed::new()
            .title(format!("Gotcha! {} was caught!", species.name))
            .description(format!(
                "{} {} added to your collection as #{collection_id}.",
                species.rarity.emoji(),
                species.name
            ))
            .color(CAUGHT_COLOR),
        CatchOutcome::Escaped { .. } => CreateEmbed::new()
            .title(format!("Oh no! {} broke free!", species.name))
            .description("It fled before you could throw another ball.")
            .color(ESCAPED_COLOR),
    };

    embed
        .thumbnail(species.sprite_url())
        .field("Throw", odds, false)
        .field("Balls Left", ball_counts(inventory), false)
}

/// Announcement posted by the spawn loop.
pub fn wild_spawn(species: &Species, prefix: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("🌿 A wild {} appeared!", species.name))
        .description(format!(
            "{} **{}** · {}\nFirst trainer to catch it keeps it. One Poké Ball throw each!",
            species.rarity.emoji(),
            species.rarity,
            species.type_line()
        ))
        .color(WILD_COLOR)
        .image(species.image_url())
        .footer(CreateEmbedFooter::new(format!(
            "Use {prefix}wildcatch in this channel"
        )))
}

/// Result of `wildcatch`.
pub fn wild_catch_result(outcome: &CatchOutcome, trainer: &str) -> CreateEmbed {
    let attempt = outcome.attempt();
    let species = &attempt.species;

    let embed = if outcome.is_caught() {
        CreateEmbed::new()
            .title(format!("🎉 {trainer} caught the wild {}!", species.name))
            .description("This one is gone until the next spawn.")
            .color(CAUGHT_COLOR)
    } else {
        CreateEmbed::new()
            .title(format!("{} escaped from {trainer}!", species.name))
            .description("It's still out there for everyone else.")
            .color(ESCAPED_COLOR)
    };

    embed
        .thumbnail(species.sprite_url())
        .field("Catch Rate", percent(attempt.final_rate), true)
}

/// Current state of the wild spawn.
pub fn wild_status(
    status: &WildStatus,
    spawn_channel: &str,
    minutes_since_spawn: Option<i64>,
) -> CreateEmbed {
    let last_spawn = match minutes_since_spawn {
        Some(minutes) => format!("{minutes} minutes ago"),
        None => "never".to_string(),
    };

    let embed = match status {
        WildStatus::Available {
            species,
            minutes_available,
            channel_id,
        } => CreateEmbed::new()
            .title(format!("A wild {} is waiting!", species.name))
            .description(format!(
                "{} **{}** · available for {minutes_available} minutes in {}",
                species.rarity.emoji(),
                species.rarity,
                ChannelId::new(*channel_id).mention()
            ))
            .color(WILD_COLOR)
            .thumbnail(species.sprite_url()),
        WildStatus::Caught { by } => CreateEmbed::new()
            .title("The wild Pokemon was caught")
            .description(format!(
                "{} got it at {}. Wait for the next spawn!",
                by.username,
                by.caught_at.format("%H:%M UTC")
            ))
            .color(CAUGHT_COLOR),
        WildStatus::Empty => CreateEmbed::new()
            .title("No wild Pokemon right now")
            .description("Wait for the next spawn!")
            .color(EMPTY_COLOR),
    };

    embed
        .field("Spawn Channel", format!("#{spawn_channel}"), true)
        .field("Last Spawn", last_spawn, true)
}

pub fn coin(side: Coin) -> CreateEmbed {
    CreateEmbed::new()
        .title(":coin: Coin Flip")
        .color(side.color())
        .field("Result", format!("**{}**", side.shout()), false)
}

pub fn dice(roll: DiceRoll, outcome: &RollOutcome) -> CreateEmbed {
    let rolls = outcome.rolls.iter().join(", ");
    let mut embed = CreateEmbed::new().color(DICE_COLOR).field(
        format!("{} Rolling {roll}", roll.emoji()),
        format!("Rolls: {rolls}\n**Total: {}**", outcome.total),
        false,
    );

    if let Some(flair) = roll.flair(outcome) {
        embed = embed.field(flair.title(), roll.flair_text(flair), false);
    }
    embed
}

/// "Trainer since" line.
pub fn date(at: DateTime<Utc>) -> String {
    at.format("%B %d, %Y").to_string()
}

#[cfg(test)]
mod test {
    use serde_json::Value;

    use super::*;
    use crate::game::pokedex::test::species;
    use crate::game::Rarity;

    fn json(embed: CreateEmbed) -> Value {
        serde_json::to_value(embed).unwrap()
    }

    #[test]
    fn ball_counts_list_every_ball() {
        let lines = ball_counts(&Inventory::default());
        assert_eq!(lines.lines().count(), 4);
        assert!(lines.starts_with("⚪ Poké Ball: 5"));
        assert!(lines.ends_with("🟣 Master Ball: 0"));
    }

    #[test]
    fn species_card_uses_type_color() {
        let embed = json(species_card(&species(25, "Pikachu", Rarity::Uncommon, 0.6)));
        assert_eq!(embed["title"], "#025 Pikachu");
        assert_eq!(embed["color"], 0xA8A878);
        assert_eq!(embed["fields"][2]["value"], "60%");
    }

    #[test]
    fn coin_embed() {
        let embed = json(coin(Coin::Heads));
        assert_eq!(embed["title"], ":coin: Coin Flip");
        assert_eq!(embed["color"], 0xFFD700);
        assert_eq!(embed["fields"][0]["name"], "Result");
    }

    #[test]
    fn dice_embed_has_flair_field() {
        let roll = DiceRoll { count: 1, sides: 20 };
        let outcome = RollOutcome {
            rolls: vec![20],
            total: 20,
        };
        let embed = json(dice(roll, &outcome));
        assert_eq!(embed["fields"][0]["name"], ":dart: Rolling 1d20");
        assert_eq!(embed["fields"][1]["name"], ":star: Critical Success!");
    }
}
