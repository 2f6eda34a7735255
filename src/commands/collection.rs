//! Commands that show what a trainer owns: `collection`, `stats`, `inventory` and `pokeinfo`.

use chrono::Utc;
use itertools::Itertools;
use poise::CreateReply;
use serenity::CreateEmbed;
use serenity::User;
use tracing::instrument;

use crate::data::GetData;
use crate::embeds;
use crate::error::UserError;
use crate::game::Ball;
use crate::game::Pokedex;
use crate::game::Rarity;
use crate::game::Species;
use crate::serenity;
use crate::Context;
use crate::LegionError;

/// Names listed per rarity before the rest are summarized.
const NAMES_PER_TIER: usize = 10;

/// Suggestions offered for an unknown name.
const SUGGESTIONS: usize = 5;

const COLLECTION_COLOR: u32 = 0x3498DB;
const STATS_COLOR: u32 = 0x9B59B6;
const INVENTORY_COLOR: u32 = 0xE67E22;

/// View a trainer's Pokemon, rarest first
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("pokedex", "pokemon_list"))]
pub async fn collection(
    ctx: Context<'_>,
    #[description = "Whose collection (default: yours)"] user: Option<User>,
) -> Result<(), LegionError> {
    let user = user.as_ref().unwrap_or_else(|| ctx.author());

    let embed = {
        let player = ctx.player_of(user.id).await?;
        let player = player.lock().await;

        if player.collection.is_empty() {
            CreateEmbed::new()
                .title(format!("📖 {}'s Pokemon Collection", user.name))
                .description(format!(
                    "No Pokemon caught yet! Use `{}encounter` to find wild Pokemon.",
                    ctx.data().prefix
                ))
                .color(COLLECTION_COLOR)
        } else {
            let mut embed = CreateEmbed::new()
                .title(format!("📖 {}'s Pokemon Collection", user.name))
                .description(format!("{} Pokemon caught!", player.collection.len()))
                .color(COLLECTION_COLOR);

            for (rarity, caught) in player.collection_by_rarity() {
                let rarity = rarity.0;
                let names = caught.iter().map(|c| c.species.name.as_str()).collect_vec();
                embed = embed.field(
                    format!("{} {rarity} ({})", rarity.emoji(), names.len()),
                    tier_listing(&names),
                    true,
                );
            }
            embed
        }
    };

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Up to [NAMES_PER_TIER] names, then a count of the rest.
fn tier_listing(names: &[&str]) -> String {
    let shown = names.iter().take(NAMES_PER_TIER).join("\n");
    match names.len().checked_sub(NAMES_PER_TIER) {
        Some(rest) if rest > 0 => format!("{shown}\n... and {rest} more"),
        _ => shown,
    }
}

/// View your game statistics
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("pokemon_stats"))]
pub async fn stats(ctx: Context<'_>) -> Result<(), LegionError> {
    let rules = ctx.data().rules;
    let author = ctx.author();

    let embed = {
        let player = ctx.author_player().await?;
        let player = player.lock().await;
        let remaining = player.remaining_catches(Utc::now(), &rules);

        let balls = Ball::ALL
            .iter()
            .map(|ball| format!("{} {}", ball.emoji(), player.inventory.count(*ball)))
            .join("  ");
        let breakdown = Rarity::ALL
            .iter()
            .rev()
            .map(|rarity| {
                let count = player
                    .collection
                    .iter()
                    .filter(|c| c.species.rarity == *rarity)
                    .count();
                format!("{} {rarity}: {count}", rarity.emoji())
            })
            .join("\n");

        CreateEmbed::new()
            .title(format!("📊 {}'s Pokemon Stats", author.name))
            .color(STATS_COLOR)
            .field("🏆 Pokemon Caught", player.stats.total_caught.to_string(), true)
            .field(
                "👁️ Total Encounters",
                player.stats.total_encounters.to_string(),
                true,
            )
            .field(
                "🎯 Catch Rate",
                format!("{:.1}%", player.catch_rate_percent()),
                true,
            )
            .field("📅 Trainer Since", embeds::date(player.stats.join_date), true)
            .field("💰 PokéCoins", player.coins.to_string(), true)
            .field(
                "⏳ Catches Left This Hour",
                format!("{remaining}/{}", rules.max_catches_per_hour),
                true,
            )
            .field("⚾ Balls", balls, false)
            .field("✨ By Rarity", breakdown, false)
    };

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// View your Poké Balls and coins
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("inv", "bag"))]
pub async fn inventory(ctx: Context<'_>) -> Result<(), LegionError> {
    let author = ctx.author();

    let embed = {
        let player = ctx.author_player().await?;
        let player = player.lock().await;
        let inventory = &player.inventory;

        Ball::ALL
            .iter()
            .fold(
                CreateEmbed::new()
                    .title(format!("🎒 {}'s Inventory", author.name))
                    .color(INVENTORY_COLOR),
                |embed, ball| {
                    embed.field(
                        format!("{} {}", ball.emoji(), ball.name()),
                        inventory.count(*ball).to_string(),
                        true,
                    )
                },
            )
            .field("Total Balls", inventory.total().to_string(), true)
            .field("Total Value", format!("{} points", inventory.total_value()), true)
            .field("💰 PokéCoins", player.coins.to_string(), true)
    };

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Look up a species by name or number
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("dex"))]
pub async fn pokeinfo(
    ctx: Context<'_>,
    #[description = "Name, or dex number like #25"]
    #[rest]
    query: String,
) -> Result<(), LegionError> {
    let species = lookup(&ctx.data().pokedex, &query)?;
    let mut embed = embeds::species_card(species);

    {
        let player = ctx.author_player().await?;
        let player = player.lock().await;
        if let Some(caught) = player.find_caught(&species.name) {
            embed = embed.field(
                "In Your Collection",
                format!(
                    "#{} · caught with a {} on {}",
                    caught.collection_id,
                    caught.caught_with,
                    embeds::date(caught.caught_at)
                ),
                false,
            );
        }
    }

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Finds a species by `#id`, a bare number, or a name.
/// Unknown names come back with search suggestions.
fn lookup<'a>(pokedex: &'a Pokedex, query: &str) -> Result<&'a Species, UserError> {
    let query = query.trim();

    if let Ok(id) = query.trim_start_matches('#').parse::<u32>() {
        return pokedex.by_id(id).ok_or_else(|| UserError::UnknownPokemon {
            query: query.to_string(),
            suggestions: String::new(),
        });
    }

    pokedex.by_name(query).ok_or_else(|| {
        let matches = pokedex.search(query, SUGGESTIONS);
        let suggestions = if matches.is_empty() {
            String::new()
        } else {
            let names = matches.iter().map(|s| s.name.as_str()).join(", ");
            format!(" Did you mean: {names}?")
        };
        UserError::UnknownPokemon {
            query: query.to_string(),
            suggestions,
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_by_number_or_name() {
        let dex = Pokedex::load().unwrap();
        assert_eq!(lookup(&dex, "#25").unwrap().name, "Pikachu");
        assert_eq!(lookup(&dex, " 150 ").unwrap().name, "Mewtwo");
        assert_eq!(lookup(&dex, "charmander").unwrap().id, 4);
    }

    #[test]
    fn unknown_names_get_suggestions() {
        let dex = Pokedex::load().unwrap();

        let err = lookup(&dex, "char").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No Pokemon matches `char`. Did you mean: Charmander, Charmeleon, Charizard?"
        );

        let err = lookup(&dex, "#999").unwrap_err();
        assert_eq!(err.to_string(), "No Pokemon matches `#999`.");
    }

    #[test]
    fn long_tiers_are_summarized() {
        let names = ["Pidgey"; 13];
        let listing = tier_listing(&names);
        assert_eq!(listing.lines().count(), 11);
        assert!(listing.ends_with("... and 3 more"));

        assert_eq!(tier_listing(&["Mew", "Mewtwo"]), "Mew\nMewtwo");
    }
}
