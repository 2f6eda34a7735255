//! Implements `pokeadmin`, the game's admin tools.
//!
//! Only users in the admin set may run these; see [is_admin].

use std::collections::BTreeMap;

use itertools::Itertools;
use poise::CreateReply;
use serenity::CreateEmbed;
use serenity::User;
use tracing::info;
use tracing::instrument;

use crate::error::UserError;
use crate::events::wild_spawn::text_channels;
use crate::events::wild_spawn::Spawner;
use crate::format::thousands;
use crate::game::pokedex::PokedexStats;
use crate::game::wild::pick_spawn_channel;
use crate::game::Ball;
use crate::game::Pokedex;
use crate::game::Rarity;
use crate::serenity;
use crate::Context;
use crate::LegionError;

const ADMIN_COLOR: u32 = 0xE74C3C;

/// Refuses anyone outside the admin set.
async fn is_admin(ctx: Context<'_>) -> Result<bool, LegionError> {
    if ctx.data().is_admin(ctx.author().id) {
        Ok(true)
    } else {
        Err(UserError::NotAdmin.into())
    }
}

/// Pokemon game admin tools
#[poise::command(
    slash_command,
    prefix_command,
    check = "is_admin",
    subcommands(
        "stats",
        "giveballs",
        "givecoins",
        "spawn",
        "clearwild",
        "spawnchannel",
        "channels"
    ),
    subcommand_required
)]
pub async fn pokeadmin(_ctx: Context<'_>) -> Result<(), LegionError> {
    Ok(())
}

/// Pokedex and player totals
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, check = "is_admin")]
pub async fn stats(ctx: Context<'_>) -> Result<(), LegionError> {
    let data = ctx.data();
    let dex = data.pokedex.stats();
    let players = data.store.all_players().await?;

    let caught: u64 = players
        .iter()
        .map(|(_, p)| u64::from(p.stats.total_caught))
        .sum();
    let encounters: u64 = players
        .iter()
        .map(|(_, p)| u64::from(p.stats.total_encounters))
        .sum();

    let embed = CreateEmbed::new()
        .title("🔧 Pokemon Admin Stats")
        .color(ADMIN_COLOR)
        .field("Species", dex.total.to_string(), true)
        .field("Trainers", players.len().to_string(), true)
        .field("Total Caught", thousands(caught), true)
        .field("Total Encounters", thousands(encounters), true)
        .field("By Generation", generation_breakdown(&data.pokedex), false)
        .field("By Rarity", rarity_breakdown(&dex), false);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

fn generation_breakdown(pokedex: &Pokedex) -> String {
    pokedex
        .generations()
        .into_iter()
        .map(|generation| {
            let count = pokedex.by_generation(generation).len();
            format!(
                "Gen {generation}: {count} ({:.1}%)",
                share(count, pokedex.len())
            )
        })
        .join("\n")
}

fn rarity_breakdown(dex: &PokedexStats) -> String {
    let counts: &BTreeMap<Rarity, usize> = &dex.per_rarity;
    Rarity::ALL
        .iter()
        .map(|rarity| {
            let count = counts.get(rarity).copied().unwrap_or(0);
            format!(
                "{} {rarity}: {count} ({:.1}%)",
                rarity.emoji(),
                share(count, dex.total)
            )
        })
        .join("\n")
}

/// Give Poké Balls to a trainer
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, check = "is_admin")]
pub async fn giveballs(
    ctx: Context<'_>,
    #[description = "Who gets them"] user: User,
    #[description = "poke, great, ultra or master"] ball: String,
    #[description = "How many"] count: u32,
) -> Result<(), LegionError> {
    let ball: Ball = ball.parse()?;
    if count == 0 {
        Err(UserError::NotPositive)?
    }

    let now_owned = ctx
        .data()
        .update_player(user.id, |player| {
            player.inventory.add(ball, count);
            Ok::<_, LegionError>(player.inventory.count(ball))
        })
        .await?;
    info!(
        "{} gave {count} {ball} to {}.",
        ctx.author().name,
        user.name
    );

    ctx.say(format!(
        "Gave {count} {} {ball} to {}. They now have {now_owned}.",
        ball.emoji(),
        user.name
    ))
    .await?;
    Ok(())
}

/// Give PokéCoins to a trainer
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, check = "is_admin")]
pub async fn givecoins(
    ctx: Context<'_>,
    #[description = "Who gets them"] user: User,
    #[description = "How many PokéCoins"] amount: u64,
) -> Result<(), LegionError> {
    if amount == 0 {
        Err(UserError::NotPositive)?
    }

    let balance = ctx
        .data()
        .update_player(user.id, |player| Ok::<_, LegionError>(player.add_coins(amount)))
        .await?;
    info!(
        "{} gave {amount} coins to {}.",
        ctx.author().name,
        user.name
    );

    ctx.say(format!(
        "Gave {} PokéCoins to {}. Their balance is now {}.",
        thousands(amount),
        user.name,
        thousands(balance)
    ))
    .await?;
    Ok(())
}

/// Spawn a wild Pokemon right now
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, check = "is_admin")]
pub async fn spawn(ctx: Context<'_>) -> Result<(), LegionError> {
    let data = ctx.data();
    let report = Spawner::new(data).spawn(ctx.serenity_context()).await?;

    let Some(report) = report else {
        let channel = data.wild.lock().await.spawn_channel.clone();
        return Err(UserError::NoSpawnChannel { channel }.into());
    };

    ctx.say(format!(
        "Spawned a wild {} in <#{}> ({}).",
        report.species.name, report.channel_id, report.guild
    ))
    .await?;
    Ok(())
}

/// Remove the current wild Pokemon
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, check = "is_admin")]
pub async fn clearwild(ctx: Context<'_>) -> Result<(), LegionError> {
    let data = ctx.data();
    {
        let mut wild = data.wild.lock().await;
        data.update_wild(&mut wild, |state| state.clear()).await?;
    }
    info!("{} cleared the wild spawn.", ctx.author().name);

    ctx.say("Cleared the wild Pokemon.").await?;
    Ok(())
}

/// Change which channel wild Pokemon spawn in
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, check = "is_admin")]
pub async fn spawnchannel(
    ctx: Context<'_>,
    #[description = "Channel name, without #"] name: String,
) -> Result<(), LegionError> {
    let name = name.trim().trim_start_matches('#').to_string();
    if name.is_empty() {
        Err(UserError::BadArgs { input: None })?
    }

    let data = ctx.data();
    {
        let mut wild = data.wild.lock().await;
        data.update_wild(&mut wild, |state| state.set_channel(name.as_str()))
            .await?;
    }
    info!("{} moved wild spawns to #{name}.", ctx.author().name);

    ctx.say(format!("Wild Pokemon will now spawn in #{name}."))
        .await?;
    Ok(())
}

/// List text channels and which one wild Pokemon spawn in
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, check = "is_admin")]
pub async fn channels(ctx: Context<'_>) -> Result<(), LegionError> {
    let target = ctx.data().wild.lock().await.spawn_channel.clone();

    let mut embed = CreateEmbed::new()
        .title("📺 Text Channels")
        .description(format!("Wild Pokemon spawn in #{target}"))
        .color(ADMIN_COLOR);

    for guild in text_channels(ctx.cache()) {
        let spawn_here = pick_spawn_channel(
            guild.channels.iter().map(|(id, name)| (id.get(), name.as_str())),
            &target,
        );
        let listing = guild
            .channels
            .iter()
            .map(|(id, name)| {
                let mark = if spawn_here == Some(id.get()) { " ✅" } else { "" };
                format!("#{name}{mark}")
            })
            .join("\n");
        let listing = if listing.is_empty() {
            "No text channels".to_string()
        } else {
            listing
        };
        embed = embed.field(guild.name, listing, false);
    }

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn breakdowns_show_shares() {
        let pokedex = Pokedex::load().unwrap();
        assert_eq!(generation_breakdown(&pokedex), "Gen 1: 35 (100.0%)");

        let dex = pokedex.stats();
        let rarity = rarity_breakdown(&dex);
        assert_eq!(rarity.lines().count(), 4);
        assert!(rarity.starts_with("⚪ Common: 7 (20.0%)"), "{rarity}");
    }

    #[test]
    fn share_of_nothing_is_zero() {
        assert_eq!(share(0, 0), 0.0);
        assert_eq!(share(1, 4), 25.0);
    }
}
