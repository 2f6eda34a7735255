//! Implements the catching commands: `encounter`, `catch`, `wildcatch` and `wildstatus`.
//!
//! Player and wild spawn changes go through [crate::Data::update_player] and
//! [crate::Data::update_wild], so a failed save changes nothing.
//! `wildcatch` locks the wild spawn before the player.

use chrono::Utc;
use poise::CreateReply;
use tracing::info;
use tracing::instrument;

use crate::embeds;
use crate::error::PokedexError;
use crate::error::UserError;
use crate::format;
use crate::game::catch::attempt_catch;
use crate::game::catch::attempt_wild_catch;
use crate::game::Ball;
use crate::Context;
use crate::LegionError;

/// Look for a wild Pokemon of your own
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("wild"))]
pub async fn encounter(ctx: Context<'_>) -> Result<(), LegionError> {
    let data = ctx.data();
    let now = Utc::now();

    let (species, inventory) = data
        .update_player(ctx.author().id, |player| {
            if let Some(wait) = player.encounter_cooldown_remaining(now, &data.rules) {
                return Err(LegionError::from(UserError::EncounterCooldown {
                    wait: format::minutes_seconds(wait),
                }));
            }

            let species = data
                .pokedex
                .random_weighted(&mut rand::thread_rng())
                .cloned()
                .ok_or(PokedexError::Empty)?;
            player.start_encounter(species.clone(), now);
            Ok((species, player.inventory.clone()))
        })
        .await?;

    info!(
        "{} encountered a {} {}.",
        ctx.author().name,
        species.rarity,
        species.name
    );
    let embed = embeds::encounter(&species, &inventory, &data.prefix);
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Throw a ball at your current encounter
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn catch(
    ctx: Context<'_>,
    #[description = "poke, great, ultra or master (default poke)"] ball: Option<String>,
) -> Result<(), LegionError> {
    let ball = match ball {
        Some(name) => name.parse()?,
        None => Ball::Poke,
    };
    let data = ctx.data();

    let (outcome, inventory) = data
        .update_player(ctx.author().id, |player| {
            let outcome =
                attempt_catch(player, ball, Utc::now(), &data.rules, &mut rand::thread_rng())?;
            Ok::<_, LegionError>((outcome, player.inventory.clone()))
        })
        .await?;

    let attempt = outcome.attempt();
    info!(
        "{} threw a {} at {} (roll {:.3} vs {:.3}): {}.",
        ctx.author().name,
        attempt.ball,
        attempt.species.name,
        attempt.roll,
        attempt.final_rate,
        if outcome.is_caught() { "caught" } else { "escaped" }
    );
    let embed = embeds::catch_result(&outcome, &inventory);
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Try to catch the wild Pokemon in the spawn channel
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn wildcatch(ctx: Context<'_>) -> Result<(), LegionError> {
    let data = ctx.data();
    let author = ctx.author();
    let now = Utc::now();
    let channel_name = ctx
        .guild()
        .and_then(|guild| {
            guild
                .channels
                .get(&ctx.channel_id())
                .map(|channel| channel.name.clone())
        });

    let mut wild = data.wild.lock().await;
    let species = wild.check_catch(
        author.id.get(),
        ctx.channel_id().get(),
        channel_name.as_deref(),
    )?;

    let outcome = data
        .update_player(author.id, |player| {
            attempt_wild_catch(player, &species, now, &data.rules, &mut rand::thread_rng())
        })
        .await?;

    let caught = outcome.is_caught();
    data.update_wild(&mut wild, |state| {
        state.record_attempt(author.id.get(), &author.name, caught, now);
        if caught {
            state.mark_caught(author.id.get(), &author.name, now);
        }
    })
    .await?;
    drop(wild);

    info!(
        "{} {} the wild {}.",
        author.name,
        if caught { "caught" } else { "missed" },
        species.name
    );
    let embed = embeds::wild_catch_result(&outcome, &author.name);
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// See whether a wild Pokemon is out there
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn wildstatus(ctx: Context<'_>) -> Result<(), LegionError> {
    let now = Utc::now();
    let embed = {
        let wild = ctx.data().wild.lock().await;
        embeds::wild_status(
            &wild.status(now),
            &wild.spawn_channel,
            wild.minutes_since_spawn(now),
        )
    };

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
