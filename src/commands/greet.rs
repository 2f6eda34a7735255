//! Implements the `greet` and `greetings` commands.

use rand::seq::SliceRandom;
use serenity::Mentionable;
use tracing::instrument;

use crate::greetings;
use crate::serenity;
use crate::Context;
use crate::LegionError;

/// Say hello in a random language
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn greet(ctx: Context<'_>) -> Result<(), LegionError> {
    let greeting = {
        let mut rng = rand::thread_rng();
        greetings::GREETINGS.choose(&mut rng).copied().unwrap_or("Hello")
    };

    ctx.say(format!("{greeting} {}", ctx.author().mention()))
        .await?;
    Ok(())
}

/// List every greeting I know
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn greetings(ctx: Context<'_>) -> Result<(), LegionError> {
    for chunk in greetings::greeting_chunks() {
        ctx.say(chunk).await?;
    }
    Ok(())
}
