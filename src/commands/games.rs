//! Implements the `flip` and `roll` mini-games.

use poise::CreateReply;
use tracing::instrument;

use crate::embeds;
use crate::game::dice::Coin;
use crate::game::dice::DiceRoll;
use crate::Context;
use crate::LegionError;

/// Flip a coin and get heads or tails
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("coin", "coinflip"))]
pub async fn flip(ctx: Context<'_>) -> Result<(), LegionError> {
    let side = Coin::flip(&mut rand::thread_rng());

    ctx.send(CreateReply::default().embed(embeds::coin(side)))
        .await?;
    Ok(())
}

/// Roll dice with standard notation (e.g. 1d6, 2d20, 3d8)
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("dice", "r"))]
pub async fn roll(
    ctx: Context<'_>,
    #[description = "Dice notation such as 2d20 (default 1d6)"] dice: Option<String>,
) -> Result<(), LegionError> {
    let roll: DiceRoll = match dice {
        Some(notation) => notation.parse()?,
        None => DiceRoll::default(),
    };
    let outcome = roll.roll(&mut rand::thread_rng());
    tracing::debug!("Rolled {roll}: {:?}", outcome.rolls);

    ctx.send(CreateReply::default().embed(embeds::dice(roll, &outcome)))
        .await?;
    Ok(())
}
