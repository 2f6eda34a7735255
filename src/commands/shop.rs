//! The PokéCoin economy: `shop`, `buy`, `daily` and `balance`.

use chrono::Utc;
use poise::CreateReply;
use serenity::CreateEmbed;
use serenity::CreateEmbedFooter;
use tracing::info;
use tracing::instrument;

use crate::data::GetData;
use crate::error::UserError;
use crate::format::thousands;
use crate::game::Ball;
use crate::serenity;
use crate::Context;
use crate::LegionError;

const SHOP_COLOR: u32 = 0x1ABC9C;
const COIN_COLOR: u32 = 0xF1C40F;

/// Browse the Poké Ball shop
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("store"))]
pub async fn shop(ctx: Context<'_>) -> Result<(), LegionError> {
    let coins = {
        let player = ctx.author_player().await?;
        let coins = player.lock().await.coins;
        coins
    };

    let embed = Ball::ALL.iter().fold(
        CreateEmbed::new()
            .title("🛒 Poké Ball Shop")
            .description(format!(
                "Your balance: **{} PokéCoins**",
                thousands(coins)
            ))
            .color(SHOP_COLOR)
            .footer(CreateEmbedFooter::new(format!(
                "Use {}buy <ball> [quantity] to purchase",
                ctx.data().prefix
            ))),
        |embed, ball| {
            let affordable = if coins >= ball.price() { "✅" } else { "❌" };
            embed.field(
                format!("{} {} {affordable}", ball.emoji(), ball.name()),
                format!(
                    "**Price:** {} PokéCoins\n{}\n`{}`",
                    thousands(ball.price()),
                    ball.description(),
                    ball.key()
                ),
                true,
            )
        },
    );

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Buy Poké Balls with PokéCoins
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("purchase"))]
pub async fn buy(
    ctx: Context<'_>,
    #[description = "poke, great, ultra or master"] ball: String,
    #[description = "How many (1-100, default 1)"] quantity: Option<u32>,
) -> Result<(), LegionError> {
    let ball: Ball = ball.parse()?;
    let quantity = quantity.unwrap_or(1);
    let author = ctx.author();

    let (cost, balance, owned) = ctx
        .data()
        .update_player(author.id, |player| {
            let cost = player.buy(ball, quantity)?;
            Ok::<_, UserError>((cost, player.coins, player.inventory.count(ball)))
        })
        .await?;
    info!("{} bought {quantity} {ball} for {cost} coins.", author.name);

    let embed = CreateEmbed::new()
        .title("🛍️ Purchase Complete")
        .description(format!(
            "Bought **{quantity}× {} {ball}** for {} PokéCoins.",
            ball.emoji(),
            thousands(cost)
        ))
        .color(SHOP_COLOR)
        .field("You now have", format!("{owned} {ball}s"), true)
        .field("Balance", format!("{} PokéCoins", thousands(balance)), true);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Claim your daily PokéCoins
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn daily(ctx: Context<'_>) -> Result<(), LegionError> {
    let author = ctx.author();

    let now = Utc::now();
    let (bonus, balance) = ctx
        .data()
        .update_player(author.id, |player| {
            let bonus = player.claim_daily(now)?;
            Ok::<_, UserError>((bonus, player.coins))
        })
        .await?;
    info!("{} claimed {bonus} daily coins.", author.name);

    let embed = CreateEmbed::new()
        .title("🎁 Daily Bonus")
        .description(format!(
            "You received **{bonus} PokéCoins**! Come back tomorrow for more."
        ))
        .color(COIN_COLOR)
        .field("Balance", format!("{} PokéCoins", thousands(balance)), true);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Check your PokéCoin balance
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, aliases("coins", "bal"))]
pub async fn balance(ctx: Context<'_>) -> Result<(), LegionError> {
    let coins = {
        let player = ctx.author_player().await?;
        let coins = player.lock().await.coins;
        coins
    };

    ctx.say(format!("💰 You have **{} PokéCoins**.", thousands(coins)))
        .await?;
    Ok(())
}
