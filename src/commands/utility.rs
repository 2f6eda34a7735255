//! Small commands about the bot itself.

use poise::CreateReply;
use serenity::CreateEmbed;
use serenity::CreateEmbedFooter;
use tracing::instrument;

use crate::format;
use crate::serenity;
use crate::Context;
use crate::LegionError;

const INFO_COLOR: u32 = 0x3498DB;

/// Check the bot's latency
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), LegionError> {
    let latency = ctx.ping().await.as_millis();
    ctx.say(format!("🏓 Pong! Latency: {latency}ms")).await?;
    Ok(())
}

/// How long the bot has been running
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn uptime(ctx: Context<'_>) -> Result<(), LegionError> {
    let uptime = format::uptime(ctx.data().uptime());
    ctx.say(format!("⏰ Bot uptime: {uptime}")).await?;
    Ok(())
}

/// Show information about the bot
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn info(ctx: Context<'_>) -> Result<(), LegionError> {
    let (guilds, users) = {
        let cache = ctx.cache();
        (cache.guild_count(), cache.user_count())
    };
    let latency = ctx.ping().await.as_millis();
    let uptime = format::uptime(ctx.data().uptime());
    let bot_id = ctx.framework().bot_id;

    let embed = CreateEmbed::new()
        .title("Legion Discord Bot")
        .description("A multilingual greeting bot with dice, coins and Pokemon")
        .color(INFO_COLOR)
        .field(
            "Bot Stats",
            format!("Servers: {guilds}\nUsers: {users}\nLatency: {latency}ms"),
            true,
        )
        .field(
            "Runtime",
            format!("Uptime: {uptime}\nPrefix: `{}`", ctx.data().prefix),
            true,
        )
        .footer(CreateEmbedFooter::new(format!("Bot ID: {bot_id}")));

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show help for all commands, or one command
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command, track_edits)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to explain"]
    #[rest]
    command: Option<String>,
) -> Result<(), LegionError> {
    let bottom = format!(
        "Say hi to me, or use {}help <command> for more about a command.",
        ctx.data().prefix
    );
    let config = poise::builtins::HelpConfiguration {
        extra_text_at_bottom: &bottom,
        ..Default::default()
    };

    poise::builtins::help(ctx, command.as_deref(), config).await?;
    Ok(())
}
