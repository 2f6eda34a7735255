//! Builds the client, the framework and the shared [Data](crate::Data).

mod config;
mod framework;

use crate::serenity;
use crate::LegionError;

pub use config::Config;

/// Constructs a [serenity::Client] running the bot's [poise::Framework].
pub(super) async fn client(config: Config) -> Result<serenity::Client, LegionError> {
    // Get discord token from config file
    let token = config.token()?.clone();

    // Intents we wish to use
    // Message content is privileged, but greetings and prefix commands read it.
    // See https://discord.com/developers/docs/topics/gateway#gateway-intents
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let client = serenity::ClientBuilder::new(token, intents)
        .framework(framework::framework(config))
        .await?;

    Ok(client)
}
