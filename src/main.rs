//! A Discord bot with greetings, dice, and a Pokemon catching game.

use poise::serenity_prelude as serenity;

mod commands;
mod data;
mod embeds;
mod error;
mod events;
mod format;
mod game;
mod greetings;
mod log;
mod setup;

pub use data::Data;
pub use error::LegionError;
pub use setup::Config;

/// Convenient type alias for [poise::Context].
pub type Context<'a> = poise::Context<'a, Data, LegionError>;

#[tokio::main]
async fn main() -> Result<(), LegionError> {
    let config = Config::read()?;

    // Keep the guard alive until shutdown so file logs get flushed.
    let _guard = log::install_tracing(&config);

    let mut client = setup::client(config).await?;
    client.start().await?;

    Ok(())
}
