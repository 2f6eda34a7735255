//! Error types for the bot.
//!
//! [LegionError] is returned by every command. [UserError] is reserved for
//! mistakes a user can fix: its message is shown to them as-is.

use std::time::Duration;

use thiserror::Error;

use crate::game::catch::CatchRefusal;
use crate::serenity;

#[derive(Debug, Error)]
pub enum LegionError {
    #[error(transparent)]
    UserError(#[from] UserError),

    #[error(transparent)]
    ConfigError(#[from] ConfigError),

    #[error(transparent)]
    StoreError(#[from] StoreError),

    #[error(transparent)]
    PokedexError(#[from] PokedexError),

    #[error("Serenity error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("A command check failed: {reason:?}")]
    CheckFailed { reason: Option<String> },

    #[error("A command panicked: {payload:?}")]
    Panic { payload: Option<String> },

    #[error("Command structure mismatch: {description}")]
    CommandStructureMismatch { description: String },
}

impl From<CatchRefusal> for LegionError {
    fn from(refusal: CatchRefusal) -> Self {
        LegionError::UserError(refusal.into())
    }
}

/// Errors caused by user input. The message is the reply.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("This command needs one of these subcommands: {subcmds}")]
    MissingSubcommand { subcmds: String },

    #[error("Couldn't understand `{}`. Check the command's arguments.", input.as_deref().unwrap_or(""))]
    BadArgs { input: Option<String> },

    #[error("Slow down! Try again in {:.1}s.", remaining_cooldown.as_secs_f32())]
    OnCooldown { remaining_cooldown: Duration },

    #[error("I need these permissions to do that: {missing_permissions}")]
    MissingBotPermissions {
        missing_permissions: serenity::Permissions,
    },

    #[error("You don't have permission to do that.")]
    MissingUserPermissions {
        missing_permissions: Option<serenity::Permissions>,
    },

    #[error("Only the bot owner can use this command.")]
    NotOwner,

    #[error("This command only works in a server.")]
    GuildOnly,

    #[error("This command only works in DMs.")]
    DmOnly,

    #[error("This command only works in NSFW channels.")]
    NsfwOnly,

    #[error("You don't have permission to use admin commands.")]
    NotAdmin,

    #[error("{reason}")]
    InvalidDice { reason: String },

    #[error("Unknown ball `{input}`. Valid ball types are: poke, great, ultra, master.")]
    UnknownBall { input: String },

    #[error("No Pokemon matches `{query}`.{suggestions}")]
    UnknownPokemon { query: String, suggestions: String },

    #[error("Quantity must be between 1 and {max}.")]
    InvalidQuantity { max: u32 },

    #[error("Amount must be a positive number.")]
    NotPositive,

    #[error("That costs {cost} PokéCoins but you only have {balance}.")]
    InsufficientFunds { cost: u64, balance: u64 },

    #[error("You already claimed your daily bonus. Come back in {wait}.")]
    DailyAlreadyClaimed { wait: String },

    #[error("Please wait {wait} before your next encounter.")]
    EncounterCooldown { wait: String },

    #[error("Wild Pokemon can only be caught in #{channel}!")]
    WrongChannel { channel: String },

    #[error("There's no wild Pokemon to catch right now. Wait for the next spawn!")]
    NoWildPokemon,

    #[error("You already tried to catch this wild Pokemon. Wait for the next spawn!")]
    WildAlreadyAttempted,

    #[error("No text channel named #{channel} was found in any server.")]
    NoSpawnChannel { channel: String },

    #[error(transparent)]
    Catch(#[from] CatchRefusal),
}

/// Problems with `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found. {action_msg}")]
    MissingConfig { action_msg: String },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Couldn't access config file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failures of the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Stored document is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Database connection lock was poisoned")]
    Poisoned,
}

/// Problems with the built-in species catalogue.
#[derive(Debug, Error)]
pub enum PokedexError {
    #[error("Couldn't parse the pokedex: {reason}")]
    Parse { reason: String },

    #[error("The pokedex has no species")]
    Empty,

    #[error("Species id {id} appears more than once")]
    DuplicateId { id: u32 },

    #[error("{name} has an impossible catch rate of {rate}")]
    BadCatchRate { name: String, rate: f64 },
}
