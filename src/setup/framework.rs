//! Setup for [poise::Framework]

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::commands;
use crate::data::GameStore;
use crate::data::SqliteStore;
use crate::events;
use crate::events::wild_spawn::Spawner;
use crate::game::Pokedex;
use crate::game::WildSpawnState;
use crate::serenity;
use crate::Config;
use crate::Data;
use crate::LegionError;

/// Convenient type alias, only this [poise::Framework] type is used.
type Framework = poise::Framework<Data, LegionError>;

/// Construct a [poise::Framework]
pub(super) fn framework(config: Config) -> Framework {
    poise::Framework::builder()
        .options(framework_options(&config))
        .setup(|ctx, rdy, fw| framework_setup(ctx, rdy, fw, config))
        .build()
}

/// Configure options for the [Framework]
fn framework_options(config: &Config) -> poise::FrameworkOptions<Data, LegionError> {
    poise::FrameworkOptions {
        // Add commands to the framework
        commands: commands::list(),
        // Handle framework errors
        on_error: |e| crate::log::handle_framework_error(e),
        // Log when commands start
        pre_command: |ctx| {
            Box::pin(async move {
                let cmd_name = &ctx.command().qualified_name;
                let user = &ctx.author().name;
                tracing::info!("Started '{cmd_name}' command from {user}.")
            })
        },
        // Log when finishing commands
        post_command: |ctx| {
            Box::pin(async move {
                let cmd_name = &ctx.command().qualified_name;
                let user = &ctx.author().name;
                tracing::info!("Finished '{cmd_name}' command from {user}.")
            })
        },
        // Greetings and mentions
        event_handler: |ctx, event, fw, data| {
            Box::pin(events::event_handler(ctx, event, fw, data))
        },
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(config.prefix().to_string()),
            // A bare mention is answered by the greeter instead.
            mention_as_prefix: false,
            case_insensitive_commands: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Construct future that runs on startup
fn framework_setup<'a>(
    ctx: &'a serenity::Context,
    rdy: &'a serenity::Ready,
    fw: &'a Framework,
    config: Config,
) -> poise::BoxFuture<'a, Result<Data, LegionError>> {
    Box::pin(async move {
        // Register the commands
        let commands = &commands::list();
        let app_commands = poise::builtins::create_application_commands(commands);

        serenity::Command::set_global_commands(&ctx, app_commands.clone()).await?;
        if let Some(dev_guild) = config.dev_guild() {
            // This is faster than global registers, useful for development.
            tracing::info!("Registering commands on dev guild.");
            dev_guild.set_commands(ctx, app_commands).await?;
        }

        let store = SqliteStore::open(config.database_path())?;
        tracing::info!("Opened database at {}.", config.database_path());

        let pokedex = Pokedex::load()?;
        tracing::info!("Loaded {} species into the pokedex.", pokedex.len());

        // A spawn channel changed at runtime outlives restarts.
        let wild = match store.load_wild().await? {
            Some(state) => state,
            None => WildSpawnState::with_channel(config.spawn_channel()),
        };
        tracing::info!("Wild Pokemon spawn in #{}.", wild.spawn_channel);

        let data = Data::builder()
            .notify_list(config.notify_list(fw))
            .admins(config.admins(fw))
            .prefix(config.prefix())
            .rules(config.rules())
            .pokedex(Arc::new(pokedex))
            .store(Arc::new(store))
            .wild(Arc::new(Mutex::new(wild)))
            .build();

        Spawner::new(&data).start(ctx.clone(), config.spawn_interval());

        // Simple message that logs when the bot has initialized
        let bot_name = &rdy.user.name;
        tracing::info!("{bot_name} is ready!");

        Ok(data)
    })
}
