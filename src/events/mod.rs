//! Gateway event handling and background tasks.

pub mod wild_spawn;

use rand::seq::SliceRandom;
use serenity::FullEvent;
use serenity::Mentionable;
use serenity::Message;

use crate::greetings;
use crate::greetings::Reaction;
use crate::serenity;
use crate::Data;
use crate::LegionError;

/// Handles events that aren't commands.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, LegionError>,
    _data: &Data,
) -> Result<(), LegionError> {
    if let FullEvent::Message { new_message } = event {
        on_message(ctx, new_message).await?;
    }
    Ok(())
}

/// Answers greetings and bare mentions.
async fn on_message(ctx: &serenity::Context, message: &Message) -> Result<(), LegionError> {
    let bot_id = ctx.cache.current_user().id;
    if message.author.id == bot_id {
        return Ok(());
    }

    let mentions_bot = message.mentions_user_id(bot_id);
    let Some(reaction) = greetings::reaction(&message.content, bot_id.get(), mentions_bot) else {
        return Ok(());
    };

    let phrase = {
        let mut rng = rand::thread_rng();
        let table: &[&str] = match reaction {
            Reaction::Help => &greetings::HELP_MESSAGES,
            Reaction::Greet => &greetings::GREETINGS,
        };
        table.choose(&mut rng).copied().unwrap_or("Hello")
    };

    tracing::debug!("Answering {reaction:?} from {}.", message.author.name);
    let reply = format!("{phrase} {}!", message.author.mention());
    message.channel_id.say(ctx, reply).await?;
    Ok(())
}
