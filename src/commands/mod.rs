//! Bot commands.

mod admin;
mod collection;
mod games;
mod greet;
mod leaderboard;
mod pokemon;
mod shop;
mod utility;

use crate::{Data, LegionError};

/// Convenient type alias for [poise::Command].
pub type Command = poise::Command<Data, LegionError>;

/// Lists all the implemented commands
pub fn list() -> Vec<Command> {
    vec![
        // Chat
        greet::greet(),
        greet::greetings(),
        games::flip(),
        games::roll(),
        utility::ping(),
        utility::uptime(),
        utility::info(),
        utility::help(),
        // Pokemon
        pokemon::encounter(),
        pokemon::catch(),
        pokemon::wildcatch(),
        pokemon::wildstatus(),
        collection::collection(),
        collection::stats(),
        collection::inventory(),
        collection::pokeinfo(),
        shop::shop(),
        shop::buy(),
        shop::daily(),
        shop::balance(),
        leaderboard::leaderboard(),
        admin::pokeadmin(),
    ]
}
