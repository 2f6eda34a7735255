//! Implements `leaderboard` and its boards.
//!
//! Standings are computed from every saved player.

use futures::future::join_all;
use itertools::Itertools;
use poise::CreateReply;
use serenity::CreateEmbed;
use serenity::CreateEmbedFooter;
use serenity::User;
use serenity::UserId;
use tracing::instrument;

use crate::format::thousands;
use crate::game::leaderboard::badge;
use crate::game::leaderboard::fallback_name;
use crate::game::leaderboard::rank_of;
use crate::game::leaderboard::standings;
use crate::game::leaderboard::Board;
use crate::game::leaderboard::Standing;
use crate::game::leaderboard::TOP_N;
use crate::serenity;
use crate::Context;
use crate::LegionError;

const BOARD_COLOR: u32 = 0xFFD700;

/// See who the best trainers are
#[poise::command(
    slash_command,
    prefix_command,
    aliases("lb", "top"),
    subcommands("pokemon", "power", "rarity", "rank", "rankall"),
    subcommand_required
)]
pub async fn leaderboard(_ctx: Context<'_>) -> Result<(), LegionError> {
    Ok(())
}

/// Most Pokemon caught
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn pokemon(ctx: Context<'_>) -> Result<(), LegionError> {
    show_board(ctx, Board::Pokemon).await
}

/// Highest combined Attack + Defense + HP
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn power(ctx: Context<'_>) -> Result<(), LegionError> {
    show_board(ctx, Board::Power).await
}

/// Highest rarity score
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn rarity(ctx: Context<'_>) -> Result<(), LegionError> {
    show_board(ctx, Board::Rarity).await
}

/// Where a trainer stands on one board
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn rank(
    ctx: Context<'_>,
    #[description = "Which board"] board: Board,
    #[description = "Whose rank (default: yours)"] user: Option<User>,
) -> Result<(), LegionError> {
    let user = user.as_ref().unwrap_or_else(|| ctx.author());
    let standings = board_standings(ctx, board).await?;

    let embed = CreateEmbed::new()
        .title(format!("📈 {}'s Ranking", user.name))
        .color(BOARD_COLOR)
        .field(board.title(), rank_line(&standings, user.id, board), false);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Where a trainer stands on every board
#[instrument(skip(ctx))]
#[poise::command(slash_command, prefix_command)]
pub async fn rankall(
    ctx: Context<'_>,
    #[description = "Whose ranks (default: yours)"] user: Option<User>,
) -> Result<(), LegionError> {
    let user = user.as_ref().unwrap_or_else(|| ctx.author());

    let mut embed = CreateEmbed::new()
        .title(format!("📈 {}'s Rankings", user.name))
        .color(BOARD_COLOR);
    for board in Board::ALL {
        let standings = board_standings(ctx, board).await?;
        embed = embed.field(board.title(), rank_line(&standings, user.id, board), false);
    }

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Standings of every saved player on `board`.
async fn board_standings(ctx: Context<'_>, board: Board) -> Result<Vec<Standing>, LegionError> {
    let players = ctx.data().store.all_players().await?;
    Ok(standings(
        players.iter().map(|(id, player)| (id.get(), player)),
        board,
    ))
}

fn rank_line(standings: &[Standing], user: UserId, board: Board) -> String {
    match rank_of(standings, user.get()) {
        Some(standing) => format!(
            "#{} of {} · {} {}",
            standing.rank,
            standings.len(),
            thousands(standing.score),
            board.label()
        ),
        None => "Not ranked yet".to_string(),
    }
}

/// Shows the top of `board`, with the author's own standing in the footer.
async fn show_board(ctx: Context<'_>, board: Board) -> Result<(), LegionError> {
    let standings = board_standings(ctx, board).await?;
    let top = &standings[..standings.len().min(TOP_N)];

    // Fetch names concurrently. Users that can't be fetched get a placeholder.
    let names = join_all(top.iter().map(|standing| async move {
        match UserId::new(standing.user_id).to_user(ctx).await {
            Ok(user) => user.name,
            Err(_) => fallback_name(standing.user_id),
        }
    }))
    .await;

    let lines = top
        .iter()
        .zip(names)
        .map(|(standing, name)| {
            format!(
                "{} {name} · {} {}",
                badge(standing.rank),
                thousands(standing.score),
                board.label()
            )
        })
        .join("\n");
    let lines = if lines.is_empty() {
        "No trainers on this board yet!".to_string()
    } else {
        lines
    };

    let footer = rank_line(&standings, ctx.author().id, board);
    let embed = CreateEmbed::new()
        .title(board.title())
        .description(format!("*{}*\n\n{lines}", board.blurb()))
        .color(BOARD_COLOR)
        .footer(CreateEmbedFooter::new(format!("Your rank: {footer}")));

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn standing(rank: usize, user_id: u64, score: u64) -> Standing {
        Standing {
            rank,
            user_id,
            score,
        }
    }

    #[test]
    fn rank_lines() {
        let standings = vec![standing(1, 30, 1_200), standing(2, 10, 40)];

        assert_eq!(
            rank_line(&standings, UserId::new(30), Board::Power),
            "#1 of 2 · 1,200 Power"
        );
        assert_eq!(
            rank_line(&standings, UserId::new(10), Board::Rarity),
            "#2 of 2 · 40 Rarity Score"
        );
        assert_eq!(
            rank_line(&standings, UserId::new(99), Board::Pokemon),
            "Not ranked yet"
        );
    }
}
