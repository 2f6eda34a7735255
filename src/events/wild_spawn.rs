//! Periodically posts a wild Pokemon to the spawn channel.

use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serenity::ChannelId;
use serenity::ChannelType;
use serenity::CreateMessage;
use serenity::GuildId;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::data::update_wild;
use crate::data::GameStore;
use crate::embeds;
use crate::game::wild::pick_spawn_channel;
use crate::game::wild::should_warn;
use crate::game::Pokedex;
use crate::game::Species;
use crate::game::WildSpawnState;
use crate::serenity;
use crate::Data;
use crate::LegionError;

/// The text channels of one guild, in display order.
#[derive(Debug, Clone)]
pub struct GuildChannels {
    pub guild_id: GuildId,
    pub name: String,
    pub channels: Vec<(ChannelId, String)>,
}

/// Lists the text channels of every cached guild.
pub fn text_channels(cache: &serenity::Cache) -> Vec<GuildChannels> {
    cache
        .guilds()
        .into_iter()
        .filter_map(|guild_id| {
            // Don't hold the guild reference longer than needed.
            let guild = cache.guild(guild_id)?;
            let mut channels: Vec<_> = guild
                .channels
                .values()
                .filter(|channel| channel.kind == ChannelType::Text)
                .map(|channel| (channel.position, channel.id, channel.name.clone()))
                .collect();
            channels.sort();

            Some(GuildChannels {
                guild_id,
                name: guild.name.clone(),
                channels: channels
                    .into_iter()
                    .map(|(_, id, name)| (id, name))
                    .collect(),
            })
        })
        .collect()
}

/// Where and what was spawned.
#[derive(Debug, Clone)]
pub struct SpawnReport {
    pub species: Species,
    pub channel_id: ChannelId,
    pub guild: String,
}

/// Spawns wild Pokemon. Cheap to clone.
#[derive(Clone)]
pub struct Spawner {
    pokedex: Arc<Pokedex>,
    store: Arc<dyn GameStore>,
    state: Arc<Mutex<WildSpawnState>>,
    prefix: String,
    /// Consecutive spawns that found no channel.
    misses: Arc<AtomicU32>,
}

impl Spawner {
    pub fn new(data: &Data) -> Self {
        Self {
            pokedex: data.pokedex.clone(),
            store: data.store.clone(),
            state: data.wild.clone(),
            prefix: data.prefix.clone(),
            misses: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Runs [Spawner::spawn] every `every`, starting one period from now.
    pub fn start(self, ctx: serenity::Context, every: Duration) {
        info!("Wild spawns every {} minutes.", every.as_secs() / 60);

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + every;
            let mut interval = tokio::time::interval_at(start, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if let Err(e) = self.spawn(&ctx).await {
                    error!("Wild spawn failed. {e}");
                }
            }
        });
    }

    /// Posts a new wild Pokemon in the first guild that has the spawn channel.
    /// Returns `None` if no channel or species was available.
    ///
    /// The state only records the spawn once the post went through.
    pub async fn spawn(&self, ctx: &serenity::Context) -> Result<Option<SpawnReport>, LegionError> {
        let target = self.state.lock().await.spawn_channel.clone();

        let found = text_channels(&ctx.cache).into_iter().find_map(|guild| {
            let candidates = guild
                .channels
                .iter()
                .map(|(id, name)| (id.get(), name.as_str()));
            pick_spawn_channel(candidates, &target).map(|id| (guild.name.clone(), ChannelId::new(id)))
        });

        let Some((guild, channel_id)) = found else {
            let misses = self.misses.fetch_add(1, Ordering::Relaxed) + 1;
            if should_warn(misses) {
                warn!("Spawn channel #{target} not found in any guild (attempt {misses}).");
            }
            return Ok(None);
        };
        self.misses.store(0, Ordering::Relaxed);

        let Some(species) = self.pokedex.random_wild(&mut rand::thread_rng()).cloned() else {
            warn!("No Common or Uncommon species to spawn.");
            return Ok(None);
        };

        let message = CreateMessage::new().embed(embeds::wild_spawn(&species, &self.prefix));
        channel_id.send_message(ctx, message).await?;

        {
            let mut state = self.state.lock().await;
            let spawned = species.clone();
            update_wild(self.store.as_ref(), &mut state, |state| {
                state.spawn(spawned, channel_id.get(), Utc::now())
            })
            .await?;
        }
        info!("A wild {} appeared in #{target} ({guild}).", species.name);

        Ok(Some(SpawnReport {
            species,
            channel_id,
            guild,
        }))
    }
}
