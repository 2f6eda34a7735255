//! This module contains everything relating to [Data].

mod store;

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use chrono::Utc;
use serenity::UserId;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::game::Player;
use crate::game::Pokedex;
use crate::game::Rules;
use crate::game::WildSpawnState;
use crate::serenity;
use crate::Context;
use crate::LegionError;
pub use store::GameStore;
pub use store::SqliteStore;

/// Convenience type alias for a cached [Player].
pub type PlayerRef = Arc<Mutex<Player>>;

/// The data kept between shards
#[derive(bon::Builder)]
pub struct Data {
    /// List of users to send bug notifications
    #[builder(default)]
    pub notify_list: HashSet<UserId>,
    /// Users allowed to run admin commands
    #[builder(default)]
    pub admins: HashSet<UserId>,
    /// Prefix for text commands
    #[builder(into)]
    pub prefix: String,
    pub rules: Rules,
    pub pokedex: Arc<Pokedex>,
    pub store: Arc<dyn GameStore>,
    /// The shared wild spawn. Lock this before any player lock.
    pub wild: Arc<Mutex<WildSpawnState>>,
    /// Players loaded so far
    #[builder(skip)]
    players: Mutex<HashMap<UserId, PlayerRef>>,
    #[builder(skip = Instant::now())]
    started: Instant,
}

impl Data {
    /// Returns the cached player, loading it from the store (or creating it) on first use.
    pub async fn player(&self, user: UserId) -> Result<PlayerRef, StoreError> {
        let mut map = self.players.lock().await;
        if let Some(player) = map.get(&user) {
            return Ok(player.clone());
        }

        let player = match self.store.load_player(user).await? {
            Some(player) => player,
            None => {
                tracing::debug!("New trainer {user}.");
                Player::new(Utc::now())
            }
        };
        let player: PlayerRef = Arc::new(Mutex::new(player));
        map.insert(user, player.clone());
        Ok(player)
    }

    /// Applies `change` to a copy of the player and saves it.
    /// The cached player only changes once the save succeeded.
    pub async fn update_player<T, E>(
        &self,
        user: UserId,
        change: impl FnOnce(&mut Player) -> Result<T, E>,
    ) -> Result<T, LegionError>
    where
        LegionError: From<E>,
    {
        let player = self.player(user).await?;
        let mut player = player.lock().await;

        let mut next = player.clone();
        let value = change(&mut next)?;
        self.store.save_player(user, &next).await?;
        *player = next;
        Ok(value)
    }

    /// See [update_wild].
    pub async fn update_wild(
        &self,
        wild: &mut WildSpawnState,
        change: impl FnOnce(&mut WildSpawnState),
    ) -> Result<(), StoreError> {
        update_wild(self.store.as_ref(), wild, change).await
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Applies `change` to a copy of the locked wild state and saves it.
/// `wild` only changes once the save succeeded.
pub async fn update_wild(
    store: &dyn GameStore,
    wild: &mut WildSpawnState,
    change: impl FnOnce(&mut WildSpawnState),
) -> Result<(), StoreError> {
    let mut next = wild.clone();
    change(&mut next);
    store.save_wild(&next).await?;
    *wild = next;
    Ok(())
}

/// Is able to get a [Player].
pub trait GetData {
    /// Returns the command author's [Player].
    async fn author_player(&self) -> Result<PlayerRef, LegionError>;
    /// Returns any user's [Player].
    async fn player_of(&self, user: UserId) -> Result<PlayerRef, LegionError>;
}

impl GetData for Context<'_> {
    async fn author_player(&self) -> Result<PlayerRef, LegionError> {
        self.player_of(self.author().id).await
    }

    async fn player_of(&self, user: UserId) -> Result<PlayerRef, LegionError> {
        Ok(self.data().player(user).await?)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::error::UserError;
    use crate::game::Ball;

    /// A [Data] over an in-memory store and the built-in pokedex.
    pub(crate) fn data() -> Data {
        let store = SqliteStore::in_memory().unwrap();
        Data::builder()
            .prefix("!")
            .rules(Rules::default())
            .pokedex(Arc::new(Pokedex::load().unwrap()))
            .store(Arc::new(store))
            .wild(Default::default())
            .admins(HashSet::from([UserId::new(1)]))
            .build()
    }

    /// Loads nothing and refuses every write.
    struct ReadOnlyStore;

    #[async_trait::async_trait]
    impl GameStore for ReadOnlyStore {
        async fn load_player(&self, _user: UserId) -> Result<Option<Player>, StoreError> {
            Ok(None)
        }

        async fn save_player(&self, _user: UserId, _player: &Player) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }

        async fn all_players(&self) -> Result<Vec<(UserId, Player)>, StoreError> {
            Ok(Vec::new())
        }

        async fn load_wild(&self) -> Result<Option<WildSpawnState>, StoreError> {
            Ok(None)
        }

        async fn save_wild(&self, _state: &WildSpawnState) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    #[tokio::test]
    async fn players_are_cached_and_persisted() -> Result<(), LegionError> {
        let data = data();
        let ash = UserId::new(42);

        let first = data.player(ash).await?;
        let second = data.player(ash).await?;
        assert!(Arc::ptr_eq(&first, &second));
        assert!(data.store.load_player(ash).await?.is_none());

        let coins = data
            .update_player(ash, |player| {
                player.coins = 999;
                Ok::<_, LegionError>(player.coins)
            })
            .await?;
        assert_eq!(coins, 999);
        assert_eq!(first.lock().await.coins, 999);

        let stored = data.store.load_player(ash).await?.unwrap();
        assert_eq!(stored.coins, 999);
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_leaves_cached_player_unchanged() {
        let data = Data::builder()
            .prefix("!")
            .rules(Rules::default())
            .pokedex(Arc::new(Pokedex::load().unwrap()))
            .store(Arc::new(ReadOnlyStore))
            .wild(Default::default())
            .build();
        let ash = UserId::new(42);

        let result = data
            .update_player(ash, |player| player.buy(Ball::Poke, 1))
            .await;
        assert!(matches!(result, Err(LegionError::StoreError(_))));

        let player = data.player(ash).await.unwrap();
        let player = player.lock().await;
        assert_eq!(player.coins, 100);
        assert_eq!(player.inventory.count(Ball::Poke), 5);
    }

    #[tokio::test]
    async fn failed_wild_save_keeps_old_state() {
        let mut wild = WildSpawnState::with_channel("safari");
        let result = update_wild(&ReadOnlyStore, &mut wild, |w| w.set_channel("lounge")).await;
        assert!(result.is_err());
        assert_eq!(wild.spawn_channel, "safari");

        let store = SqliteStore::in_memory().unwrap();
        update_wild(&store, &mut wild, |w| w.set_channel("lounge"))
            .await
            .unwrap();
        assert_eq!(wild.spawn_channel, "lounge");
        assert_eq!(store.load_wild().await.unwrap(), Some(wild));
    }

    #[tokio::test]
    async fn refused_change_is_not_saved() -> Result<(), LegionError> {
        let data = data();
        let ash = UserId::new(7);

        let result = data
            .update_player(ash, |player| player.buy(Ball::Master, 1))
            .await;
        assert!(matches!(
            result,
            Err(LegionError::UserError(UserError::InsufficientFunds { .. }))
        ));
        assert!(data.store.load_player(ash).await?.is_none());
        Ok(())
    }

    #[test]
    fn admin_lookup() {
        let data = data();
        assert!(data.is_admin(UserId::new(1)));
        assert!(!data.is_admin(UserId::new(2)));
    }
}
