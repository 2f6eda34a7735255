//! Persistence for players and the wild spawn.
//!
//! Records are JSON documents keyed by user id, kept in SQLite.

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;
use rusqlite::Connection;
use rusqlite::OptionalExtension;

use crate::error::StoreError;
use crate::game::Player;
use crate::game::WildSpawnState;
use crate::serenity::UserId;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS players (
        user_id    INTEGER PRIMARY KEY,
        data       TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS wild_spawn (
        id   INTEGER PRIMARY KEY CHECK (id = 1),
        data TEXT NOT NULL
    );
";

/// Keyed storage for game state.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn load_player(&self, user: UserId) -> Result<Option<Player>, StoreError>;

    async fn save_player(&self, user: UserId, player: &Player) -> Result<(), StoreError>;

    /// Every stored player, in user id order.
    async fn all_players(&self) -> Result<Vec<(UserId, Player)>, StoreError>;

    /// The saved wild spawn state, or `None` if nothing was saved yet.
    async fn load_wild(&self) -> Result<Option<WildSpawnState>, StoreError>;

    async fn save_wild(&self, state: &WildSpawnState) -> Result<(), StoreError>;
}

/// [GameStore] backed by a single SQLite connection.
/// Internally uses an [Arc], so it's cheap to clone.
#[derive(Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let connection = Connection::open(path)?;
        connection.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        Self::with_connection(connection)
    }

    /// A throwaway database.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self, StoreError> {
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Runs `operation` on the blocking thread pool.
    async fn execute_blocking<F, T>(&self, operation: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.connection.clone();
        tokio::task::spawn_blocking(move || {
            let conn = connection.lock().map_err(|_| StoreError::Poisoned)?;
            operation(&conn)
        })
        .await?
    }
}

#[async_trait]
impl GameStore for SqliteStore {
    async fn load_player(&self, user: UserId) -> Result<Option<Player>, StoreError> {
        let id = user.get() as i64;
        let data: Option<String> = self
            .execute_blocking(move |conn| {
                let data = conn
                    .query_row(
                        "SELECT data FROM players WHERE user_id = ?1",
                        params![id],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(data)
            })
            .await?;

        data.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn save_player(&self, user: UserId, player: &Player) -> Result<(), StoreError> {
        let id = user.get() as i64;
        let data = serde_json::to_string(player)?;
        let updated_at = Utc::now().timestamp();

        self.execute_blocking(move |conn| {
            conn.execute(
                "INSERT INTO players (user_id, data, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
                params![id, data, updated_at],
            )?;
            Ok(())
        })
        .await
    }

    async fn all_players(&self) -> Result<Vec<(UserId, Player)>, StoreError> {
        let rows: Vec<(i64, String)> = self
            .execute_blocking(|conn| {
                let mut stmt = conn.prepare("SELECT user_id, data FROM players ORDER BY user_id")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter()
            .map(|(id, json)| {
                let player = serde_json::from_str(&json)?;
                Ok((UserId::new(id as u64), player))
            })
            .collect()
    }

    async fn load_wild(&self) -> Result<Option<WildSpawnState>, StoreError> {
        let data: Option<String> = self
            .execute_blocking(|conn| {
                let data = conn
                    .query_row("SELECT data FROM wild_spawn WHERE id = 1", [], |row| {
                        row.get::<_, String>(0)
                    })
                    .optional()?;
                Ok(data)
            })
            .await?;

        data.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn save_wild(&self, state: &WildSpawnState) -> Result<(), StoreError> {
        let data = serde_json::to_string(state)?;

        self.execute_blocking(move |conn| {
            conn.execute(
                "INSERT INTO wild_spawn (id, data) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data",
                params![data],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;
    use crate::game::pokedex::test::species;
    use crate::game::Rarity;

    #[tokio::test]
    async fn players_round_trip() -> Result<(), StoreError> {
        let store = SqliteStore::in_memory()?;
        let ash = UserId::new(10);
        let misty = UserId::new(20);
        assert!(store.load_player(ash).await?.is_none());

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut player = Player::new(now);
        player.start_encounter(species(25, "Pikachu", Rarity::Uncommon, 0.6), now);
        store.save_player(ash, &player).await?;

        player.coins = 5;
        store.save_player(ash, &player).await?;
        store.save_player(misty, &Player::new(now)).await?;

        let loaded = store.load_player(ash).await?.unwrap();
        assert_eq!(loaded, player);

        let all = store.all_players().await?;
        let ids: Vec<_> = all.iter().map(|(id, _)| id.get()).collect();
        assert_eq!(ids, vec![10, 20]);
        Ok(())
    }

    #[tokio::test]
    async fn wild_state_round_trips() -> Result<(), StoreError> {
        let store = SqliteStore::in_memory()?;
        assert!(store.load_wild().await?.is_none());

        let mut state = WildSpawnState::with_channel("safari");
        store.save_wild(&state).await?;
        state.set_channel("safari-zone");
        store.save_wild(&state).await?;

        assert_eq!(store.load_wild().await?, Some(state));
        Ok(())
    }
}
