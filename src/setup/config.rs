//! Configuration for running this bot.

use std::collections::HashSet;
use std::time::Duration;

use poise::Framework;
use serde::Deserialize;
use serde::Serialize;
use serenity::GuildId;
use serenity::UserId;

use crate::error::ConfigError;
use crate::game::wild::DEFAULT_SPAWN_CHANNEL;
use crate::game::Rules;
use crate::serenity;

/// The path to the config file
const CONFIG_PATH: &str = "config.toml";

/// Settings read from [CONFIG_PATH] that modify bot behavior.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Token needed to use a bot account.
    discord_token: String,

    /// See [BotConfig]
    bot: BotConfig,

    /// See [LoggingConfig]
    logging: LoggingConfig,

    /// See [PokemonConfig]
    pokemon: PokemonConfig,

    /// Useful developer specific configs.
    dev_utils: DevConfig,
}

impl Config {
    /// Tries to read [CONFIG_PATH] to extract a [Config].
    /// See [Config::parse] for the validation.
    /// If a file doesn't exists, create the default config file and returns error.
    /// If a file exists but is empty, re-write the default values and return error.
    /// If a file exists but is incomplete, show error and don't change files.
    /// If a file exists and is complete, read file to create a config.
    /// If file existance is indeterminent (e.g. missing permissions), return error.
    pub fn read() -> Result<Config, ConfigError> {
        let file = std::fs::read_to_string(CONFIG_PATH);

        match file {
            // Config file found
            Ok(content) => {
                // Write default values to file if it's empty.
                if content.trim().is_empty() {
                    write_file(Config::default())?;
                    Err(ConfigError::InvalidConfig {
                        reason: format!("Empty config file! Rewriting {CONFIG_PATH} ..."),
                    })
                } else {
                    Config::parse(&content)
                }
            }
            // File not found or other filesystem error
            Err(file_error) => {
                match file_error.kind() {
                    // If file doesn't exist, create default config file.
                    std::io::ErrorKind::NotFound => {
                        let action = format!("Creating {CONFIG_PATH}...");
                        write_file(Config::default())?;
                        Err(ConfigError::MissingConfig { action_msg: action })
                    }
                    // If we can't determine that config file exist: log error and use default settings (no file writes)
                    _ => Err(ConfigError::IoError(file_error)),
                }
            }
        }
    }

    /// Parses config text. If deserialization fails, the error names the offending key.
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        let to_toml = toml::Deserializer::new(content);
        let result: Result<Config, _> = serde_path_to_error::deserialize(to_toml);

        result.map_err(|error| ConfigError::InvalidConfig {
            reason: error.to_string(),
        })
    }

    /// Basic sanity check for if a token was given.
    pub fn token(&self) -> Result<&String, ConfigError> {
        let default_token = Config::default().discord_token;
        let given_token = &self.discord_token;

        let is_empty = given_token.is_empty();
        let contains_default = given_token.contains(&default_token);

        let sanity_check: bool = !is_empty && !contains_default;

        if sanity_check {
            Ok(&self.discord_token)
        } else {
            Err(ConfigError::InvalidConfig {
                reason: "Missing discord token".to_string(),
            })
        }
    }

    /// Construct a bug notification notify list based on the config.
    /// Wrapper for [NotifyConfig::notify_list]
    pub fn notify_list<U, E>(&self, fw: &Framework<U, E>) -> HashSet<UserId> {
        self.dev_utils.notifications.notify_list(fw)
    }

    /// Construct the set of users allowed to run admin commands.
    /// Wrapper for [PokemonConfig::admins]
    pub fn admins<U, E>(&self, fw: &Framework<U, E>) -> HashSet<UserId> {
        self.pokemon.admins(fw)
    }

    /// Prefix for text commands, e.g. `!`.
    pub fn prefix(&self) -> &str {
        &self.bot.prefix
    }

    /// Path of the SQLite database.
    pub fn database_path(&self) -> &str {
        &self.pokemon.database_path
    }

    /// Game rules. The encounter cooldown is clamped to 1..=60 minutes.
    pub fn rules(&self) -> Rules {
        Rules::new(
            self.pokemon.encounter_cooldown_minutes,
            self.pokemon.max_catches_per_hour,
        )
    }

    /// Time between wild spawns, at least one minute.
    pub fn spawn_interval(&self) -> Duration {
        let minutes = u64::from(self.pokemon.spawn_interval_minutes.max(1));
        Duration::from_secs(minutes * 60)
    }

    /// Name of the channel wild Pokemon spawn in, unless changed at runtime.
    pub fn spawn_channel(&self) -> &str {
        &self.pokemon.spawn_channel
    }

    /// Getter for log_dir.
    pub fn log_dir(&self) -> &str {
        &self.logging.log_dir
    }

    /// Is debug mode enabled for console logs
    pub fn console_debug(&self) -> bool {
        self.logging.console_debug
    }

    /// Is file logging enabled.
    pub fn logs_enabled(&self) -> bool {
        self.logging.logs_enabled
    }

    pub fn dev_guild(&self) -> Option<GuildId> {
        self.dev_utils.dev_guild
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: "put_token_here".to_string(),

            bot: BotConfig {
                prefix: "!".to_string(),
            },

            logging: LoggingConfig {
                console_debug: false,
                logs_enabled: true,
                log_dir: "logs".to_string(),
            },

            pokemon: PokemonConfig {
                database_path: "legion.db".to_string(),
                encounter_cooldown_minutes: 5,
                max_catches_per_hour: 5,
                spawn_interval_minutes: 30,
                spawn_channel: DEFAULT_SPAWN_CHANNEL.to_string(),
                admins: vec![],
                owners_are_admins: true,
            },

            dev_utils: DevConfig {
                dev_guild: None,
                notifications: NotifyConfig {
                    enabled: false,
                    add_owners: true,
                    userids: vec![],
                },
            },
        }
    }
}

/// Configs for chat behavior.
#[derive(Debug, Serialize, Deserialize)]
struct BotConfig {
    /// Prefix for text commands.
    prefix: String,
}

/// Configs for logging.
#[derive(Debug, Serialize, Deserialize)]
struct LoggingConfig {
    /// Print debug traces to console?
    console_debug: bool,
    /// Enable writing to log file?
    logs_enabled: bool,
    /// Directory to store log files
    log_dir: String,
}

/// Configs for the Pokemon game.
#[derive(Debug, Serialize, Deserialize)]
struct PokemonConfig {
    /// Where players and the wild spawn are saved.
    database_path: String,
    /// Minutes between personal encounters.
    encounter_cooldown_minutes: u32,
    /// Successful catches allowed per hour.
    max_catches_per_hour: usize,
    /// Minutes between wild spawns.
    spawn_interval_minutes: u32,
    /// Channel name wild Pokemon spawn in.
    spawn_channel: String,
    /// Users allowed to run `pokeadmin`.
    admins: Vec<UserId>,
    /// Whether bot owners may also run `pokeadmin`.
    owners_are_admins: bool,
}

impl PokemonConfig {
    /// Configured admins, plus the bot owners if enabled.
    fn admins<U, E>(&self, fw: &Framework<U, E>) -> HashSet<UserId> {
        let mut admins: HashSet<UserId> = self.admins.iter().copied().collect();
        if self.owners_are_admins {
            admins.extend(fw.options().owners.iter().copied());
        }
        admins
    }
}

/// Optional configs to enable developer-specific behavior.
#[derive(Debug, Serialize, Deserialize)]
struct DevConfig {
    /// Optional guild to automatically update commands quickly.
    #[serde(serialize_with = "serialize_opt", deserialize_with = "deserialize_opt")]
    dev_guild: Option<GuildId>,
    /// See [NotifyConfig]
    notifications: NotifyConfig,
}

/// Configs for notification behavior when encountering unexpected errors.
#[derive(Debug, Serialize, Deserialize)]
struct NotifyConfig {
    /// Enable this behavior or not. (bot sends a private message)
    enabled: bool,
    /// Whether to automatically add owners to the notify list.
    add_owners: bool,
    /// Additional users to add to the notify list.
    userids: Vec<UserId>,
}

impl NotifyConfig {
    /// Construct a bug notification notify list based on the config.
    fn notify_list<U, E>(&self, fw: &Framework<U, E>) -> HashSet<UserId> {
        let mut notify_list = HashSet::new();

        // If disabled, don't add anyone to the list.
        if !self.enabled {
            return notify_list;
        }

        // Add bot owners if enabled
        if self.add_owners {
            let owners = &fw.options().owners;
            for userid in owners {
                notify_list.insert(*userid);
            }
        }

        // Add users in config
        for userid in &self.userids {
            notify_list.insert(*userid);
        }

        notify_list
    }
}

/// Write the given config to [CONFIG_PATH].
fn write_file(config: Config) -> Result<(), ConfigError> {
    use std::fs::write;

    let content = toml::to_string_pretty(&config).map_err(|error| ConfigError::InvalidConfig {
        reason: error.to_string(),
    })?;
    write(CONFIG_PATH, content).map_err(ConfigError::IoError)
}

fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<GuildId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_str(OptVisitor)
}

fn serialize_opt<T, S>(val: &Option<T>, ser: S) -> Result<S::Ok, S::Error>
where
    T: serde::Serialize,
    S: serde::Serializer,
{
    match val {
        Some(v) => v.serialize(ser),
        None => ser.serialize_str(""),
    }
}

struct OptVisitor;

impl<'de> serde::de::Visitor<'de> for OptVisitor {
    type Value = Option<GuildId>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a valid guild id")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match v {
            "" => Ok(None),
            _ => {
                let num: u64 = v.parse().map_err(|_| E::custom("not u64"))?;
                Ok(Some(GuildId::new(num)))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_round_trips() {
        let content = toml::to_string_pretty(&Config::default()).unwrap();
        let config = Config::parse(&content).unwrap();

        assert_eq!(config.prefix(), "!");
        assert_eq!(config.database_path(), "legion.db");
        assert_eq!(config.spawn_channel(), "pokemon");
        assert_eq!(config.spawn_interval(), Duration::from_secs(30 * 60));
        assert_eq!(config.rules(), Rules::default());
        assert_eq!(config.dev_guild(), None);
        // The placeholder token is rejected.
        assert!(config.token().is_err());
    }

    #[test]
    fn missing_key_is_named() {
        let content = toml::to_string_pretty(&Config::default())
            .unwrap()
            .replace("spawn_channel = \"pokemon\"\n", "");

        let Err(ConfigError::InvalidConfig { reason }) = Config::parse(&content) else {
            panic!("config without spawn_channel parsed");
        };
        assert!(reason.contains("pokemon"), "{reason}");
    }

    #[test]
    fn cooldown_is_clamped_from_config() {
        let content = toml::to_string_pretty(&Config::default())
            .unwrap()
            .replace("encounter_cooldown_minutes = 5", "encounter_cooldown_minutes = 600")
            .replace("spawn_interval_minutes = 30", "spawn_interval_minutes = 0");
        let config = Config::parse(&content).unwrap();

        assert_eq!(config.rules().encounter_cooldown, chrono::TimeDelta::minutes(60));
        assert_eq!(config.spawn_interval(), Duration::from_secs(60));
    }
}
