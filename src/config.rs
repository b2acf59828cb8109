//! Configuration management for the Psychosonus music bot.
//!
//! Configuration comes from environment variables. Before they are read,
//! [`load_env`] pulls in a `.env` file from the platform-specific local
//! data directory (`psychosonus/.env`) and from the working directory, so
//! the priority is:
//! 1. Environment variables (highest priority)
//! 2. `./.env`
//! 3. `<data_local_dir>/psychosonus/.env`
//! 4. Application defaults
//!
//! The values are parsed once into a typed [`Config`]. Parsing goes through
//! [`Config::from_lookup`] so tests can feed values without touching the
//! process environment.

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use crate::{error::ConfigError, types::GuildId};

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8888";
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100;
pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_GUILD_ID: &str = "local";
pub const DEFAULT_PLAYER_COMMAND: &str = "mpv --no-video --really-quiet";
pub const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DISCORD_API_URL: &str = "https://discord.com/api/v10";
pub const DISCORD_AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";
pub const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

/// Loads environment variables from `.env` files.
///
/// Creates `<data_local_dir>/psychosonus` if needed. Missing files are not
/// an error; variables that are already set are never overridden.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or a `.env`
/// file exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("psychosonus/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    // dotenv never overrides, so the working directory file goes first.
    for candidate in [PathBuf::from(".env"), path] {
        if candidate.is_file() {
            dotenv::from_path(&candidate).map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

/// Who may call the read-only endpoints of the web API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAccess {
    /// Anyone, logged in or not.
    Public,
    /// Only logged-in members of the target guild.
    Members,
}

impl FromStr for ReadAccess {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(ReadAccess::Public),
            "members" | "member" => Ok(ReadAccess::Members),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_url: String,
    pub authorize_url: String,
    pub token_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub max_queue_size: usize,
    pub command_prefix: String,
    pub default_guild: GuildId,
    /// Player program followed by its arguments; `-- <uri>` is appended.
    pub player_command: Vec<String>,
    pub ytdlp_path: String,
    pub spotify: Option<SpotifyConfig>,
    pub discord: Option<DiscordConfig>,
    pub session_secret: String,
    pub read_access: ReadAccess,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| is_configured(v));

        let server_addr = parse_or(&get, "SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)?;
        let max_queue_size: usize =
            parse_or(&get, "MAX_QUEUE_SIZE", &DEFAULT_MAX_QUEUE_SIZE.to_string())?;
        if max_queue_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_QUEUE_SIZE",
                value: "0".to_string(),
            });
        }

        let player_command: Vec<String> = get("PLAYER_COMMAND")
            .unwrap_or_else(|| DEFAULT_PLAYER_COMMAND.to_string())
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let read_access = match get("READ_ACCESS") {
            Some(value) => value
                .parse::<ReadAccess>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "READ_ACCESS",
                    value,
                })?,
            None => ReadAccess::Public,
        };

        let spotify = match (get("SPOTIFY_CLIENT_ID"), get("SPOTIFY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyConfig {
                client_id,
                client_secret,
                api_url: get("SPOTIFY_API_URL")
                    .unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
                token_url: get("SPOTIFY_API_TOKEN_URL")
                    .unwrap_or_else(|| DEFAULT_SPOTIFY_TOKEN_URL.to_string()),
            }),
            _ => None,
        };

        let discord = match (get("DISCORD_CLIENT_ID"), get("DISCORD_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(DiscordConfig {
                client_id,
                client_secret,
                redirect_uri: get("DISCORD_REDIRECT_URI")
                    .ok_or(ConfigError::Missing("DISCORD_REDIRECT_URI"))?,
                api_url: DISCORD_API_URL.to_string(),
                authorize_url: DISCORD_AUTHORIZE_URL.to_string(),
                token_url: DISCORD_TOKEN_URL.to_string(),
            }),
            _ => None,
        };

        let session_secret = match get("SESSION_SECRET") {
            Some(secret) => secret,
            None if discord.is_some() => return Err(ConfigError::Missing("SESSION_SECRET")),
            None => String::new(),
        };

        Ok(Self {
            server_addr,
            max_queue_size,
            command_prefix: get("COMMAND_PREFIX")
                .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string()),
            default_guild: GuildId::new(
                get("DEFAULT_GUILD_ID").unwrap_or_else(|| DEFAULT_GUILD_ID.to_string()),
            ),
            player_command,
            ytdlp_path: get("YTDLP_PATH").unwrap_or_else(|| DEFAULT_YTDLP_PATH.to_string()),
            spotify,
            discord,
            session_secret,
            read_access,
        })
    }

    pub fn auth_enabled(&self) -> bool {
        self.discord.is_some()
    }
}

/// Empty values and template placeholders count as unset.
fn is_configured(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.starts_with("YOUR_") && !value.ends_with("_GOES_HERE")
}

fn parse_or<T, F>(get: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let value = get(key).unwrap_or_else(|| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_addr, DEFAULT_SERVER_ADDRESS.parse().unwrap());
        assert_eq!(config.max_queue_size, 100);
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.player_command, vec!["mpv", "--no-video", "--really-quiet"]);
        assert_eq!(config.read_access, ReadAccess::Public);
        assert!(config.spotify.is_none());
        assert!(!config.auth_enabled());
    }

    #[test]
    fn placeholders_count_as_unset() {
        let config = config_from(&[
            ("SPOTIFY_CLIENT_ID", "SPOTIFY_CLIENT_ID_GOES_HERE"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
        ])
        .unwrap();
        assert!(config.spotify.is_none());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = config_from(&[("MAX_QUEUE_SIZE", "lots")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "MAX_QUEUE_SIZE",
                value: "lots".to_string()
            }
        );
        assert!(config_from(&[("MAX_QUEUE_SIZE", "0")]).is_err());
    }

    #[test]
    fn discord_requires_secret_and_redirect() {
        let err = config_from(&[
            ("DISCORD_CLIENT_ID", "id"),
            ("DISCORD_CLIENT_SECRET", "secret"),
            ("DISCORD_REDIRECT_URI", "http://localhost/auth/callback"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("SESSION_SECRET"));

        let config = config_from(&[
            ("DISCORD_CLIENT_ID", "id"),
            ("DISCORD_CLIENT_SECRET", "secret"),
            ("DISCORD_REDIRECT_URI", "http://localhost/auth/callback"),
            ("SESSION_SECRET", "s3cret"),
            ("READ_ACCESS", "members"),
        ])
        .unwrap();
        assert!(config.auth_enabled());
        assert_eq!(config.read_access, ReadAccess::Members);
    }
}
