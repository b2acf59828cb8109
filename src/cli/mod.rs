//! # CLI Module
//!
//! Command implementations behind the `psychosonus` binary.
//!
//! ## Commands
//!
//! - [`serve`] - runs the bot: session registry, web dashboard and an
//!   interactive console that accepts the same prefix commands as chat
//! - [`search`] - one-off search printed as a table, useful for checking
//!   provider credentials and the `yt-dlp` install
//!
//! ## Output
//!
//! User-facing messages go through the colored `info!`, `success!`,
//! `warning!` and `error!` macros on stdout; `error!` exits with status 1.
//! Service logs go through `tracing` on stderr.
//!
//! ## Usage Patterns
//!
//! ```bash
//! psychosonus serve                       # dashboard + console on the default guild
//! psychosonus serve --guild 1234 --no-console
//! psychosonus search daft punk around the world
//! psychosonus search --youtube lofi beats
//! ```

mod search;
mod serve;

pub use search::search;
pub use serve::serve;

use std::sync::Arc;

use crate::{
    config::Config,
    error,
    search::{SearchProvider, SearchService},
    spotify::SpotifyProvider,
    youtube::YoutubeProvider,
};

/// Reads the typed configuration, exiting on invalid values.
pub fn load_config() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    }
}

/// YouTube is always available; Spotify only with credentials.
pub fn build_search_service(config: &Config) -> SearchService {
    let spotify = config
        .spotify
        .clone()
        .map(|c| Arc::new(SpotifyProvider::new(c)) as Arc<dyn SearchProvider>);
    let youtube: Arc<dyn SearchProvider> = Arc::new(YoutubeProvider::new(&config.ytdlp_path));

    SearchService::new(spotify, youtube)
}
