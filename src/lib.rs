//! Psychosonus music bot library
//!
//! Per-guild playback sessions for a chat music bot: a bounded track queue,
//! a playback controller that reacts to end-of-track signals from a voice
//! transport, and the search, chat and web layers that drive them.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the web dashboard
//! - `chat` - prefix chat command parsing and execution
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `discord` - Discord OAuth2 client for dashboard login
//! - `error` - Error types
//! - `management` - Queue store, playback controller and session registry
//! - `search` - Search provider trait and the aggregating search service
//! - `server` - Router and HTTP server of the dashboard
//! - `spotify` - Spotify Web API search provider
//! - `transport` - Voice transport trait and the external player transport
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `youtube` - `yt-dlp` search provider
//!
//! # Example
//!
//! ```
//! use psychosonus::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> psychosonus::Res<()> {
//!     config::load_env().await?;
//!     cli::serve(None, true).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod discord;
pub mod error;
pub mod management;
pub mod search;
pub mod server;
pub mod spotify;
pub mod transport;
pub mod types;
pub mod utils;
pub mod youtube;

/// Result alias for top-level operations that only need to report an error.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a console message with a blue `o` marker.
///
/// ```
/// info!("Console ready on guild '{}'", guild);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a console message with a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` message and exits with status 1.
///
/// Only for startup failures the process cannot recover from, such as an
/// invalid configuration or a port that cannot be bound.
///
/// ```
/// error!("Invalid configuration: {}", e);
/// // not reached
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a console message with a yellow `!` marker.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
