//! Error types shared across the bot.
//!
//! Every variant here is a recoverable condition reported back to the chat
//! command or web handler that triggered it. The one exception is
//! [`QueueError::Corrupted`], which aborts the operation after the session
//! queue has been reset.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue is full ({0} tracks max)")]
    QueueFull(usize),

    #[error("index {0} is out of range or currently playing")]
    IndexOutOfRange(usize),

    #[error("track '{0}' has no playable source")]
    UnresolvedTrack(String),

    #[error("queue state was inconsistent and has been reset")]
    Corrupted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("queue is empty")]
    QueueEmpty,

    #[error("already playing")]
    AlreadyPlaying,

    #[error("nothing is playing")]
    NothingPlaying,

    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Queue(#[from] QueueError),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{provider} search failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("no playable source found for '{0}'")]
    NoPlayableSource(String),

    #[error("no search provider is available")]
    NoProvider,

    #[error("'{0}' is not an http(s) URL")]
    InvalidUri(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        SearchError::Provider {
            provider,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("player command is empty")]
    NoCommand,

    #[error("failed to spawn player: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{0} is not supported by this transport")]
    Unsupported(&'static str),

    #[error("transport is not connected")]
    NotConnected,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication is not configured")]
    Disabled,

    #[error("not logged in")]
    MissingSession,

    #[error("session is invalid: {0}")]
    InvalidSession(&'static str),

    #[error("session expired")]
    Expired,

    #[error("not a member of guild {0}")]
    Forbidden(String),

    #[error("oauth state mismatch")]
    StateMismatch,

    #[error("invalid oauth url: {0}")]
    InvalidUrl(String),

    #[error("discord request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}
