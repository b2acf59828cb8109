//! Voice transport seam.
//!
//! A transport turns a track URI into sound and reports back when the
//! stream ends. It never calls into the queue or the controller directly:
//! completion is delivered as a [`TransportEvent`] on a channel owned by the
//! session driver, which is the only place events are processed.

mod command;

pub use command::CommandTransport;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{error::TransportError, types::Track};

/// Instructions from the playback controller to the session driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Start {
        track: Track,
        uri: String,
        generation: u64,
    },
    Stop,
    Pause,
    Resume,
    Shutdown,
}

/// Notifications from a transport back to its session driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The stream started with `generation` ended, normally or not.
    Finished {
        generation: u64,
        error: Option<String>,
    },
}

pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

#[async_trait]
pub trait VoiceTransport: Send {
    /// Starts streaming `uri`, replacing whatever is playing.
    ///
    /// The transport must emit exactly one `Finished` event tagged with
    /// `generation` once the stream ends, including when it is stopped.
    async fn start_stream(
        &mut self,
        uri: &str,
        generation: u64,
        events: EventSender,
    ) -> Result<(), TransportError>;

    /// Stops the current stream. A no-op when nothing is playing.
    async fn stop_stream(&mut self);

    async fn pause(&mut self) -> Result<(), TransportError>;

    async fn resume(&mut self) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;
}
