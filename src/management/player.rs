//! Playback controller.
//!
//! Owns the Idle/Playing/Paused state of one session and moves the queue
//! cursor. Transport work is never done here: every decision is turned into
//! a [`TransportCommand`] and pushed onto the session driver's channel while
//! the state lock is held, so the driver sees commands in the same order the
//! controller made them.
//!
//! Lock order is controller state first, queue second.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    error::{PlaybackError, QueueError},
    management::QueueStore,
    transport::TransportCommand,
    types::Track,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Jump {
    Previous,
}

#[derive(Debug)]
struct PlayerState {
    status: PlaybackStatus,
    /// Tags the stream currently handed to the transport. Completion events
    /// carrying an older generation are stale.
    generation: u64,
    pending: Option<Jump>,
}

pub struct PlaybackController {
    queue: Arc<QueueStore>,
    state: Mutex<PlayerState>,
    commands: mpsc::UnboundedSender<TransportCommand>,
}

impl PlaybackController {
    pub fn new(queue: Arc<QueueStore>, commands: mpsc::UnboundedSender<TransportCommand>) -> Self {
        Self {
            queue,
            state: Mutex::new(PlayerState {
                status: PlaybackStatus::Idle,
                generation: 0,
                pending: None,
            }),
            commands,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn send(&self, command: TransportCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!("session driver is gone, dropping transport command");
        }
    }

    fn dispatch(&self, state: &mut PlayerState, track: &Track) -> Result<(), PlaybackError> {
        let Some(uri) = track.playback_uri() else {
            return Err(QueueError::UnresolvedTrack(track.title.clone()).into());
        };

        state.generation += 1;
        state.status = PlaybackStatus::Playing;
        state.pending = None;

        tracing::info!(
            generation = state.generation,
            title = %track.title,
            artist = %track.artist,
            "now playing"
        );
        self.send(TransportCommand::Start {
            track: track.clone(),
            uri: uri.to_string(),
            generation: state.generation,
        });
        Ok(())
    }

    pub fn queue(&self) -> &Arc<QueueStore> {
        &self.queue
    }

    pub fn status(&self) -> PlaybackStatus {
        self.lock().status
    }

    /// The active track, if the controller is not idle.
    pub fn now_playing(&self) -> Option<Track> {
        let state = self.lock();
        match state.status {
            PlaybackStatus::Idle => None,
            _ => self.queue.current(),
        }
    }

    /// Starts playback of the current track, or of the head of the queue.
    pub fn play(&self) -> Result<Track, PlaybackError> {
        let mut state = self.lock();
        if state.status != PlaybackStatus::Idle {
            return Err(PlaybackError::AlreadyPlaying);
        }

        let track = match self.queue.current() {
            Some(track) => track,
            None => self.queue.advance()?.ok_or(PlaybackError::QueueEmpty)?,
        };

        self.dispatch(&mut state, &track)?;
        Ok(track)
    }

    /// Starts playback when idle. Returns the started track, if any.
    pub fn ensure_playing(&self) -> Result<Option<Track>, PlaybackError> {
        match self.play() {
            Ok(track) => Ok(Some(track)),
            Err(PlaybackError::AlreadyPlaying) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn pause(&self) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        if state.status != PlaybackStatus::Playing {
            return Err(PlaybackError::InvalidState {
                action: "pause",
                state: state.status.as_str(),
            });
        }

        state.status = PlaybackStatus::Paused;
        self.send(TransportCommand::Pause);
        Ok(())
    }

    pub fn resume(&self) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        if state.status != PlaybackStatus::Paused {
            return Err(PlaybackError::InvalidState {
                action: "resume",
                state: state.status.as_str(),
            });
        }

        state.status = PlaybackStatus::Playing;
        self.send(TransportCommand::Resume);
        Ok(())
    }

    /// Asks the transport to stop the active stream. The resulting
    /// completion event advances the queue.
    pub fn skip(&self) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        if state.status == PlaybackStatus::Idle {
            return Err(PlaybackError::NothingPlaying);
        }

        state.pending = None;
        self.send(TransportCommand::Stop);
        Ok(())
    }

    /// Like [`skip`](Self::skip), but the completion event steps back one
    /// track instead of forward.
    pub fn previous(&self) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        if state.status == PlaybackStatus::Idle {
            return Err(PlaybackError::NothingPlaying);
        }
        if !self.queue.has_history() {
            return Err(PlaybackError::InvalidState {
                action: "go back",
                state: "on the first track",
            });
        }

        state.pending = Some(Jump::Previous);
        self.send(TransportCommand::Stop);
        Ok(())
    }

    /// Handles the end of the stream tagged `generation`.
    ///
    /// Only the session driver calls this. Returns the track dispatched
    /// next, if any.
    pub fn on_track_finished(&self, generation: u64) -> Result<Option<Track>, PlaybackError> {
        let mut state = self.lock();
        if generation != state.generation || state.status == PlaybackStatus::Idle {
            tracing::debug!(
                generation,
                current = state.generation,
                "ignoring stale completion"
            );
            return Ok(None);
        }

        let next = match state.pending.take() {
            Some(Jump::Previous) => match self.queue.rewind() {
                Ok(None) => self.queue.advance(),
                other => other,
            },
            None => self.queue.advance(),
        };

        match next {
            Ok(Some(track)) => {
                if let Err(e) = self.dispatch(&mut state, &track) {
                    state.status = PlaybackStatus::Idle;
                    return Err(e);
                }
                Ok(Some(track))
            }
            Ok(None) => {
                tracing::info!("queue finished");
                state.status = PlaybackStatus::Idle;
                Ok(None)
            }
            Err(e) => {
                state.status = PlaybackStatus::Idle;
                Err(e.into())
            }
        }
    }

    /// Stops the transport, clears the queue and goes idle.
    pub fn stop(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.status = PlaybackStatus::Idle;
        state.pending = None;
        self.queue.clear();
        self.send(TransportCommand::Stop);
    }

    /// [`stop`](Self::stop), then shuts the session driver down.
    pub fn leave(&self) {
        self.stop();
        self.send(TransportCommand::Shutdown);
    }
}
