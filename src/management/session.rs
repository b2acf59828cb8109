use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    error::TransportError,
    management::{PlaybackController, PlaybackStatus, QueueStore},
    transport::{EventSender, TransportCommand, TransportEvent, VoiceTransport},
    types::{GuildId, Track},
};

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub guild_id: GuildId,
    pub status: PlaybackStatus,
    pub queue_size: usize,
    pub upcoming: usize,
    pub current_track: Option<Track>,
}

/// One voice session: a queue, its controller and the driver task that owns
/// the transport.
pub struct Session {
    id: GuildId,
    queue: Arc<QueueStore>,
    controller: Arc<PlaybackController>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Creates the session and spawns its driver on the current runtime.
    pub fn spawn(id: GuildId, max_queue_size: usize, transport: Box<dyn VoiceTransport>) -> Self {
        let queue = Arc::new(QueueStore::new(max_queue_size));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let controller = Arc::new(PlaybackController::new(Arc::clone(&queue), commands_tx));

        let driver = tokio::spawn(drive(
            id.clone(),
            Arc::clone(&controller),
            transport,
            commands_rx,
            events_rx,
            events_tx,
        ));

        Self {
            id,
            queue,
            controller,
            driver: Mutex::new(Some(driver)),
        }
    }

    pub fn id(&self) -> &GuildId {
        &self.id
    }

    pub fn queue(&self) -> &Arc<QueueStore> {
        &self.queue
    }

    pub fn controller(&self) -> &Arc<PlaybackController> {
        &self.controller
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            guild_id: self.id.clone(),
            status: self.controller.status(),
            queue_size: self.queue.len(),
            upcoming: self.queue.upcoming_len(),
            current_track: self.controller.now_playing(),
        }
    }

    /// Stops playback, clears the queue and waits for the driver to exit.
    pub async fn shutdown(&self) {
        self.controller.leave();

        let driver = self.driver.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(driver) = driver {
            if let Err(e) = driver.await {
                tracing::warn!(guild = %self.id, "session driver panicked: {e}");
            }
        }
    }
}

/// Single control path of a session.
///
/// Transport commands and completion events are handled one at a time, in
/// arrival order, so the controller never sees two completions at once.
async fn drive(
    id: GuildId,
    controller: Arc<PlaybackController>,
    mut transport: Box<dyn VoiceTransport>,
    mut commands: mpsc::UnboundedReceiver<TransportCommand>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    events_tx: EventSender,
) {
    tracing::debug!(guild = %id, "session driver started");

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(TransportCommand::Start { track, uri, generation }) => {
                    let started = if transport.is_connected() {
                        transport.start_stream(&uri, generation, events_tx.clone()).await
                    } else {
                        Err(TransportError::NotConnected)
                    };
                    if let Err(e) = started {
                        tracing::warn!(guild = %id, title = %track.title, "failed to start stream: {e}");
                        // Unplayable tracks are skipped.
                        let _ = events_tx.send(TransportEvent::Finished {
                            generation,
                            error: Some(e.to_string()),
                        });
                    }
                }
                Some(TransportCommand::Stop) => transport.stop_stream().await,
                Some(TransportCommand::Pause) => {
                    if let Err(e) = transport.pause().await {
                        tracing::warn!(guild = %id, "failed to pause: {e}");
                    }
                }
                Some(TransportCommand::Resume) => {
                    if let Err(e) = transport.resume().await {
                        tracing::warn!(guild = %id, "failed to resume: {e}");
                    }
                }
                Some(TransportCommand::Shutdown) | None => {
                    transport.stop_stream().await;
                    break;
                }
            },
            Some(event) = events.recv() => match event {
                TransportEvent::Finished { generation, error } => {
                    if let Some(error) = error {
                        tracing::warn!(guild = %id, generation, "stream ended with error: {error}");
                    }
                    if let Err(e) = controller.on_track_finished(generation) {
                        tracing::error!(guild = %id, "failed to advance queue: {e}");
                    }
                }
            },
        }
    }

    tracing::debug!(guild = %id, "session driver stopped");
}
