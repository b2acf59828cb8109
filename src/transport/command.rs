use async_trait::async_trait;
use tokio::{
    process::{Child, Command},
    sync::{mpsc, oneshot},
};

use super::{EventSender, TransportEvent, VoiceTransport};
use crate::error::TransportError;

/// Requests handled by the task that owns the player process.
enum Control {
    Stop,
    #[cfg(unix)]
    Signal(&'static str, oneshot::Sender<Result<(), TransportError>>),
}

struct ActiveStream {
    generation: u64,
    control: mpsc::UnboundedSender<Control>,
}

/// Plays tracks through an external player process, one process per track.
///
/// The configured command gets `--` and then the track URI as its last
/// arguments (`mpv --no-video --really-quiet -- <uri>` by default), so a URI
/// is never read as a player option. The stream ends when the process exits.
pub struct CommandTransport {
    program: String,
    args: Vec<String>,
    active: Option<ActiveStream>,
}

impl CommandTransport {
    pub fn new(command: &[String]) -> Result<Self, TransportError> {
        let (program, args) = command.split_first().ok_or(TransportError::NoCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            active: None,
        })
    }

    /// A transport with the same command and no running stream.
    pub fn fresh(&self) -> Self {
        Self {
            program: self.program.clone(),
            args: self.args.clone(),
            active: None,
        }
    }

    /// Forwards `signal` to the player task. Fails once the player has
    /// exited, so a reaped pid is never signalled.
    #[cfg(unix)]
    async fn signal(&self, signal: &'static str) -> Result<(), TransportError> {
        let active = self.active.as_ref().ok_or(TransportError::NotConnected)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        active
            .control
            .send(Control::Signal(signal, reply_tx))
            .map_err(|_| TransportError::NotConnected)?;
        reply_rx.await.map_err(|_| TransportError::NotConnected)?
    }
}

/// Sends `signal` to a child that has not been reaped yet.
#[cfg(unix)]
async fn send_signal(child: &Child, signal: &'static str) -> Result<(), TransportError> {
    let pid = child.id().ok_or(TransportError::NotConnected)?;
    let status = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(pid.to_string())
        .status()
        .await?;
    if !status.success() {
        tracing::warn!(pid, signal, "kill exited with {status}");
    }
    Ok(())
}

/// Owns the player until it exits or is stopped, then reports `Finished`.
async fn watch(
    mut child: Child,
    generation: u64,
    mut control: mpsc::UnboundedReceiver<Control>,
    events: EventSender,
) {
    let error = loop {
        tokio::select! {
            status = child.wait() => break match status {
                Ok(status) if status.success() => None,
                Ok(status) => Some(format!("player exited with {status}")),
                Err(e) => Some(e.to_string()),
            },
            request = control.recv() => match request {
                #[cfg(unix)]
                Some(Control::Signal(signal, reply)) => {
                    let _ = reply.send(send_signal(&child, signal).await);
                }
                Some(Control::Stop) | None => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(generation, "failed to kill player: {e}");
                    }
                    break None;
                }
            },
        }
    };

    // The driver may already be gone during shutdown.
    let _ = events.send(TransportEvent::Finished { generation, error });
}

#[async_trait]
impl VoiceTransport for CommandTransport {
    async fn start_stream(
        &mut self,
        uri: &str,
        generation: u64,
        events: EventSender,
    ) -> Result<(), TransportError> {
        self.stop_stream().await;

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg("--")
            .arg(uri)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        tracing::debug!(generation, pid = ?child.id(), uri, "player started");
        tokio::spawn(watch(child, generation, control_rx, events));

        self.active = Some(ActiveStream {
            generation,
            control: control_tx,
        });
        Ok(())
    }

    async fn stop_stream(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(generation = active.generation, "stopping player");
            let _ = active.control.send(Control::Stop);
        }
    }

    #[cfg(unix)]
    async fn pause(&mut self) -> Result<(), TransportError> {
        self.signal("STOP").await
    }

    #[cfg(unix)]
    async fn resume(&mut self) -> Result<(), TransportError> {
        self.signal("CONT").await
    }

    #[cfg(not(unix))]
    async fn pause(&mut self) -> Result<(), TransportError> {
        Err(TransportError::Unsupported("pause"))
    }

    #[cfg(not(unix))]
    async fn resume(&mut self) -> Result<(), TransportError> {
        Err(TransportError::Unsupported("resume"))
    }

    fn is_connected(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        assert!(matches!(
            CommandTransport::new(&[]),
            Err(TransportError::NoCommand)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn finished_event_carries_generation() {
        let mut transport = CommandTransport::new(&["true".to_string()]).unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        transport.start_stream("ignored", 7, tx).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            TransportEvent::Finished {
                generation: 7,
                error: None
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stop_ends_stream_and_is_idempotent() {
        let mut transport = CommandTransport::new(&["sleep".to_string()]).unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        // The URI becomes the sleep duration.
        transport.start_stream("30", 1, tx).await.unwrap();
        transport.stop_stream().await;
        transport.stop_stream().await;

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, TransportEvent::Finished { generation: 1, .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn uri_follows_option_terminator() {
        let out = std::env::temp_dir().join(format!("psychosonus-args-{}", std::process::id()));
        let script = format!("printf '%s\\n' \"$@\" > '{}'", out.display());
        let mut transport =
            CommandTransport::new(&["sh".into(), "-c".into(), script, "sh".into()]).unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        transport
            .start_stream("--script=/tmp/evil.lua", 3, tx)
            .await
            .unwrap();
        rx.recv().await.unwrap();

        let args = std::fs::read_to_string(&out).unwrap();
        let _ = std::fs::remove_file(&out);
        assert_eq!(args, "--\n--script=/tmp/evil.lua\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pause_and_resume_running_player() {
        let mut transport = CommandTransport::new(&["sleep".to_string()]).unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        transport.start_stream("30", 1, tx).await.unwrap();
        transport.pause().await.unwrap();
        transport.resume().await.unwrap();
        transport.stop_stream().await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            TransportEvent::Finished { generation: 1, .. }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn signals_fail_once_player_has_exited() {
        let mut transport = CommandTransport::new(&["true".to_string()]).unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        transport.start_stream("ignored", 1, tx).await.unwrap();
        rx.recv().await.unwrap();

        assert!(matches!(
            transport.pause().await,
            Err(TransportError::NotConnected)
        ));
        assert!(matches!(
            transport.resume().await,
            Err(TransportError::NotConnected)
        ));
    }
}
