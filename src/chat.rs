//! Prefix chat commands (`!play`, `!skip`, ...).
//!
//! Parsing is separate from execution so any text source can drive a
//! session: the stdin console in `serve`, or a chat gateway.

use std::sync::Arc;

use crate::{
    error::{PlaybackError, QueueError},
    management::{PlaybackStatus, Session, SessionRegistry},
    search::SearchService,
    types::GuildId,
};

/// Entries shown by the queue listing before it is cut off.
pub const QUEUE_LISTING_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Join,
    Leave,
    Play(String),
    Skip,
    Previous,
    Pause,
    Resume,
    Stop,
    Queue,
    /// `None` when the argument is missing or not a number.
    Remove(Option<usize>),
    Clear,
    Shuffle,
    NowPlaying,
    Help,
}

impl ChatCommand {
    /// Parses one message. Returns `None` for text without the prefix and
    /// for unknown commands.
    pub fn parse(prefix: &str, line: &str) -> Option<ChatCommand> {
        let body = line.trim().strip_prefix(prefix)?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "join" | "j" => ChatCommand::Join,
            "leave" | "l" | "disconnect" => ChatCommand::Leave,
            "play" | "p" => ChatCommand::Play(rest.to_string()),
            "skip" | "s" => ChatCommand::Skip,
            "previous" | "prev" => ChatCommand::Previous,
            "pause" => ChatCommand::Pause,
            "resume" => ChatCommand::Resume,
            "stop" => ChatCommand::Stop,
            "queue" | "q" => ChatCommand::Queue,
            "remove" | "rm" => ChatCommand::Remove(rest.parse().ok()),
            "clear" => ChatCommand::Clear,
            "shuffle" => ChatCommand::Shuffle,
            "nowplaying" | "np" => ChatCommand::NowPlaying,
            "help" => ChatCommand::Help,
            _ => return None,
        };

        Some(command)
    }
}

/// Runs chat commands against the session registry.
pub struct ChatHandler {
    registry: Arc<SessionRegistry>,
    search: Arc<SearchService>,
    prefix: String,
    dashboard_url: String,
}

impl ChatHandler {
    pub fn new(
        registry: Arc<SessionRegistry>,
        search: Arc<SearchService>,
        prefix: impl Into<String>,
        dashboard_url: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            search,
            prefix: prefix.into(),
            dashboard_url: dashboard_url.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parses and runs `line`. `None` if it is not a command.
    pub async fn handle(&self, guild: &GuildId, line: &str) -> Option<String> {
        let command = ChatCommand::parse(&self.prefix, line)?;
        tracing::debug!(guild = %guild, ?command, "chat command");
        Some(self.execute(guild, command).await)
    }

    pub async fn execute(&self, guild: &GuildId, command: ChatCommand) -> String {
        match command {
            ChatCommand::Join => {
                self.registry.join(guild);
                format!(
                    "🎵 Joined **{guild}**\n🌐 Dashboard: {}",
                    self.dashboard_url
                )
            }
            ChatCommand::Leave => {
                if self.registry.leave(guild).await {
                    "👋 Left voice channel".to_string()
                } else {
                    "❌ Not in a voice channel".to_string()
                }
            }
            ChatCommand::Play(query) => self.play(guild, &query).await,
            ChatCommand::Help => self.help(),
            command => match self.registry.get(guild) {
                Some(session) => self.session_command(&session, command),
                None => "❌ Not in a voice channel".to_string(),
            },
        }
    }

    async fn play(&self, guild: &GuildId, query: &str) -> String {
        if query.is_empty() {
            return format!("❌ Usage: {}play <query>", self.prefix);
        }

        let session = self.registry.join(guild);
        let searching = format!("🔍 Searching for: **{query}**");

        let track = match self.search.search_youtube(query, 1).await {
            Ok(tracks) => match tracks.into_iter().next() {
                Some(track) => track,
                None => return format!("{searching}\n❌ No results found"),
            },
            Err(e) => return format!("{searching}\n❌ Search failed: {e}"),
        };

        if let Err(e) = session.queue().add(track.clone()) {
            return match e {
                QueueError::QueueFull(_) => format!("{searching}\n❌ Queue is full"),
                e => format!("{searching}\n❌ {e}"),
            };
        }

        let mut reply = format!(
            "{searching}\n✅ Added to queue: **{}** - {}",
            track.title, track.artist
        );
        match session.controller().ensure_playing() {
            Ok(Some(started)) => {
                reply.push_str(&format!(
                    "\n🎶 Now playing: **{}** - {}",
                    started.title, started.artist
                ));
            }
            Ok(None) => {}
            Err(e) => reply.push_str(&format!("\n❌ Failed to start playback: {e}")),
        }
        reply
    }

    fn session_command(&self, session: &Session, command: ChatCommand) -> String {
        let controller = session.controller();
        let queue = session.queue();

        match command {
            ChatCommand::Skip => match controller.skip() {
                Ok(()) => "⏭️ Skipped!".to_string(),
                Err(_) => "❌ Nothing is playing".to_string(),
            },
            ChatCommand::Previous => match controller.previous() {
                Ok(()) => "⏮️ Going back".to_string(),
                Err(PlaybackError::NothingPlaying) => "❌ Nothing is playing".to_string(),
                Err(e) => format!("❌ {e}"),
            },
            ChatCommand::Pause => match controller.pause() {
                Ok(()) => "⏸️ Paused".to_string(),
                Err(_) => "❌ Nothing is playing".to_string(),
            },
            ChatCommand::Resume => match controller.resume() {
                Ok(()) => "▶️ Resumed".to_string(),
                Err(_) => "❌ Nothing is paused".to_string(),
            },
            ChatCommand::Stop => {
                if controller.status() == PlaybackStatus::Idle {
                    "❌ Not playing anything".to_string()
                } else {
                    controller.stop();
                    "⏹️ Stopped and cleared queue".to_string()
                }
            }
            ChatCommand::Queue => match queue.snapshot() {
                Ok(entries) if entries.is_empty() => "📭 Queue is empty".to_string(),
                Ok(entries) => {
                    // Played history is not listed; indices stay absolute
                    // so they match `remove`.
                    let start = entries.iter().position(|e| e.is_current).unwrap_or(0);
                    let entries = &entries[start..];
                    let mut lines = vec!["🎼 **Queue:**".to_string()];
                    lines.extend(entries.iter().take(QUEUE_LISTING_LIMIT).map(|entry| {
                        let marker = if entry.is_current {
                            "▶️ ".to_string()
                        } else {
                            format!("{}. ", entry.index)
                        };
                        format!(
                            "{marker}**{}** - {} `{}`",
                            entry.track.title, entry.track.artist, entry.track.duration
                        )
                    }));
                    if entries.len() > QUEUE_LISTING_LIMIT {
                        lines.push(format!(
                            "... and {} more songs",
                            entries.len() - QUEUE_LISTING_LIMIT
                        ));
                    }
                    lines.join("\n")
                }
                Err(e) => format!("❌ {e}"),
            },
            ChatCommand::Remove(None) => format!("❌ Usage: {}remove <index>", self.prefix),
            ChatCommand::Remove(Some(index)) => match queue.remove_at(index) {
                Ok(track) => format!("🗑️ Removed **{}** - {}", track.title, track.artist),
                Err(QueueError::IndexOutOfRange(_)) => "❌ Invalid index".to_string(),
                Err(e) => format!("❌ {e}"),
            },
            ChatCommand::Clear => {
                queue.clear();
                "🧹 Queue cleared".to_string()
            }
            ChatCommand::Shuffle => match queue.shuffle() {
                Ok(()) => "🔀 Queue shuffled".to_string(),
                Err(e) => format!("❌ {e}"),
            },
            ChatCommand::NowPlaying => match controller.now_playing() {
                Some(track) => {
                    let paused = if controller.status() == PlaybackStatus::Paused {
                        " (paused)"
                    } else {
                        ""
                    };
                    format!(
                        "🎶 Now playing: **{}** - {} `{}`{paused}",
                        track.title, track.artist, track.duration
                    )
                }
                None => "❌ Nothing is playing".to_string(),
            },
            ChatCommand::Join | ChatCommand::Leave | ChatCommand::Play(_) | ChatCommand::Help => {
                self.help()
            }
        }
    }

    pub fn help(&self) -> String {
        let p = &self.prefix;
        [
            "🎵 **Commands:**".to_string(),
            format!("`{p}join` / `{p}j` - join the voice session"),
            format!("`{p}leave` / `{p}l` - leave and clear the queue"),
            format!("`{p}play <query>` / `{p}p` - search YouTube and queue the first hit"),
            format!("`{p}skip` / `{p}s` - skip the current track"),
            format!("`{p}previous` / `{p}prev` - go back one track"),
            format!("`{p}pause`, `{p}resume`, `{p}stop`"),
            format!("`{p}queue` / `{p}q` - show the queue"),
            format!("`{p}remove <index>` / `{p}rm` - remove a queued track"),
            format!("`{p}clear`, `{p}shuffle`"),
            format!("`{p}nowplaying` / `{p}np` - show the current track"),
        ]
        .join("\n")
    }
}
