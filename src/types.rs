use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Service a track was found on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    Spotify,
    #[default]
    Youtube,
}

impl TrackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackSource::Spotify => "spotify",
            TrackSource::Youtube => "youtube",
        }
    }
}

/// A single playable item.
///
/// Tracks are never mutated once they sit in a queue; resolution of the
/// playable location happens on a copy before it is enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration: String,
    /// Page of the track on its source service.
    pub url: String,
    #[serde(default)]
    pub source: TrackSource,
    /// Location handed to the voice transport.
    #[serde(default, alias = "youtube_url")]
    pub playable_uri: Option<String>,
}

impl Track {
    /// Location to stream from, if one is known.
    ///
    /// YouTube pages are directly playable by the transport, Spotify tracks
    /// need a resolved YouTube equivalent first.
    pub fn playback_uri(&self) -> Option<&str> {
        if let Some(uri) = self.playable_uri.as_deref().filter(|u| !u.is_empty()) {
            return Some(uri);
        }

        match self.source {
            TrackSource::Youtube if !self.url.is_empty() => Some(&self.url),
            _ => None,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.playback_uri().is_some()
    }

    pub fn with_playable_uri(mut self, uri: impl Into<String>) -> Self {
        self.playable_uri = Some(uri.into());
        self
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub source: String,
    pub title: String,
    pub artist: String,
    pub duration: String,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        Self {
            source: track.source.as_str().to_string(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration: track.duration.clone(),
        }
    }
}

/// Identifier of a voice session (a Discord guild).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(String);

impl GuildId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientToken {
    pub access_token: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifySearchResponse {
    pub tracks: SpotifyTracks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTracks {
    pub items: Vec<SpotifyTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// One line of `yt-dlp --dump-json --flat-playlist` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtDlpEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordGuild {
    pub id: String,
    pub name: String,
}

/// Claims carried by the dashboard session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: String,
    pub username: String,
    pub guilds: Vec<DiscordGuild>,
    pub iat: u64,
    pub exp: u64,
}

impl SessionClaims {
    pub fn is_member_of(&self, guild: &GuildId) -> bool {
        self.guilds.iter().any(|g| g.id == guild.as_str())
    }
}
