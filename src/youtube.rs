//! YouTube search through the `yt-dlp` executable.
//!
//! `yt-dlp --flat-playlist --dump-json ytsearchN:<query>` prints one JSON
//! object per result without resolving the media streams, which keeps a
//! search well under a second for small limits.

use async_trait::async_trait;
use tokio::process::Command;

use crate::{
    error::SearchError,
    search::SearchProvider,
    types::{Track, TrackSource, YtDlpEntry},
    utils,
};

pub struct YoutubeProvider {
    ytdlp_path: String,
}

impl YoutubeProvider {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }
}

#[async_trait]
impl SearchProvider for YoutubeProvider {
    fn source(&self) -> TrackSource {
        TrackSource::Youtube
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, SearchError> {
        let output = Command::new(&self.ytdlp_path)
            .args(["--flat-playlist", "--dump-json", "--no-warnings"])
            .arg(format!("ytsearch{limit}:{query}"))
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SearchError::provider(
                "youtube",
                format!("yt-dlp exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let tracks = parse_output(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(query, count = tracks.len(), "yt-dlp returned");
        Ok(tracks)
    }
}

/// Parses `--dump-json` output, skipping lines that are not usable entries.
pub fn parse_output(stdout: &str) -> Vec<Track> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<YtDlpEntry>(line) {
            Ok(entry) => entry_to_track(entry),
            Err(e) => {
                tracing::warn!("skipping unparsable yt-dlp line: {e}");
                None
            }
        })
        .collect()
}

/// Builds a queue record from a search entry. Entries without an id are
/// dropped.
pub fn entry_to_track(entry: YtDlpEntry) -> Option<Track> {
    let id = entry.id.filter(|id| !id.is_empty())?;
    let title = entry.title.unwrap_or_else(|| "Unknown Title".to_string());
    let uploader = entry
        .uploader
        .or(entry.channel)
        .unwrap_or_else(|| "Unknown Artist".to_string());

    let (artist, title) = utils::split_artist_title(&title, &uploader);
    let duration = entry
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d as u64)
        .unwrap_or(0);

    Some(Track {
        url: format!("https://www.youtube.com/watch?v={id}"),
        id,
        title: utils::truncate_chars(&title, 100),
        artist: utils::truncate_chars(&artist, 50),
        duration: utils::format_duration(duration),
        source: TrackSource::Youtube,
        playable_uri: None,
    })
}
