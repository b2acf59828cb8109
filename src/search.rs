//! Track search across the configured providers.
//!
//! Search runs before anything touches a queue: results are resolved to a
//! playable location here and only then handed to `QueueStore::add`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::SearchError,
    types::{Track, TrackSource},
    utils,
};

pub const SPOTIFY_LIMIT: usize = 5;
pub const YOUTUBE_LIMIT: usize = 8;
pub const MAX_RESULTS: usize = 10;
const RESOLVE_LIMIT: usize = 3;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn source(&self) -> TrackSource;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, SearchError>;
}

pub struct SearchService {
    spotify: Option<Arc<dyn SearchProvider>>,
    youtube: Arc<dyn SearchProvider>,
}

impl SearchService {
    pub fn new(spotify: Option<Arc<dyn SearchProvider>>, youtube: Arc<dyn SearchProvider>) -> Self {
        Self { spotify, youtube }
    }

    pub fn spotify_available(&self) -> bool {
        self.spotify.is_some()
    }

    /// Spotify results first (when configured), then YouTube.
    ///
    /// One provider failing is logged and tolerated; all of them failing is
    /// an error.
    pub async fn search(&self, query: &str) -> Result<Vec<Track>, SearchError> {
        let mut tracks = Vec::new();
        let mut succeeded = false;
        let mut last_error = None;

        let providers = self
            .spotify
            .iter()
            .map(|p| (p, SPOTIFY_LIMIT))
            .chain(std::iter::once((&self.youtube, YOUTUBE_LIMIT)));

        for (provider, limit) in providers {
            let source = provider.source().as_str();
            match provider.search(query, limit).await {
                Ok(found) => {
                    tracing::info!(query, source, count = found.len(), "search finished");
                    tracks.extend(found);
                    succeeded = true;
                }
                Err(e) => {
                    tracing::error!(query, source, "search failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !succeeded => Err(e),
            _ => {
                tracks.truncate(MAX_RESULTS);
                Ok(tracks)
            }
        }
    }

    pub async fn search_youtube(&self, query: &str, limit: usize) -> Result<Vec<Track>, SearchError> {
        self.youtube.search(query, limit).await
    }

    /// Returns `track` with a playable location.
    ///
    /// Spotify tracks are matched to a YouTube video by trying a few query
    /// shapes in turn. Only `http(s)` locations are accepted as playable.
    pub async fn resolve(&self, track: Track) -> Result<Track, SearchError> {
        if let Some(uri) = track.playback_uri() {
            if !utils::is_web_url(uri) {
                return Err(SearchError::InvalidUri(uri.to_string()));
            }
            return Ok(track);
        }

        let queries = [
            format!("{} {}", track.artist, track.title),
            format!("{} {}", track.title, track.artist),
            track.title.clone(),
            format!("{} - {}", track.artist, track.title),
        ];

        for query in &queries {
            tracing::debug!(query, "resolving playable source");
            match self.youtube.search(query, RESOLVE_LIMIT).await {
                Ok(found) => {
                    let uri = found
                        .iter()
                        .filter_map(Track::playback_uri)
                        .find(|uri| utils::is_web_url(uri));
                    if let Some(uri) = uri {
                        tracing::info!(title = %track.title, uri, "resolved youtube source");
                        return Ok(track.with_playable_uri(uri));
                    }
                }
                Err(e) => tracing::warn!(query, "resolve search failed: {e}"),
            }
        }

        Err(SearchError::NoPlayableSource(track.title))
    }
}
