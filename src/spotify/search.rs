use reqwest::{Client, StatusCode};

use crate::{
    error::SearchError,
    types::{SpotifySearchResponse, SpotifyTrack, Track, TrackSource},
    utils,
};

/// Outcome of one search request.
pub enum SearchOutcome {
    Found(Vec<Track>),
    /// The token was rejected; the caller should refresh and retry once.
    Unauthorized,
}

/// Runs a track search against the Spotify Web API.
///
/// # Arguments
///
/// * `api_url` - Base URL of the Web API, e.g. `https://api.spotify.com/v1`
/// * `token` - App access token
/// * `query` - Free-text query
/// * `limit` - Maximum number of tracks to return
///
/// # Returns
///
/// - `Ok(SearchOutcome::Found(tracks))` - tracks converted to queue records
/// - `Ok(SearchOutcome::Unauthorized)` - HTTP 401, token needs a refresh
/// - `Err(SearchError)` - any other failure
pub async fn search_tracks(
    client: &Client,
    api_url: &str,
    token: &str,
    query: &str,
    limit: usize,
) -> Result<SearchOutcome, SearchError> {
    let limit = limit.to_string();
    let response = client
        .get(format!("{api_url}/search"))
        .bearer_auth(token)
        .query(&[
            ("q", query),
            ("type", "track"),
            ("limit", limit.as_str()),
            ("market", "US"),
        ])
        .send()
        .await?;

    match response.status() {
        StatusCode::UNAUTHORIZED => Ok(SearchOutcome::Unauthorized),
        status if status.is_success() => {
            let res = response.json::<SpotifySearchResponse>().await?;
            Ok(SearchOutcome::Found(
                res.tracks.items.into_iter().map(to_track).collect(),
            ))
        }
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(SearchError::provider(
                "spotify",
                format!("{status} - {body}"),
            ))
        }
    }
}

/// Converts an API track into a queue record.
///
/// Titles are capped at 100 characters and artist lists at 50. The record
/// has no playable location yet.
pub fn to_track(track: SpotifyTrack) -> Track {
    let artists: Vec<&str> = track.artists.iter().map(|a| a.name.as_str()).collect();
    let artist = if artists.is_empty() {
        "Unknown Artist".to_string()
    } else {
        artists.join(", ")
    };

    Track {
        title: utils::truncate_chars(track.name.as_deref().unwrap_or("Unknown Title"), 100),
        artist: utils::truncate_chars(&artist, 50),
        duration: utils::format_duration_ms(track.duration_ms),
        url: track.external_urls.spotify.unwrap_or_default(),
        source: TrackSource::Spotify,
        playable_uri: None,
        id: track.id,
    }
}
