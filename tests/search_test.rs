mod common;

use std::sync::Arc;

use psychosonus::{
    error::SearchError,
    search::{MAX_RESULTS, SPOTIFY_LIMIT, SearchProvider, SearchService, YOUTUBE_LIMIT},
    types::TrackSource,
};

use common::{MockProvider, spotify_track, track};

#[tokio::test]
async fn test_spotify_results_come_first_and_are_capped() {
    let spotify = Arc::new(MockProvider::new(TrackSource::Spotify).echo());
    let youtube = Arc::new(MockProvider::new(TrackSource::Youtube).echo());
    let service = SearchService::new(Some(spotify.clone() as Arc<dyn SearchProvider>), youtube.clone());

    let results = service.search("song").await.unwrap();

    assert_eq!(results.len(), MAX_RESULTS);
    assert!(results[..SPOTIFY_LIMIT].iter().all(|t| t.source == TrackSource::Spotify));
    assert!(results[SPOTIFY_LIMIT..].iter().all(|t| t.source == TrackSource::Youtube));
    assert_eq!(spotify.queries(), vec![("song".to_string(), SPOTIFY_LIMIT)]);
    assert_eq!(youtube.queries(), vec![("song".to_string(), YOUTUBE_LIMIT)]);
}

#[tokio::test]
async fn test_one_failing_provider_is_tolerated() {
    let spotify = Arc::new(MockProvider::new(TrackSource::Spotify).failing());
    let youtube = Arc::new(MockProvider::new(TrackSource::Youtube).echo());
    let service = SearchService::new(Some(spotify as Arc<dyn SearchProvider>), youtube);

    let results = service.search("song").await.unwrap();
    assert_eq!(results.len(), YOUTUBE_LIMIT);
}

#[tokio::test]
async fn test_all_providers_failing_is_an_error() {
    let spotify = Arc::new(MockProvider::new(TrackSource::Spotify).failing());
    let youtube = Arc::new(MockProvider::new(TrackSource::Youtube).failing());
    let service = SearchService::new(Some(spotify as Arc<dyn SearchProvider>), youtube);

    assert!(matches!(
        service.search("song").await,
        Err(SearchError::Provider { .. })
    ));
}

#[tokio::test]
async fn test_empty_results_are_not_an_error() {
    let youtube = Arc::new(MockProvider::new(TrackSource::Youtube));
    let service = SearchService::new(None, youtube);

    assert!(!service.spotify_available());
    assert!(service.search("nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resolve_tries_query_variants_in_order() {
    let hit = track("found");
    let youtube = Arc::new(MockProvider::new(TrackSource::Youtube).answer("Title", vec![hit.clone()]));
    let service = SearchService::new(None, youtube.clone());

    let resolved = service.resolve(spotify_track("Title", "Artist")).await.unwrap();

    assert_eq!(resolved.source, TrackSource::Spotify);
    assert_eq!(resolved.title, "Title");
    assert_eq!(resolved.playable_uri.as_deref(), Some(hit.url.as_str()));
    assert_eq!(
        youtube.queries(),
        vec![
            ("Artist Title".to_string(), 3),
            ("Title Artist".to_string(), 3),
            ("Title".to_string(), 3),
        ]
    );
}

#[tokio::test]
async fn test_resolve_without_match_fails() {
    let youtube = Arc::new(MockProvider::new(TrackSource::Youtube));
    let service = SearchService::new(None, youtube.clone());

    let result = service.resolve(spotify_track("Title", "Artist")).await;

    assert!(matches!(result, Err(SearchError::NoPlayableSource(t)) if t == "Title"));
    assert_eq!(youtube.queries().len(), 4);
    assert_eq!(youtube.queries()[3].0, "Artist - Title");
}

#[tokio::test]
async fn test_resolve_leaves_playable_tracks_alone() {
    let youtube = Arc::new(MockProvider::new(TrackSource::Youtube));
    let service = SearchService::new(None, youtube.clone());

    let t = track("A");
    assert_eq!(service.resolve(t.clone()).await.unwrap(), t);
    assert!(youtube.queries().is_empty());
}

#[tokio::test]
async fn test_resolve_rejects_non_web_locations() {
    let youtube = Arc::new(MockProvider::new(TrackSource::Youtube));
    let service = SearchService::new(None, youtube.clone());

    let mut option_shaped = track("A");
    option_shaped.url = "--script=/tmp/evil.lua".to_string();
    assert!(matches!(
        service.resolve(option_shaped).await,
        Err(SearchError::InvalidUri(uri)) if uri == "--script=/tmp/evil.lua"
    ));

    let local = spotify_track("Title", "Artist").with_playable_uri("file:///etc/passwd");
    assert!(matches!(
        service.resolve(local).await,
        Err(SearchError::InvalidUri(_))
    ));
    assert!(youtube.queries().is_empty());
}

#[tokio::test]
async fn test_resolve_skips_non_web_hits() {
    let mut bad = track("bad");
    bad.url = "-v".to_string();
    let good = track("good");
    let youtube = Arc::new(
        MockProvider::new(TrackSource::Youtube).answer("Artist Title", vec![bad, good.clone()]),
    );
    let service = SearchService::new(None, youtube);

    let resolved = service.resolve(spotify_track("Title", "Artist")).await.unwrap();
    assert_eq!(resolved.playable_uri.as_deref(), Some(good.url.as_str()));
}
