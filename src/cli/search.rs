use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::{build_search_service, load_config},
    error,
    search::YOUTUBE_LIMIT,
    success,
    types::TrackTableRow,
    warning,
};

pub async fn search(query: String, youtube_only: bool) {
    let config = load_config();
    let service = build_search_service(&config);

    if !youtube_only && !service.spotify_available() {
        warning!("Spotify credentials not set, searching YouTube only");
    }

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Searching for '{query}'..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let result = if youtube_only {
        service.search_youtube(&query, YOUTUBE_LIMIT).await
    } else {
        service.search(&query).await
    };
    pb.finish_and_clear();

    let tracks = match result {
        Ok(tracks) => tracks,
        Err(e) => error!("Search failed: {}", e),
    };

    if tracks.is_empty() {
        warning!("No results for '{}'", query);
        return;
    }

    success!("Found {} tracks", tracks.len());
    let rows: Vec<TrackTableRow> = tracks.iter().map(TrackTableRow::from).collect();
    println!("{}", Table::new(rows));
}
