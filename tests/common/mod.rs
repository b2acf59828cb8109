#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use psychosonus::{
    error::{SearchError, TransportError},
    management::{SessionRegistry, TransportFactory},
    search::{SearchProvider, SearchService},
    transport::{EventSender, TransportEvent, VoiceTransport},
    types::{GuildId, Track, TrackSource},
};

// Helper function to create a playable YouTube track
pub fn track(title: &str) -> Track {
    Track {
        id: title.to_lowercase(),
        title: title.to_string(),
        artist: format!("{title} Artist"),
        duration: "03:00".to_string(),
        url: format!("https://www.youtube.com/watch?v={title}"),
        source: TrackSource::Youtube,
        playable_uri: None,
    }
}

// Helper function to create an unresolved Spotify track
pub fn spotify_track(title: &str, artist: &str) -> Track {
    Track {
        id: title.to_lowercase(),
        title: title.to_string(),
        artist: artist.to_string(),
        duration: "04:00".to_string(),
        url: format!("https://open.spotify.com/track/{title}"),
        source: TrackSource::Spotify,
        playable_uri: None,
    }
}

pub fn uri(title: &str) -> String {
    format!("https://www.youtube.com/watch?v={title}")
}

/// What a [`MockTransport`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start(String, u64),
    Stop,
    Pause,
    Resume,
}

/// Test-side view of every transport built from it.
#[derive(Clone, Default)]
pub struct MockHandle {
    calls: Arc<Mutex<Vec<Call>>>,
    active: Arc<Mutex<Option<(u64, EventSender)>>>,
    failing: Arc<Mutex<Vec<String>>>,
}

impl MockHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transport(&self) -> MockTransport {
        MockTransport {
            handle: self.clone(),
        }
    }

    pub fn factory(&self) -> TransportFactory {
        let handle = self.clone();
        Arc::new(move |_: &GuildId| Box::new(handle.transport()) as Box<dyn VoiceTransport>)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn starts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Start(uri, _) => Some(uri),
                _ => None,
            })
            .collect()
    }

    /// Makes `start_stream` fail for `uri`.
    pub fn fail_on(&self, uri: &str) {
        self.failing.lock().unwrap().push(uri.to_string());
    }

    /// Ends the active stream as if the track played to the end.
    pub fn finish_current(&self) -> bool {
        match self.active.lock().unwrap().take() {
            Some((generation, events)) => events
                .send(TransportEvent::Finished {
                    generation,
                    error: None,
                })
                .is_ok(),
            None => false,
        }
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active.lock().unwrap().as_ref().map(|(g, _)| *g)
    }

    /// Sends a completion for an arbitrary generation.
    pub fn send_finished(&self, generation: u64) {
        if let Some((_, events)) = self.active.lock().unwrap().as_ref() {
            let _ = events.send(TransportEvent::Finished {
                generation,
                error: None,
            });
        }
    }
}

/// Records calls and reports completion only when told to, or on stop.
pub struct MockTransport {
    handle: MockHandle,
}

impl MockTransport {
    fn end_active(&self) {
        if let Some((generation, events)) = self.handle.active.lock().unwrap().take() {
            let _ = events.send(TransportEvent::Finished {
                generation,
                error: None,
            });
        }
    }
}

#[async_trait]
impl VoiceTransport for MockTransport {
    async fn start_stream(
        &mut self,
        uri: &str,
        generation: u64,
        events: EventSender,
    ) -> Result<(), TransportError> {
        self.end_active();
        self.handle
            .calls
            .lock()
            .unwrap()
            .push(Call::Start(uri.to_string(), generation));

        if self.handle.failing.lock().unwrap().iter().any(|f| f == uri) {
            return Err(TransportError::NotConnected);
        }

        *self.handle.active.lock().unwrap() = Some((generation, events));
        Ok(())
    }

    async fn stop_stream(&mut self) {
        self.handle.calls.lock().unwrap().push(Call::Stop);
        self.end_active();
    }

    async fn pause(&mut self) -> Result<(), TransportError> {
        self.handle.calls.lock().unwrap().push(Call::Pause);
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), TransportError> {
        self.handle.calls.lock().unwrap().push(Call::Resume);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Search provider with canned answers per query.
pub struct MockProvider {
    source: TrackSource,
    answers: HashMap<String, Vec<Track>>,
    echo: bool,
    fail: bool,
    queries: Mutex<Vec<(String, usize)>>,
}

impl MockProvider {
    pub fn new(source: TrackSource) -> Self {
        Self {
            source,
            answers: HashMap::new(),
            echo: false,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Answers every query with `limit` tracks titled after the query.
    pub fn echo(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn answer(mut self, query: &str, tracks: Vec<Track>) -> Self {
        self.answers.insert(query.to_string(), tracks);
        self
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockProvider {
    fn source(&self) -> TrackSource {
        self.source
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, SearchError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), limit));

        if self.fail {
            return Err(SearchError::provider(self.source.as_str(), "mock failure"));
        }
        if self.echo {
            return Ok((0..limit)
                .map(|i| {
                    let mut t = track(&format!("{query} {i}"));
                    t.source = self.source;
                    if self.source == TrackSource::Spotify {
                        t.url = format!("https://open.spotify.com/track/{i}");
                    }
                    t
                })
                .collect());
        }
        Ok(self.answers.get(query).cloned().unwrap_or_default())
    }
}

/// YouTube-only search service that echoes queries.
pub fn echo_search() -> Arc<SearchService> {
    Arc::new(SearchService::new(
        None,
        Arc::new(MockProvider::new(TrackSource::Youtube).echo()),
    ))
}

pub fn registry(handle: &MockHandle, max_queue_size: usize) -> Arc<SessionRegistry> {
    Arc::new(SessionRegistry::new(max_queue_size, handle.factory()))
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
