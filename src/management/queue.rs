//! Thread-safe playback queue.
//!
//! Layout of the items while something is active:
//!
//! ```text
//! items[..current]    played history (kept for `previous`)
//! items[current]      active track
//! items[current+1..]  upcoming
//! ```
//!
//! With no active track every item is upcoming. Every operation takes the
//! single lock for its whole duration and never does I/O under it.

use std::sync::{Mutex, MutexGuard};

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::{error::QueueError, types::Track};

/// One row of a queue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub index: usize,
    pub track: Track,
    pub is_current: bool,
}

/// Result of [`QueueStore::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Enqueued {
    pub index: usize,
    /// Played tracks dropped from the front to make room.
    pub pruned: usize,
}

/// What callers render: the active track and what plays after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueView {
    pub current_track: Option<Track>,
    pub upcoming: Vec<Track>,
    pub history_len: usize,
}

#[derive(Debug, Default)]
struct QueueState {
    items: Vec<Track>,
    current: Option<usize>,
}

impl QueueState {
    fn check(&mut self) -> Result<(), QueueError> {
        match self.current {
            Some(index) if index >= self.items.len() => {
                tracing::error!(
                    index,
                    len = self.items.len(),
                    "queue cursor out of bounds, resetting queue"
                );
                self.reset();
                Err(QueueError::Corrupted)
            }
            _ => Ok(()),
        }
    }

    fn reset(&mut self) {
        self.items.clear();
        self.current = None;
    }

    /// Index of the first track that has not been played yet.
    fn upcoming_start(&self) -> usize {
        self.current.map_or(0, |index| index + 1)
    }

    /// Drops up to `count` of the oldest played tracks.
    fn prune_history(&mut self, count: usize) -> usize {
        let Some(current) = self.current else {
            return 0;
        };

        let pruned = count.min(current);
        self.items.drain(..pruned);
        self.current = Some(current - pruned);
        pruned
    }
}

#[derive(Debug)]
pub struct QueueStore {
    state: Mutex<QueueState>,
    max_size: usize,
}

impl QueueStore {
    pub fn new(max_size: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // A panic under the lock cannot leave a half-written Vec behind, and
        // `check` catches a bad cursor, so poisoning is not fatal here.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Appends a track and returns its index.
    pub fn add(&self, track: Track) -> Result<usize, QueueError> {
        self.enqueue(track).map(|added| added.index)
    }

    /// Appends a track, reporting how many played tracks made room for it.
    ///
    /// When the queue is at capacity the oldest played tracks are dropped
    /// first, which shifts every remaining index down by `pruned`; only
    /// then does the add fail.
    pub fn enqueue(&self, track: Track) -> Result<Enqueued, QueueError> {
        if !track.is_playable() {
            return Err(QueueError::UnresolvedTrack(track.title));
        }

        let mut state = self.lock();
        state.check()?;

        let mut pruned = 0;
        if state.items.len() >= self.max_size {
            let overflow = state.items.len() + 1 - self.max_size;
            pruned = state.prune_history(overflow);
            if pruned > 0 {
                tracing::info!(pruned, "queue full, dropped played tracks");
            }
            if state.items.len() >= self.max_size {
                return Err(QueueError::QueueFull(self.max_size));
            }
        }

        state.items.push(track);
        Ok(Enqueued {
            index: state.items.len() - 1,
            pruned,
        })
    }

    /// Removes the track at `index`. The active track cannot be removed.
    pub fn remove_at(&self, index: usize) -> Result<Track, QueueError> {
        let mut state = self.lock();
        state.check()?;

        if index >= state.items.len() || state.current == Some(index) {
            return Err(QueueError::IndexOutOfRange(index));
        }

        let track = state.items.remove(index);
        if let Some(current) = state.current {
            if index < current {
                state.current = Some(current - 1);
            }
        }

        Ok(track)
    }

    pub fn clear(&self) {
        self.lock().reset();
    }

    /// Fisher-Yates over the upcoming tracks. The active track and the
    /// history keep their positions.
    pub fn shuffle(&self) -> Result<(), QueueError> {
        let mut state = self.lock();
        state.check()?;

        let start = state.upcoming_start();
        state.items[start..].shuffle(&mut rand::rng());
        Ok(())
    }

    /// Copy of every item with its position.
    pub fn snapshot(&self) -> Result<Vec<QueueEntry>, QueueError> {
        let mut state = self.lock();
        state.check()?;

        Ok(state
            .items
            .iter()
            .enumerate()
            .map(|(index, track)| QueueEntry {
                index,
                track: track.clone(),
                is_current: state.current == Some(index),
            })
            .collect())
    }

    pub fn view(&self) -> Result<QueueView, QueueError> {
        let mut state = self.lock();
        state.check()?;

        let start = state.upcoming_start();
        Ok(QueueView {
            current_track: state.current.map(|index| state.items[index].clone()),
            upcoming: state.items[start..].to_vec(),
            history_len: state.current.unwrap_or(0),
        })
    }

    /// Moves the cursor to the next track and returns it.
    ///
    /// From idle this starts at the head. Past the last track the played
    /// items are dropped and the queue goes idle.
    pub fn advance(&self) -> Result<Option<Track>, QueueError> {
        let mut state = self.lock();
        state.check()?;

        let next = state.upcoming_start();
        if next < state.items.len() {
            state.current = Some(next);
            return Ok(Some(state.items[next].clone()));
        }

        state.items.drain(..next);
        state.current = None;
        Ok(None)
    }

    /// Moves the cursor back one track and returns it.
    pub fn rewind(&self) -> Result<Option<Track>, QueueError> {
        let mut state = self.lock();
        state.check()?;

        match state.current {
            Some(current) if current > 0 => {
                state.current = Some(current - 1);
                Ok(Some(state.items[current - 1].clone()))
            }
            _ => Ok(None),
        }
    }

    pub fn current(&self) -> Option<Track> {
        let state = self.lock();
        state.current.and_then(|index| state.items.get(index).cloned())
    }

    pub fn current_index(&self) -> Option<usize> {
        self.lock().current
    }

    pub fn has_history(&self) -> bool {
        self.lock().current.is_some_and(|index| index > 0)
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn upcoming_len(&self) -> usize {
        let state = self.lock();
        state.items.len().saturating_sub(state.upcoming_start())
    }

    #[cfg(test)]
    fn force_cursor(&self, index: usize) {
        self.lock().current = Some(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackSource;

    fn track(title: &str) -> Track {
        Track {
            id: title.to_lowercase(),
            title: title.to_string(),
            artist: "Artist".to_string(),
            duration: "03:00".to_string(),
            url: format!("https://www.youtube.com/watch?v={title}"),
            source: TrackSource::Youtube,
            playable_uri: None,
        }
    }

    #[test]
    fn corrupted_cursor_resets_queue() {
        let queue = QueueStore::new(10);
        queue.add(track("A")).unwrap();
        queue.force_cursor(5);

        assert_eq!(queue.snapshot(), Err(QueueError::Corrupted));
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
    }

    #[test]
    fn full_queue_prunes_history_before_rejecting() {
        let queue = QueueStore::new(3);
        for title in ["A", "B", "C"] {
            queue.add(track(title)).unwrap();
        }
        queue.advance().unwrap();
        queue.advance().unwrap();
        assert_eq!(queue.current().unwrap().title, "B");

        // A is history and gives way to D.
        assert_eq!(queue.enqueue(track("D")), Ok(Enqueued { index: 2, pruned: 1 }));
        assert_eq!(queue.current().unwrap().title, "B");
        assert_eq!(queue.current_index(), Some(0));

        assert_eq!(queue.add(track("E")), Err(QueueError::QueueFull(3)));
    }

    #[test]
    fn spotify_track_without_uri_is_rejected() {
        let queue = QueueStore::new(3);
        let mut t = track("A");
        t.source = TrackSource::Spotify;
        t.url = "https://open.spotify.com/track/a".to_string();

        assert_eq!(
            queue.add(t.clone()),
            Err(QueueError::UnresolvedTrack("A".to_string()))
        );
        assert_eq!(queue.add(t.with_playable_uri("https://youtu.be/a")), Ok(0));
    }
}
