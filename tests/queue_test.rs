mod common;

use std::{sync::Arc, thread};

use proptest::prelude::*;
use psychosonus::{error::QueueError, management::QueueStore};

use common::track;

fn titles(queue: &QueueStore) -> Vec<String> {
    queue
        .snapshot()
        .unwrap()
        .into_iter()
        .map(|e| e.track.title)
        .collect()
}

fn filled(titles: &[&str], max: usize) -> QueueStore {
    let queue = QueueStore::new(max);
    for title in titles {
        queue.add(track(title)).unwrap();
    }
    queue
}

#[test]
fn test_add_returns_index_in_play_order() {
    let queue = QueueStore::new(10);
    assert_eq!(queue.add(track("A")), Ok(0));
    assert_eq!(queue.add(track("B")), Ok(1));
    assert_eq!(titles(&queue), vec!["A", "B"]);
    assert_eq!(queue.current_index(), None);
    assert_eq!(queue.upcoming_len(), 2);
}

#[test]
fn test_add_to_full_queue_without_history_fails() {
    let queue = filled(&["A", "B"], 2);

    assert_eq!(queue.add(track("C")), Err(QueueError::QueueFull(2)));
    assert_eq!(titles(&queue), vec!["A", "B"]);
}

#[test]
fn test_advance_walks_queue_and_drains_at_end() {
    let queue = filled(&["A", "B"], 10);

    assert_eq!(queue.advance().unwrap().unwrap().title, "A");
    assert_eq!(queue.current_index(), Some(0));
    assert_eq!(queue.advance().unwrap().unwrap().title, "B");
    assert_eq!(queue.current_index(), Some(1));
    assert!(queue.has_history());

    assert_eq!(queue.advance(), Ok(None));
    assert_eq!(queue.current_index(), None);
    assert!(queue.is_empty());
}

#[test]
fn test_advance_on_empty_queue() {
    let queue = QueueStore::new(3);
    assert_eq!(queue.advance(), Ok(None));
    assert_eq!(queue.current(), None);
}

#[test]
fn test_rewind_steps_back_once() {
    let queue = filled(&["A", "B"], 10);
    queue.advance().unwrap();
    queue.advance().unwrap();

    assert_eq!(queue.rewind().unwrap().unwrap().title, "A");
    assert_eq!(queue.rewind(), Ok(None));
    assert_eq!(queue.current().unwrap().title, "A");
}

#[test]
fn test_remove_current_is_rejected() {
    let queue = filled(&["A", "B", "C"], 10);
    queue.advance().unwrap();
    queue.advance().unwrap();

    assert_eq!(queue.remove_at(1), Err(QueueError::IndexOutOfRange(1)));
    assert_eq!(queue.remove_at(3), Err(QueueError::IndexOutOfRange(3)));
    assert_eq!(queue.len(), 3);
}

#[test]
fn test_remove_before_current_shifts_cursor() {
    let queue = filled(&["A", "B", "C"], 10);
    queue.advance().unwrap();
    queue.advance().unwrap();

    assert_eq!(queue.remove_at(0).unwrap().title, "A");
    assert_eq!(queue.current_index(), Some(0));
    assert_eq!(queue.current().unwrap().title, "B");

    assert_eq!(queue.remove_at(1).unwrap().title, "C");
    assert_eq!(queue.current_index(), Some(0));
}

#[test]
fn test_view_splits_current_and_upcoming() {
    let queue = filled(&["A", "B", "C"], 10);
    queue.advance().unwrap();
    queue.advance().unwrap();

    let view = queue.view().unwrap();
    assert_eq!(view.current_track.unwrap().title, "B");
    assert_eq!(
        view.upcoming.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
        vec!["C"]
    );
    assert_eq!(view.history_len, 1);

    let entries = queue.snapshot().unwrap();
    assert!(entries[1].is_current);
    assert!(!entries[0].is_current && !entries[2].is_current);
}

#[test]
fn test_clear_resets_everything() {
    let queue = filled(&["A", "B"], 10);
    queue.advance().unwrap();
    queue.clear();

    assert!(queue.is_empty());
    assert_eq!(queue.current_index(), None);
    assert_eq!(queue.view().unwrap(), Default::default());
}

#[test]
fn test_shuffle_keeps_current_and_history_in_place() {
    let names: Vec<String> = (0..30).map(|i| format!("T{i}")).collect();
    let queue = QueueStore::new(100);
    for name in &names {
        queue.add(track(name)).unwrap();
    }
    for _ in 0..5 {
        queue.advance().unwrap();
    }

    queue.shuffle().unwrap();

    let after = titles(&queue);
    assert_eq!(&after[..5], &names[..5]);
    assert_eq!(queue.current().unwrap().title, "T4");

    let mut rest = after[5..].to_vec();
    rest.sort();
    let mut expected = names[5..].to_vec();
    expected.sort();
    assert_eq!(rest, expected);
}

#[test]
fn test_concurrent_adds_respect_capacity() {
    let queue = Arc::new(QueueStore::new(100));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                (0..50)
                    .filter(|i| queue.add(track(&format!("{t}-{i}"))).is_ok())
                    .count()
            })
        })
        .collect();

    let added: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(added, 100);
    assert_eq!(queue.len(), 100);
}

#[test]
fn test_concurrent_mixed_operations_keep_cursor_valid() {
    let queue = Arc::new(filled(&["A", "B", "C", "D"], 20));
    queue.advance().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..200 {
                    match (t + i) % 5 {
                        0 => {
                            let _ = queue.add(track(&format!("{t}-{i}")));
                        }
                        1 => {
                            let _ = queue.remove_at(i % 7);
                        }
                        2 => queue.shuffle().unwrap(),
                        3 => {
                            queue.advance().unwrap();
                        }
                        _ => {
                            queue.snapshot().unwrap();
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(queue.len() <= 20);
    if let Some(index) = queue.current_index() {
        assert!(index < queue.len());
    }
}

proptest! {
    #[test]
    fn prop_length_never_exceeds_cap(cap in 1usize..20, adds in 0usize..60) {
        let queue = QueueStore::new(cap);
        let mut ok = 0;
        for i in 0..adds {
            if queue.add(track(&format!("T{i}"))).is_ok() {
                ok += 1;
            }
            prop_assert!(queue.len() <= cap);
        }
        prop_assert_eq!(ok, adds.min(cap));
    }

    #[test]
    fn prop_remove_keeps_current_track(len in 2usize..20, played in 1usize..20, pick in 0usize..20) {
        let played = played.min(len);
        let queue = QueueStore::new(50);
        for i in 0..len {
            queue.add(track(&format!("T{i}"))).unwrap();
        }
        for _ in 0..played {
            queue.advance().unwrap();
        }
        let current = queue.current().unwrap();
        let index = queue.current_index().unwrap();
        let pick = pick % len;

        let result = queue.remove_at(pick);
        if pick == index {
            prop_assert_eq!(result, Err(QueueError::IndexOutOfRange(pick)));
            prop_assert_eq!(queue.len(), len);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(queue.len(), len - 1);
            let expected = if pick < index { index - 1 } else { index };
            prop_assert_eq!(queue.current_index(), Some(expected));
        }
        prop_assert_eq!(queue.current().unwrap(), current);
    }

    #[test]
    fn prop_shuffle_is_a_permutation(len in 0usize..30, played in 0usize..30) {
        let queue = QueueStore::new(50);
        for i in 0..len {
            queue.add(track(&format!("T{i}"))).unwrap();
        }
        for _ in 0..played.min(len) {
            queue.advance().unwrap();
        }
        let before = titles(&queue);
        let current = queue.current_index();

        queue.shuffle().unwrap();

        let after = titles(&queue);
        prop_assert_eq!(queue.current_index(), current);
        let fixed = current.map_or(0, |i| i + 1);
        prop_assert_eq!(&after[..fixed], &before[..fixed]);

        let mut a = after.clone();
        let mut b = before.clone();
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
    }
}
