// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for xylo
//!
//! These tests verify that multiple components work together correctly.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tempfile::tempdir;
use tokio::task::LocalSet;
use tokio::time::Instant;

use xylo::audio::{SoundError, SoundPlayer};
use xylo::config::AppConfig;
use xylo::music::{Note, Sequence};
use xylo::sequencer::{PlaybackPolicy, PlaybackScheduler};
use xylo::session::{Presenter, Session, SessionState};
use xylo::store::{
    KeyValueBackend, MalformedEntry, MemoryBackend, SavedRecord, SequenceStore, YamlFileBackend,
    DEFAULT_STORE_KEY,
};

/// Player recording each note with the time it was played
struct TimedPlayer {
    start: Instant,
    calls: RefCell<Vec<(Note, Duration)>>,
}

impl TimedPlayer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn notes(&self) -> Vec<Note> {
        self.calls.borrow().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl SoundPlayer for TimedPlayer {
    fn play(&self, note: &Note) -> Result<(), SoundError> {
        self.calls
            .borrow_mut()
            .push((note.clone(), self.start.elapsed()));
        Ok(())
    }
}

/// Presenter that only remembers the latest list
#[derive(Default)]
struct ListPresenter {
    rows: Vec<SavedRecord>,
    prompts: usize,
}

impl Presenter for ListPresenter {
    fn show_live_transcript(&mut self, _sequence: &[Note]) {}

    fn reload_list(&mut self, records: &[SavedRecord]) {
        self.rows = records.to_vec();
    }

    fn prompt_for_name(&mut self) {
        self.prompts += 1;
    }
}

fn seq(names: &[&str]) -> Sequence {
    names.iter().map(|n| Note::from(*n)).collect()
}

fn assert_near(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff <= Duration::from_millis(5),
        "played at {:?}, expected {:?}",
        actual,
        expected
    );
}

/// Record, name, replay and delete a take end to end
#[tokio::test(start_paused = true)]
async fn test_record_save_play_delete_scenario() {
    LocalSet::new()
        .run_until(async {
            let player = Rc::new(TimedPlayer::new());
            let store = SequenceStore::open(MemoryBackend::new(), DEFAULT_STORE_KEY);
            let scheduler = PlaybackScheduler::new(player.clone());
            let mut session =
                Session::new(store, player.clone(), scheduler, ListPresenter::default());

            session.toggle_recording();
            for n in ["C", "D", "E"] {
                session.button_pressed(&Note::from(n));
            }
            session.toggle_recording();
            assert_eq!(session.state(), SessionState::AwaitingName);
            assert_eq!(session.presenter().prompts, 1);

            session.name_entered(Some("scale1".to_string()));
            assert_eq!(
                session.store().all()[0],
                SavedRecord::new("scale1", seq(&["C", "D", "E"]))
            );
            assert_eq!(session.presenter().rows.len(), 1);

            // Live presses were played immediately
            player.calls.borrow_mut().clear();

            session.row_selected(0);
            let played_from = player.start.elapsed();
            session.play_selected();
            tokio::time::sleep(Duration::from_millis(1500)).await;

            let calls = player.calls.borrow().clone();
            assert_eq!(player.notes(), seq(&["C", "D", "E"]));
            for (i, (_, at)) in calls.iter().enumerate() {
                assert_near(*at - played_from, 500 * i as u64);
            }

            session.row_deleted(0).unwrap();
            assert!(session.store().is_empty());
            assert!(session.presenter().rows.is_empty());
            assert_eq!(session.selected(), None);
        })
        .await;
}

/// Records survive a restart of the file-backed store
#[test]
fn test_file_store_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.yaml");

    {
        let mut store = SequenceStore::open(YamlFileBackend::open(&path), DEFAULT_STORE_KEY);
        store.save("first", seq(&["C", "E"])).unwrap();
        store.save("second", seq(&["G", "G", "A"])).unwrap();
        store.save("first", seq(&[])).unwrap();
        store.delete(1).unwrap();
    }

    let reopened = SequenceStore::open(YamlFileBackend::open(&path), DEFAULT_STORE_KEY);
    assert_eq!(
        reopened.all(),
        &[
            SavedRecord::new("first", seq(&[])),
            SavedRecord::new("first", seq(&["C", "E"])),
        ]
    );
}

/// A store written by hand with junk entries keeps only the good ones
#[test]
fn test_hand_edited_store_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.yaml");
    std::fs::write(
        &path,
        r#"
userRecord:
  - name: tune
    record: [C, D]
  - name: broken
  - 42
  - name: other
    record: [B]
"#,
    )
    .unwrap();

    let dropped = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&dropped);
    let store = SequenceStore::with_diagnostics(
        YamlFileBackend::open(&path),
        DEFAULT_STORE_KEY,
        move |entry: &MalformedEntry| sink.borrow_mut().push(entry.position),
    );

    assert_eq!(store.len(), 2);
    assert_eq!(store.get(0).unwrap().name, "tune");
    assert_eq!(store.get(1).unwrap().name, "other");
    assert_eq!(*dropped.borrow(), vec![Some(1), Some(2)]);
}

/// Sessions built over the same memory backend see each other's saves
#[test]
fn test_memory_backend_shared_between_sessions() {
    let backend = MemoryBackend::new();
    let player: Rc<dyn SoundPlayer> = Rc::new(TimedPlayer::new());

    {
        let store = SequenceStore::open(backend.clone(), DEFAULT_STORE_KEY);
        let scheduler = PlaybackScheduler::new(Rc::clone(&player));
        let mut session = Session::new(store, Rc::clone(&player), scheduler, ListPresenter::default());
        session.toggle_recording();
        session.button_pressed(&Note::from("F"));
        session.toggle_recording();
        session.name_entered(Some("solo".to_string()));
    }

    assert!(backend.get(DEFAULT_STORE_KEY).unwrap().is_some());

    let store = SequenceStore::open(backend, DEFAULT_STORE_KEY);
    let scheduler = PlaybackScheduler::new(Rc::clone(&player));
    let session = Session::new(store, player, scheduler, ListPresenter::default());
    assert_eq!(session.presenter().rows, vec![SavedRecord::new("solo", seq(&["F"]))]);
}

/// Playing an empty record schedules nothing
#[tokio::test(start_paused = true)]
async fn test_empty_record_plays_nothing() {
    LocalSet::new()
        .run_until(async {
            let player = Rc::new(TimedPlayer::new());
            let scheduler = PlaybackScheduler::new(player.clone());
            scheduler.play(Vec::new());
            tokio::time::sleep(Duration::from_secs(2)).await;
            assert!(player.calls.borrow().is_empty());
        })
        .await;
}

/// Scheduler settings taken from a config file
#[tokio::test(start_paused = true)]
async fn test_config_drives_scheduler() {
    let config = AppConfig::from_toml(
        r#"
[playback]
note_delay_ms = 250
policy = "restart"
"#,
    )
    .unwrap();

    LocalSet::new()
        .run_until(async {
            let player = Rc::new(TimedPlayer::new());
            let scheduler = PlaybackScheduler::new(player.clone())
                .with_note_delay(config.playback.note_delay())
                .with_policy(config.playback.policy);
            assert_eq!(scheduler.policy(), PlaybackPolicy::Restart);

            scheduler.play(seq(&["A", "B", "C"]));
            tokio::time::sleep(Duration::from_millis(300)).await;
            scheduler.play(seq(&["D"]));
            tokio::time::sleep(Duration::from_secs(1)).await;

            assert_eq!(player.notes(), seq(&["A", "B", "D"]));
            let calls = player.calls.borrow();
            assert_near(calls[1].1, 250);
        })
        .await;
}
