// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback of saved sequences.
//!
//! Each note becomes its own timer task on the current `LocalSet`, due at
//! `index * note_delay` after `play` was called. Tasks are independent:
//! a failing note is logged and the rest still play.
//!
//! Every task carries the playback generation it was scheduled under and
//! does nothing if the generation has moved on by the time it fires.
//! `cancel()` always moves it on; `play` moves it on only under
//! [`PlaybackPolicy::Restart`]. Under the default
//! [`PlaybackPolicy::Overlap`] repeated plays interleave their notes.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::audio::SoundPlayer;
use crate::music::{Note, Sequence};

/// Delay between consecutive notes of a replayed sequence
pub const FIXED_DELAY: Duration = Duration::from_millis(500);

/// What a new `play` does to notes still pending from earlier plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPolicy {
    /// Leave them scheduled; both sequences interleave
    #[default]
    Overlap,
    /// Drop them; only the newest sequence plays
    Restart,
}

/// Schedules sound player calls for a sequence at fixed offsets.
///
/// Must be used from within a `tokio::task::LocalSet`.
pub struct PlaybackScheduler {
    /// Player invoked for every note
    player: Rc<dyn SoundPlayer>,
    /// Offset between consecutive notes
    note_delay: Duration,
    /// Behaviour of overlapping plays
    policy: PlaybackPolicy,
    /// Current playback generation
    generation: Rc<Cell<u64>>,
}

impl PlaybackScheduler {
    /// Create a scheduler with the fixed 500 ms delay and overlapping plays
    pub fn new(player: Rc<dyn SoundPlayer>) -> Self {
        Self {
            player,
            note_delay: FIXED_DELAY,
            policy: PlaybackPolicy::default(),
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// Set the delay between notes
    pub fn with_note_delay(mut self, delay: Duration) -> Self {
        self.note_delay = delay;
        self
    }

    /// Set the overlap policy
    pub fn with_policy(mut self, policy: PlaybackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the delay between notes
    pub fn note_delay(&self) -> Duration {
        self.note_delay
    }

    /// Get the overlap policy
    pub fn policy(&self) -> PlaybackPolicy {
        self.policy
    }

    /// Get the current playback generation
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Invalidate every pending note
    pub fn cancel(&self) {
        self.generation.set(self.generation.get() + 1);
        debug!("Playback cancelled, generation {}", self.generation.get());
    }

    /// Total time from `play` to the last note of `sequence`
    pub fn span(&self, sequence: &[Note]) -> Duration {
        self.note_delay * sequence.len().saturating_sub(1) as u32
    }

    /// Schedule every note of `sequence`. An empty sequence does nothing.
    pub fn play(&self, sequence: Sequence) {
        if sequence.is_empty() {
            return;
        }

        if self.policy == PlaybackPolicy::Restart {
            self.cancel();
        }
        let generation = self.generation.get();
        let start = Instant::now();

        debug!(
            "Scheduling {} notes, generation {}",
            sequence.len(),
            generation
        );

        for (index, note) in sequence.into_iter().enumerate() {
            let due = start + self.note_delay * index as u32;
            let player = Rc::clone(&self.player);
            let current = Rc::clone(&self.generation);

            tokio::task::spawn_local(async move {
                time::sleep_until(due).await;

                if current.get() != generation {
                    debug!("Skipping stale note {} from generation {}", note, generation);
                    return;
                }

                if let Err(e) = player.play(&note) {
                    warn!("Failed to play {}: {}", note, e);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundError;
    use std::cell::RefCell;
    use tokio::task::LocalSet;

    /// Mock player recording each call and when it happened
    struct MockPlayer {
        start: Instant,
        calls: RefCell<Vec<(Note, Duration)>>,
        missing: Vec<Note>,
    }

    impl MockPlayer {
        fn new() -> Rc<Self> {
            Self::with_missing(&[])
        }

        fn with_missing(missing: &[&str]) -> Rc<Self> {
            Rc::new(Self {
                start: Instant::now(),
                calls: RefCell::new(Vec::new()),
                missing: missing.iter().map(|n| Note::from(*n)).collect(),
            })
        }

        fn notes(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .map(|(note, _)| note.to_string())
                .collect()
        }

        fn offsets_ms(&self) -> Vec<u128> {
            self.calls
                .borrow()
                .iter()
                .map(|(_, at)| at.as_millis())
                .collect()
        }
    }

    impl SoundPlayer for MockPlayer {
        fn play(&self, note: &Note) -> Result<(), SoundError> {
            self.calls
                .borrow_mut()
                .push((note.clone(), self.start.elapsed()));
            if self.missing.contains(note) {
                return Err(SoundError::AssetNotFound(note.clone()));
            }
            Ok(())
        }
    }

    fn seq(names: &[&str]) -> Sequence {
        names.iter().map(|n| Note::from(*n)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_sequence_plays_nothing() {
        let local = LocalSet::new();
        let player = MockPlayer::new();
        let scheduler = PlaybackScheduler::new(player.clone());

        local
            .run_until(async {
                scheduler.play(Vec::new());
                time::sleep(Duration::from_secs(2)).await;
            })
            .await;

        assert!(player.calls.borrow().is_empty());
        assert_eq!(scheduler.generation(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notes_at_fixed_offsets() {
        let local = LocalSet::new();
        let player = MockPlayer::new();
        let scheduler = PlaybackScheduler::new(player.clone());

        local
            .run_until(async {
                scheduler.play(seq(&["C", "D", "E"]));
                time::sleep(Duration::from_millis(1200)).await;
            })
            .await;

        assert_eq!(player.notes(), vec!["C", "D", "E"]);
        let offsets = player.offsets_ms();
        for (actual, expected) in offsets.iter().zip([0u128, 500, 1000]) {
            assert!(
                *actual >= expected && *actual < expected + 5,
                "note at {}ms, expected {}ms",
                actual,
                expected
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_plays_early() {
        let local = LocalSet::new();
        let player = MockPlayer::new();
        let scheduler = PlaybackScheduler::new(player.clone());

        local
            .run_until(async {
                scheduler.play(seq(&["C", "D", "E"]));
                time::sleep(Duration::from_millis(700)).await;
            })
            .await;

        assert_eq!(player.notes(), vec!["C", "D"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_note_does_not_abort_schedule() {
        let local = LocalSet::new();
        let player = MockPlayer::with_missing(&["X"]);
        let scheduler = PlaybackScheduler::new(player.clone());

        local
            .run_until(async {
                scheduler.play(seq(&["C", "X", "E"]));
                time::sleep(Duration::from_millis(1200)).await;
            })
            .await;

        assert_eq!(player.notes(), vec!["C", "X", "E"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_plays_interleave() {
        let local = LocalSet::new();
        let player = MockPlayer::new();
        let scheduler = PlaybackScheduler::new(player.clone());

        local
            .run_until(async {
                scheduler.play(seq(&["C", "D", "E"]));
                time::sleep(Duration::from_millis(250)).await;
                scheduler.play(seq(&["A", "B"]));
                time::sleep(Duration::from_millis(1200)).await;
            })
            .await;

        // C@0 A@250 D@500 B@750 E@1000
        assert_eq!(player.notes(), vec!["C", "A", "D", "B", "E"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_policy_drops_stale_notes() {
        let local = LocalSet::new();
        let player = MockPlayer::new();
        let scheduler =
            PlaybackScheduler::new(player.clone()).with_policy(PlaybackPolicy::Restart);

        local
            .run_until(async {
                scheduler.play(seq(&["C", "D", "E"]));
                time::sleep(Duration::from_millis(250)).await;
                scheduler.play(seq(&["A", "B"]));
                time::sleep(Duration::from_millis(1200)).await;
            })
            .await;

        assert_eq!(player.notes(), vec!["C", "A", "B"]);
        assert_eq!(scheduler.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_notes() {
        let local = LocalSet::new();
        let player = MockPlayer::new();
        let scheduler = PlaybackScheduler::new(player.clone());

        local
            .run_until(async {
                scheduler.play(seq(&["C", "D", "E"]));
                time::sleep(Duration::from_millis(600)).await;
                scheduler.cancel();
                time::sleep(Duration::from_millis(1000)).await;
            })
            .await;

        assert_eq!(player.notes(), vec!["C", "D"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_note_delay() {
        let local = LocalSet::new();
        let player = MockPlayer::new();
        let scheduler =
            PlaybackScheduler::new(player.clone()).with_note_delay(Duration::from_millis(100));

        local
            .run_until(async {
                scheduler.play(seq(&["C", "D"]));
                time::sleep(Duration::from_millis(150)).await;
            })
            .await;

        assert_eq!(player.notes(), vec!["C", "D"]);
    }

    #[test]
    fn test_span() {
        let scheduler = PlaybackScheduler::new(Rc::new(crate::audio::SilentPlayer));
        assert_eq!(scheduler.span(&[]), Duration::ZERO);
        assert_eq!(scheduler.span(&seq(&["C"])), Duration::ZERO);
        assert_eq!(scheduler.span(&seq(&["C", "D", "E"])), Duration::from_millis(1000));
    }

    #[test]
    fn test_policy_from_config_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: PlaybackPolicy,
        }
        let parsed: Wrapper = toml::from_str("policy = \"restart\"").unwrap();
        assert_eq!(parsed.policy, PlaybackPolicy::Restart);
    }
}
