// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The screen's controller.
//!
//! A `Session` receives user intents from a front end, drives the
//! recorder, store, scheduler and sound player, and asks a [`Presenter`]
//! to redraw. Two orthogonal flows exist:
//!
//! - `Idle -> Recording -> Idle` via `toggle_recording`
//! - `Idle -> AwaitingName -> Idle` via stop, prompt, then save or cancel

use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::audio::SoundPlayer;
use crate::music::{Note, Sequence};
use crate::recording::SequenceRecorder;
use crate::sequencer::PlaybackScheduler;
use crate::store::{SavedRecord, SequenceStore, StoreError};

/// Render requests issued by the session
pub trait Presenter {
    /// Show the notes of the take in progress (or just stopped)
    fn show_live_transcript(&mut self, sequence: &[Note]);

    /// Replace the displayed list of saved records
    fn reload_list(&mut self, records: &[SavedRecord]);

    /// Ask the user for a name; the answer arrives via `Session::name_entered`
    fn prompt_for_name(&mut self);
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing in progress
    #[default]
    Idle,
    /// Button presses are being recorded
    Recording,
    /// A take was stopped and the name prompt is open
    AwaitingName,
}

/// Controller wiring user intents to the core components
pub struct Session<P: Presenter> {
    recorder: SequenceRecorder,
    store: SequenceStore,
    scheduler: PlaybackScheduler,
    player: Rc<dyn SoundPlayer>,
    presenter: P,
    state: SessionState,
    selected: Option<usize>,
}

impl<P: Presenter> Session<P> {
    /// Create a session and show the stored records
    pub fn new(
        store: SequenceStore,
        player: Rc<dyn SoundPlayer>,
        scheduler: PlaybackScheduler,
        presenter: P,
    ) -> Self {
        let mut session = Self {
            recorder: SequenceRecorder::new(),
            store,
            scheduler,
            player,
            presenter,
            state: SessionState::Idle,
            selected: None,
        };
        session.presenter.reload_list(session.store.all());
        session
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get the selected row
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Get the record store
    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    /// Get the recorder
    pub fn recorder(&self) -> &SequenceRecorder {
        &self.recorder
    }

    /// Get the presenter
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Get the presenter mutably
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// A note button was pressed: play it and record it if recording
    pub fn button_pressed(&mut self, note: &Note) {
        info!("{} button was pressed", note);

        if let Err(e) = self.player.play(note) {
            warn!("Failed to play {}: {}", note, e);
        }

        if self.recorder.is_recording() {
            self.recorder.append(note.clone());
            self.presenter.show_live_transcript(self.recorder.buffer());
        }
    }

    /// The record button was pressed
    pub fn toggle_recording(&mut self) {
        match self.state {
            SessionState::Idle => {
                self.recorder.start();
                self.state = SessionState::Recording;
                debug!("Recording started");
                self.presenter.show_live_transcript(self.recorder.buffer());
            }
            SessionState::Recording => {
                let take = self.recorder.stop();
                self.state = SessionState::AwaitingName;
                debug!("Recording stopped with {} notes", take.len());
                self.presenter.show_live_transcript(&take);
                self.presenter.prompt_for_name();
            }
            SessionState::AwaitingName => {
                debug!("Ignoring record toggle while the name prompt is open");
            }
        }
    }

    /// The name prompt was answered; `None` means cancel.
    ///
    /// On cancel the take is dropped when the next recording starts.
    pub fn name_entered(&mut self, name: Option<String>) {
        if self.state != SessionState::AwaitingName {
            debug!("Ignoring name outside of the name prompt");
            return;
        }
        self.state = SessionState::Idle;

        let Some(name) = name else {
            debug!("Save cancelled");
            return;
        };

        let take: Sequence = self.recorder.buffer().to_vec();
        match self.store.save(name, take) {
            Ok(()) => {
                self.recorder.reset();
                self.selected = None;
                self.presenter.reload_list(self.store.all());
            }
            Err(e) => error!("Failed to save record: {}", e),
        }
    }

    /// A row of the saved list was selected
    pub fn row_selected(&mut self, position: usize) {
        if position < self.store.len() {
            self.selected = Some(position);
        } else {
            warn!("Ignoring selection of row {} (out of range)", position);
        }
    }

    /// A row of the saved list was deleted
    pub fn row_deleted(&mut self, position: usize) -> Result<(), StoreError> {
        if let Err(e) = self.store.delete(position) {
            error!("Failed to delete row {}: {}", position, e);
            return Err(e);
        }

        self.selected = match self.selected {
            Some(s) if s == position => None,
            Some(s) if s > position => Some(s - 1),
            other => other,
        };
        self.presenter.reload_list(self.store.all());
        Ok(())
    }

    /// Replay the selected record
    pub fn play_selected(&mut self) {
        let Some(record) = self.selected.and_then(|i| self.store.get(i)) else {
            info!("No record selected");
            return;
        };

        info!("Playing record {:?}", record.name);
        self.scheduler.play(record.record.clone());
    }

    /// Drop every note still pending from earlier plays
    pub fn stop_playback(&mut self) {
        self.scheduler.cancel();
    }
}
