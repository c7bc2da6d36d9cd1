// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Persistent store of named note sequences.
//!
//! Records are kept newest first under a single key of a flat key-value
//! backend. Every save or delete rewrites the whole collection, so a
//! mutation costs O(n) in the number of stored records. Collections are
//! human-sized, so there is no incremental log.
//!
//! Mutations are persist-then-acknowledge: the new collection is written
//! to the backend first and only then becomes visible through `all()`.
//! A failed write leaves the in-memory collection untouched.

pub mod backend;

pub use backend::{BackendError, KeyValueBackend, MemoryBackend, YamlFileBackend};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{info, warn};

use crate::music::Sequence;

/// Default key the record collection is stored under
pub const DEFAULT_STORE_KEY: &str = "userRecord";

/// A named, persisted sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRecord {
    /// User-chosen name (not required to be unique)
    pub name: String,
    /// Recorded notes
    pub record: Sequence,
}

impl SavedRecord {
    /// Create a new record
    pub fn new(name: impl Into<String>, record: Sequence) -> Self {
        Self {
            name: name.into(),
            record,
        }
    }
}

/// A persisted entry that was dropped on load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry {
    /// Position in the persisted list (None if the whole value was unusable)
    pub position: Option<usize>,
    /// Why the entry was dropped
    pub reason: String,
}

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Position {position} out of range (store holds {len} records)")]
    OutOfRange { position: usize, len: usize },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

type Diagnostics = Box<dyn FnMut(&MalformedEntry)>;

/// Sequence store owning its persistence handle
pub struct SequenceStore {
    /// Key-value backend
    backend: Box<dyn KeyValueBackend>,
    /// Key the collection is stored under
    key: String,
    /// In-memory collection, newest first
    records: Vec<SavedRecord>,
    /// Optional callback for dropped entries
    diagnostics: Option<Diagnostics>,
}

impl SequenceStore {
    /// Open a store over `backend` and load the collection under `key`
    pub fn open(backend: impl KeyValueBackend + 'static, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend: Box::new(backend),
            key: key.into(),
            records: Vec::new(),
            diagnostics: None,
        };
        store.load();
        store
    }

    /// Open a store, reporting every dropped entry to `diagnostics`
    pub fn with_diagnostics<F>(
        backend: impl KeyValueBackend + 'static,
        key: impl Into<String>,
        diagnostics: F,
    ) -> Self
    where
        F: FnMut(&MalformedEntry) + 'static,
    {
        let mut store = Self {
            backend: Box::new(backend),
            key: key.into(),
            records: Vec::new(),
            diagnostics: Some(Box::new(diagnostics)),
        };
        store.load();
        store
    }

    /// Re-read the collection from the backend.
    ///
    /// Never fails: an absent key, a backend error or a value of the
    /// wrong shape all yield an empty collection, and entries that do not
    /// parse as records are skipped.
    pub fn load(&mut self) -> &[SavedRecord] {
        let value = match self.backend.get(&self.key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read records under {:?}: {}", self.key, e);
                None
            }
        };

        self.records = match value {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => self.parse_entries(items),
            Some(_) => {
                self.report(MalformedEntry {
                    position: None,
                    reason: "stored value is not a list".to_string(),
                });
                Vec::new()
            }
        };

        &self.records
    }

    fn parse_entries(&mut self, items: Vec<Value>) -> Vec<SavedRecord> {
        let mut records = Vec::with_capacity(items.len());
        for (position, item) in items.into_iter().enumerate() {
            match serde_yaml::from_value::<SavedRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => self.report(MalformedEntry {
                    position: Some(position),
                    reason: e.to_string(),
                }),
            }
        }
        records
    }

    fn report(&mut self, entry: MalformedEntry) {
        warn!(
            "Dropping malformed record entry {:?}: {}",
            entry.position, entry.reason
        );
        if let Some(ref mut diagnostics) = self.diagnostics {
            diagnostics(&entry);
        }
    }

    /// Save a new record at position 0 and persist the collection
    pub fn save(&mut self, name: impl Into<String>, sequence: Sequence) -> Result<(), StoreError> {
        let record = SavedRecord::new(name, sequence);
        info!(
            "Saving record {:?} ({} notes)",
            record.name,
            record.record.len()
        );

        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record);
        next.extend(self.records.iter().cloned());

        self.persist(&next)?;
        self.records = next;
        Ok(())
    }

    /// Delete the record at `position` and persist the collection
    pub fn delete(&mut self, position: usize) -> Result<SavedRecord, StoreError> {
        if position >= self.records.len() {
            return Err(StoreError::OutOfRange {
                position,
                len: self.records.len(),
            });
        }

        let mut next = self.records.clone();
        let removed = next.remove(position);

        self.persist(&next)?;
        self.records = next;
        info!("Deleted record {:?} at position {}", removed.name, position);
        Ok(removed)
    }

    fn persist(&mut self, records: &[SavedRecord]) -> Result<(), StoreError> {
        let value = serde_yaml::to_value(records).map_err(BackendError::from)?;
        self.backend.set(&self.key, value)?;
        Ok(())
    }

    /// Current snapshot, newest first
    pub fn all(&self) -> &[SavedRecord] {
        &self.records
    }

    /// Get the record at `position`
    pub fn get(&self, position: usize) -> Option<&SavedRecord> {
        self.records.get(position)
    }

    /// Get number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the backend key
    pub fn key(&self) -> &str {
        &self.key
    }
}
