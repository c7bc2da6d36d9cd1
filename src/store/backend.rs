// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Flat key-value persistence.
//!
//! Values are untyped YAML documents; typing happens in the layer above.
//! The file backend rewrites the whole mapping on every `set`, writing a
//! sibling temp file first and renaming it over the target so a crash
//! never leaves a half-written store behind.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_yaml::Value;
use tracing::warn;

/// Key-value backend error types
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Trait for key-value persistence implementations.
///
/// `set` must be durable when it returns `Ok`, and must leave the
/// previous value readable when it fails.
pub trait KeyValueBackend {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<Value>, BackendError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: Value) -> Result<(), BackendError>;
}

/// Key-value store persisted as a single YAML mapping file
#[derive(Debug)]
pub struct YamlFileBackend {
    /// Store file path
    path: PathBuf,
    /// Last successfully read or written contents
    entries: BTreeMap<String, Value>,
}

impl YamlFileBackend {
    /// Open a store file. A missing file is an empty store; an unreadable
    /// or malformed one is logged and treated as empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_yaml::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring malformed store file {:?}: {}", path, e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read store file {:?}: {}", path, e);
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    /// Get the store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entries: &BTreeMap<String, Value>) -> Result<(), BackendError> {
        let yaml = serde_yaml::to_string(entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = fs::File::create(&tmp)?;
        file.write_all(yaml.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        self.sync_parent()?;
        Ok(())
    }

    /// Flush the directory entry so the rename itself survives a crash
    #[cfg(unix)]
    fn sync_parent(&self) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::File::open(parent)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> io::Result<()> {
        Ok(())
    }
}

impl KeyValueBackend for YamlFileBackend {
    fn get(&self, key: &str) -> Result<Option<Value>, BackendError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), BackendError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value);
        self.write(&next)?;
        self.entries = next;
        Ok(())
    }
}

/// In-memory key-value store.
///
/// Clones share the same entries, so a clone handed to a second store
/// sees what the first one wrote (useful for simulating a restart).
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl MemoryBackend {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Value>, BackendError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), BackendError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let backend = YamlFileBackend::open(dir.path().join("absent.yaml"));
        assert!(backend.get("userRecord").unwrap().is_none());
    }

    #[test]
    fn test_set_persists_across_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.yaml");

        let mut backend = YamlFileBackend::open(&path);
        backend.set("greeting", Value::from("hello")).unwrap();
        assert!(path.exists());

        let reopened = YamlFileBackend::open(&path);
        assert_eq!(reopened.get("greeting").unwrap(), Some(Value::from("hello")));
    }

    #[test]
    fn test_set_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.yaml");

        let mut backend = YamlFileBackend::open(&path);
        backend.set("a", Value::from(1)).unwrap();
        backend.set("b", Value::from(2)).unwrap();

        let reopened = YamlFileBackend::open(&path);
        assert_eq!(reopened.get("a").unwrap(), Some(Value::from(1)));
        assert_eq!(reopened.get("b").unwrap(), Some(Value::from(2)));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.yaml");

        let mut backend = YamlFileBackend::open(&path);
        backend.set("k", Value::from("v")).unwrap();

        assert!(!dir.path().join("store.yaml.tmp").exists());
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        fs::create_dir(&path).unwrap();

        // Renaming a file over a directory fails
        let mut backend = YamlFileBackend::open(&path);
        assert!(backend.set("k", Value::from(1)).is_err());
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.yaml");
        fs::write(&path, "this is not valid yaml: [").unwrap();

        let backend = YamlFileBackend::open(&path);
        assert!(backend.get("userRecord").unwrap().is_none());
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.yaml");

        let mut backend = YamlFileBackend::open(&path);
        backend.set("k", Value::from("v")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_memory_backend_clones_share_entries() {
        let mut first = MemoryBackend::new();
        let second = first.clone();

        first.set("k", Value::from("v")).unwrap();
        assert_eq!(second.get("k").unwrap(), Some(Value::from("v")));
    }
}
