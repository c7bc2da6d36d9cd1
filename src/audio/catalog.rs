// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bundled sound asset lookup.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::SoundError;
use crate::music::Note;

/// Asset file extension
pub const ASSET_EXTENSION: &str = "wav";

/// Read-only directory of `<note>.wav` assets
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
}

impl AssetCatalog {
    /// Create a catalog rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the catalog directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a note to its asset path
    pub fn resolve(&self, note: &Note) -> Result<PathBuf, SoundError> {
        let file_name = format!("{}.{}", note.as_str(), ASSET_EXTENSION);

        // A note names a single file inside the catalog, nothing else
        let mut components = Path::new(&file_name).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single {
            return Err(SoundError::AssetNotFound(note.clone()));
        }

        let path = self.root.join(file_name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(SoundError::AssetNotFound(note.clone()))
        }
    }

    /// Check if the catalog has an asset for `note`
    pub fn contains(&self, note: &Note) -> bool {
        self.resolve(note).is_ok()
    }

    /// List the notes available in the catalog, sorted by name
    pub fn notes(&self) -> io::Result<Vec<Note>> {
        let mut notes: Vec<Note> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext == ASSET_EXTENSION)
                    .unwrap_or(false)
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(Note::from)
            })
            .collect();
        notes.sort();
        Ok(notes)
    }
}
