//! Persistent storage
//!
//! This module handles the project directory layout, input assets, settings and result files.

pub mod assets;
pub mod results;
pub mod settings;

use std::fs;
use std::path::PathBuf;

use crate::error::{BatchError, Result};

/// Fixed directory layout under a project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<name>.bin` + `<name>.json` pairs
    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    /// `*.txt`, one prompt per file
    pub fn prompts_dir(&self) -> PathBuf {
        self.root.join("prompts")
    }

    /// `*.json`, one preset per file
    pub fn presets_dir(&self) -> PathBuf {
        self.root.join("presets")
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join("outputs")
    }

    /// Create the outputs directory if needed and return it
    pub fn ensure_outputs_dir(&self) -> Result<PathBuf> {
        let dir = self.outputs_dir();
        fs::create_dir_all(&dir).map_err(|source| BatchError::Write {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = ProjectLayout::new("/srv/bench");
        assert_eq!(layout.models_dir(), PathBuf::from("/srv/bench/models"));
        assert_eq!(layout.prompts_dir(), PathBuf::from("/srv/bench/prompts"));
        assert_eq!(layout.presets_dir(), PathBuf::from("/srv/bench/presets"));
        assert_eq!(layout.outputs_dir(), PathBuf::from("/srv/bench/outputs"));
    }

    #[test]
    fn test_ensure_outputs_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let outputs = layout.ensure_outputs_dir().unwrap();
        assert!(outputs.is_dir());
        // idempotent
        layout.ensure_outputs_dir().unwrap();
    }
}
