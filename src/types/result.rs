//! Result types
//!
//! One `BatchResult` per (model, preset, prompt) combination and the
//! timestamped `ResultSet` that gets persisted.

use serde::{Deserialize, Serialize};

use crate::types::Preset;

/// Output of a single generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Model name (artifact file stem)
    pub model: String,
    /// The user prompt, without the model template around it
    pub prompt: String,
    /// Generated text
    pub output: String,
    pub preset_used: Preset,
}

/// Timestamped collection of results, the unit of persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Local time formatted as `YYYY-MM-DD_HH-MM-SS`
    pub timestamp: String,
    pub results: Vec<BatchResult>,
}

/// Timestamp format shared by the result document and output file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

impl ResultSet {
    /// Stamp `results` with the current local time
    pub fn new(results: Vec<BatchResult>) -> Self {
        Self {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            results,
        }
    }
}
