//! Shared type definitions
//!
//! This module contains the data types passed between loader, orchestrator and writer.

pub mod config;
pub mod model;
pub mod preset;
pub mod result;

pub use config::RuntimeOptions;
pub use model::{ModelAsset, ModelConfig};
pub use preset::Preset;
pub use result::{BatchResult, ResultSet};
