//! promptgrid library
//!
//! Batch-runs local llama.cpp models across every combination of model,
//! sampling preset and prompt, and records the generations.

pub mod batch;
pub mod cli;
pub mod error;
pub mod inference;
pub mod storage;
pub mod system;
pub mod types;

pub use error::{BatchError, ErrorKind, Result};
