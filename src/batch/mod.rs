//! Batch orchestration
//!
//! Runs every model against every preset and prompt, then persists the results.

pub mod runner;

pub use runner::{run, run_matrix, BatchReport};
