//! LLM inference engine
//!
//! This module handles all interaction with llama-cpp for model loading and generation,
//! plus the per-model prompt template.

pub mod engine;
pub mod prompt;

// Re-export main types for convenience
pub use engine::{EngineError, EngineLoader, GenerationParams, LlamaEngine, LlamaLoader, TextEngine};
pub use prompt::compose;
