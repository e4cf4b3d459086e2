//! Generation engine
//!
//! `LlamaLoader` owns the llama.cpp backend and loads one `LlamaEngine` per
//! model artifact. An engine is reused for every (preset, prompt) pair run
//! against its model and frees the weights when dropped.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::{send_logs_to_tracing, LogOptions};
use thiserror::Error;

use crate::types::{Preset, RuntimeOptions};

/// Tokens considered by the repetition penalties
const PENALTY_LAST_N: i32 = 64;
/// Candidate count used by mirostat v1
const MIROSTAT_M: i32 = 100;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to initialize llama backend: {0}")]
    Backend(String),
    #[error("Failed to load model {}: {message}", path.display())]
    ModelLoad { path: PathBuf, message: String },
    #[error("Failed to create context: {0}")]
    Context(String),
    #[error("Tokenization failed: {0}")]
    Tokenize(String),
    #[error("Prompt is {tokens} tokens but the context window is {n_ctx}")]
    PromptTooLong { tokens: usize, n_ctx: u32 },
    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Sampling parameters and token budget for one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub tfs_z: f32,
    pub temperature: f32,
    pub top_k: i32,
    pub top_p: f32,
    pub mirostat_mode: i32,
    pub mirostat_eta: f32,
    pub mirostat_tau: f32,
    pub repeat_penalty: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

impl GenerationParams {
    pub fn from_preset(preset: &Preset, max_tokens: u32) -> Self {
        Self {
            tfs_z: preset.tfs_z as f32,
            temperature: preset.temperature as f32,
            top_k: preset.top_k,
            top_p: preset.top_p as f32,
            mirostat_mode: preset.mirostat_mode,
            mirostat_eta: preset.mirostat_eta as f32,
            mirostat_tau: preset.mirostat_tau as f32,
            repeat_penalty: preset.repeat_penalty as f32,
            presence_penalty: preset.presence_penalty as f32,
            frequency_penalty: preset.frequency_penalty as f32,
            max_tokens,
        }
    }
}

/// A loaded model that can answer a prompt
pub trait TextEngine {
    /// Run one blocking generation and return the generated text
    fn generate(&mut self, prompt: &str, params: &GenerationParams) -> Result<String, EngineError>;
}

/// Builds engines from model artifacts
pub trait EngineLoader {
    type Engine: TextEngine;

    fn load(&self, artifact: &Path, options: &RuntimeOptions) -> Result<Self::Engine, EngineError>;
}

/// llama.cpp backend handle
pub struct LlamaLoader {
    backend: Arc<LlamaBackend>,
}

impl LlamaLoader {
    /// Initialize the backend. Can only succeed once per process.
    pub fn init(verbose: bool) -> Result<Self, EngineError> {
        send_logs_to_tracing(LogOptions::default().with_logs_enabled(verbose));

        let backend = LlamaBackend::init().map_err(|e| EngineError::Backend(e.to_string()))?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }
}

impl EngineLoader for LlamaLoader {
    type Engine = LlamaEngine;

    fn load(&self, artifact: &Path, options: &RuntimeOptions) -> Result<LlamaEngine, EngineError> {
        tracing::info!(
            "Loading model {} (threads: {}, ctx: {}, mlock: {})",
            artifact.display(),
            options.n_threads,
            options.n_ctx,
            options.use_mlock
        );

        let model_params = LlamaModelParams::default().with_use_mlock(options.use_mlock);
        let model = LlamaModel::load_from_file(&self.backend, artifact, &model_params).map_err(|e| {
            EngineError::ModelLoad {
                path: artifact.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        Ok(LlamaEngine {
            model,
            backend: Arc::clone(&self.backend),
            options: options.clone(),
        })
    }
}

/// A model resident in memory
pub struct LlamaEngine {
    model: LlamaModel,
    backend: Arc<LlamaBackend>,
    options: RuntimeOptions,
}

impl LlamaEngine {
    fn build_sampler(&self, params: &GenerationParams) -> LlamaSampler {
        if params.tfs_z != 1.0 {
            tracing::debug!(
                "tfs_z = {} has no effect, tail-free sampling is not available in llama.cpp",
                params.tfs_z
            );
        }

        let seed = self.options.seed;
        let penalties = LlamaSampler::penalties(
            PENALTY_LAST_N,
            params.repeat_penalty,
            params.frequency_penalty,
            params.presence_penalty,
        );

        let chain = match params.mirostat_mode {
            1 => vec![
                penalties,
                LlamaSampler::temp(params.temperature),
                LlamaSampler::mirostat(
                    self.model.n_vocab(),
                    seed,
                    params.mirostat_tau,
                    params.mirostat_eta,
                    MIROSTAT_M,
                ),
            ],
            2 => vec![
                penalties,
                LlamaSampler::temp(params.temperature),
                LlamaSampler::mirostat_v2(seed, params.mirostat_tau, params.mirostat_eta),
            ],
            mode => {
                if mode != 0 {
                    tracing::warn!("Unknown mirostat_mode {}, sampling without mirostat", mode);
                }
                vec![
                    penalties,
                    LlamaSampler::top_k(params.top_k),
                    LlamaSampler::top_p(params.top_p, 1),
                    LlamaSampler::temp(params.temperature),
                    LlamaSampler::dist(seed),
                ]
            }
        };

        LlamaSampler::chain_simple(chain)
    }
}

impl TextEngine for LlamaEngine {
    fn generate(&mut self, prompt: &str, params: &GenerationParams) -> Result<String, EngineError> {
        let n_ctx = self.options.n_ctx;
        let n_threads = self.options.n_threads as i32;

        // Fresh context per call so no KV cache leaks between prompts
        let ctx_params = LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(n_ctx))
            .with_n_threads(n_threads)
            .with_n_threads_batch(n_threads);
        let mut ctx = self
            .model
            .new_context(&self.backend, ctx_params)
            .map_err(|e| EngineError::Context(e.to_string()))?;

        let tokens = self
            .model
            .str_to_token(prompt, AddBos::Always)
            .map_err(|e| EngineError::Tokenize(e.to_string()))?;
        if tokens.is_empty() {
            return Err(EngineError::Tokenize("prompt produced no tokens".to_string()));
        }
        if tokens.len() >= n_ctx as usize {
            return Err(EngineError::PromptTooLong {
                tokens: tokens.len(),
                n_ctx,
            });
        }

        let mut batch = LlamaBatch::new(n_ctx as usize, 1);
        let last_index = tokens.len() as i32 - 1;
        for (i, token) in (0_i32..).zip(tokens.iter().copied()) {
            batch
                .add(token, i, &[0], i == last_index)
                .map_err(|e| EngineError::Decode(e.to_string()))?;
        }
        ctx.decode(&mut batch)
            .map_err(|e| EngineError::Decode(e.to_string()))?;

        let limit = (tokens.len() as u32)
            .saturating_add(params.max_tokens)
            .min(n_ctx) as i32;
        let mut sampler = self.build_sampler(params);
        let mut n_cur = batch.n_tokens();
        let mut output = Vec::new();

        while n_cur < limit {
            let token = sampler.sample(&ctx, batch.n_tokens() - 1);
            if self.model.is_eog_token(token) {
                break;
            }

            let piece = self
                .model
                .token_to_bytes(token, Special::Tokenize)
                .map_err(|e| EngineError::Decode(e.to_string()))?;
            output.extend_from_slice(&piece);

            batch.clear();
            batch
                .add(token, n_cur, &[0], true)
                .map_err(|e| EngineError::Decode(e.to_string()))?;
            n_cur += 1;
            ctx.decode(&mut batch)
                .map_err(|e| EngineError::Decode(e.to_string()))?;
        }

        tracing::debug!(
            "Generated {} tokens",
            n_cur - tokens.len() as i32
        );
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_from_preset() {
        let preset = Preset {
            tfs_z: 0.95,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.9,
            mirostat_mode: 2,
            mirostat_eta: 0.1,
            mirostat_tau: 5.0,
            repeat_penalty: 1.1,
            presence_penalty: 0.2,
            frequency_penalty: 0.3,
        };
        let params = GenerationParams::from_preset(&preset, 128);
        assert_eq!(params.max_tokens, 128);
        assert_eq!(params.tfs_z, 0.95);
        assert_eq!(params.top_k, 40);
        assert_eq!(params.mirostat_mode, 2);
        assert_eq!(params.mirostat_tau, 5.0);
        assert_eq!(params.presence_penalty, 0.2);
        assert_eq!(params.frequency_penalty, 0.3);
    }

    #[test]
    fn test_params_narrow_to_f32() {
        let preset = Preset {
            tfs_z: 1.0,
            temperature: 0.123456789,
            top_k: 0,
            top_p: 1.0,
            mirostat_mode: 0,
            mirostat_eta: 0.0,
            mirostat_tau: 0.0,
            repeat_penalty: 1.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        };
        let params = GenerationParams::from_preset(&preset, 1);
        assert_eq!(params.temperature, 0.123456789_f32);
    }

    #[test]
    fn test_error_messages() {
        let err = EngineError::ModelLoad {
            path: PathBuf::from("models/m1.bin"),
            message: "bad magic".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load model models/m1.bin: bad magic");

        let err = EngineError::PromptTooLong {
            tokens: 4000,
            n_ctx: 2048,
        };
        assert!(err.to_string().contains("2048"));
    }
}
