//! Batch runner
//!
//! Iterates the {model} x {preset} x {prompt} matrix strictly in sequence.
//! Results come out in (model discovery order, preset order, prompt order).
//! Only one engine is resident at a time.

use std::path::{Path, PathBuf};

use crate::error::{BatchError, Result};
use crate::inference::{compose, EngineLoader, GenerationParams, TextEngine};
use crate::storage::assets::{discover_paired_assets, load_presets, load_prompts, load_validated};
use crate::storage::results::{render_report, write_results};
use crate::storage::settings::BatchSettings;
use crate::storage::ProjectLayout;
use crate::types::{BatchResult, ModelConfig, Preset, RuntimeOptions};

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of generations performed
    pub results: usize,
    /// Structured result document
    pub record_path: PathBuf,
    /// Human readable report
    pub report_path: PathBuf,
}

/// Run every discovered model against every preset and prompt
///
/// All model configs are validated before the first model is loaded, so an
/// invalid asset aborts the batch before any generation happens. Any engine
/// failure aborts the batch and discards the results gathered so far.
pub fn run_matrix<L: EngineLoader>(
    loader: &L,
    models_dir: &Path,
    presets: &[Preset],
    prompts: &[String],
    options: &RuntimeOptions,
    max_tokens: u32,
) -> Result<Vec<BatchResult>> {
    if presets.is_empty() {
        return Err(BatchError::EmptyPresets);
    }

    let assets = discover_paired_assets(models_dir)?;
    let configs = assets
        .iter()
        .map(|asset| load_validated::<ModelConfig>(&asset.config_path, &ModelConfig::REQUIRED_FIELDS))
        .collect::<Result<Vec<_>>>()?;

    let total = assets.len() * presets.len() * prompts.len();
    let mut results = Vec::with_capacity(total);

    for (asset, config) in assets.iter().zip(&configs) {
        let mut engine = loader.load(&asset.artifact_path, options)?;

        for (preset_index, preset) in presets.iter().enumerate() {
            let params = GenerationParams::from_preset(preset, max_tokens);

            for prompt in prompts {
                tracing::info!(
                    "[{}/{}] model: {}, preset: #{}",
                    results.len() + 1,
                    total,
                    asset.name,
                    preset_index + 1
                );

                let output = engine.generate(&compose(prompt, config), &params)?;
                results.push(BatchResult {
                    model: asset.name.clone(),
                    prompt: prompt.clone(),
                    output,
                    preset_used: preset.clone(),
                });
            }
        }

        // Free the weights before the next model is loaded
        drop(engine);
    }

    Ok(results)
}

/// Load inputs from `layout`, run the whole matrix and write both outputs
pub fn run<L: EngineLoader>(
    layout: &ProjectLayout,
    settings: &BatchSettings,
    loader: &L,
) -> Result<BatchReport> {
    let prompts = load_prompts(&layout.prompts_dir())?;
    let presets = load_presets(&layout.presets_dir())?;

    let results = run_matrix(
        loader,
        &layout.models_dir(),
        &presets,
        &prompts,
        &settings.runtime_options(),
        settings.max_tokens,
    )?;

    let output_dir = layout.ensure_outputs_dir()?;
    let count = results.len();
    let record_path = write_results(results, &output_dir)?;
    let report_path = render_report(&record_path, &output_dir)?;

    Ok(BatchReport {
        results: count,
        record_path,
        report_path,
    })
}
