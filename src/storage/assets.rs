//! Asset loading
//!
//! Discovers model artifact/config pairs, prompt texts and presets, and
//! validates every document before any generation starts. Any problem aborts
//! the whole batch: a half-valid matrix would make results incomparable.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BatchError, Result};
use crate::types::{ModelAsset, Preset};

/// Extension of model weight files
pub const ARTIFACT_EXTENSION: &str = "bin";
/// Extension of model template files and presets
pub const CONFIG_EXTENSION: &str = "json";
/// Extension of prompt files
pub const PROMPT_EXTENSION: &str = "txt";

/// Names of the regular files directly inside `dir`, sorted
fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|source| BatchError::UnreadableDirectory {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| BatchError::UnreadableDirectory {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => tracing::warn!("Skipping non UTF-8 file name {:?} in {}", name, dir.display()),
        }
    }

    names.sort();
    Ok(names)
}

/// Split `name.ext` into (`name`, `ext`)
fn split_extension(file_name: &str) -> Option<(&str, &str)> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some((stem, ext))
}

/// List direct children of `dir` whose extension is `extension` (without the dot)
///
/// Non-recursive. Names come back sorted so runs are reproducible.
pub fn list_by_extension(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let names = list_file_names(dir)?
        .into_iter()
        .filter(|name| matches!(split_extension(name), Some((_, ext)) if ext == extension))
        .collect();
    Ok(names)
}

/// Find every `<name>.bin` / `<name>.json` pair in `dir`
///
/// Fails if any artifact lacks its config (or the other way round), and if
/// no pair exists at all. Unpaired files are never skipped.
pub fn discover_paired_assets(dir: &Path) -> Result<Vec<ModelAsset>> {
    let names = list_file_names(dir)?;
    let has = |name: &str| names.iter().any(|n| n == name);

    let mut assets = Vec::new();
    for file_name in &names {
        let Some((stem, ext)) = split_extension(file_name) else {
            continue;
        };

        if ext == ARTIFACT_EXTENSION {
            let config_name = format!("{}.{}", stem, CONFIG_EXTENSION);
            if !has(&config_name) {
                return Err(BatchError::UnpairedArtifact {
                    present: dir.join(file_name),
                    missing: dir.join(config_name),
                });
            }
            assets.push(ModelAsset {
                name: stem.to_string(),
                artifact_path: dir.join(file_name),
                config_path: dir.join(config_name),
            });
        } else if ext == CONFIG_EXTENSION {
            let artifact_name = format!("{}.{}", stem, ARTIFACT_EXTENSION);
            if !has(&artifact_name) {
                return Err(BatchError::UnpairedArtifact {
                    present: dir.join(file_name),
                    missing: dir.join(artifact_name),
                });
            }
        }
    }

    if assets.is_empty() {
        return Err(BatchError::NoModelPairs {
            dir: dir.to_path_buf(),
        });
    }

    tracing::info!("Discovered {} model(s) in {}", assets.len(), dir.display());
    Ok(assets)
}

/// Parse a JSON object and check that every required field is present
pub fn load_validated_config(path: &Path, required_fields: &[&str]) -> Result<Map<String, Value>> {
    if !path.is_file() {
        return Err(BatchError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let json = fs::read_to_string(path).map_err(|source| BatchError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Map<String, Value> =
        serde_json::from_str(&json).map_err(|source| BatchError::InvalidDocument {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(field) = required_fields.iter().find(|f| !document.contains_key(**f)) {
        return Err(BatchError::MissingField {
            field: field.to_string(),
            path: path.to_path_buf(),
        });
    }

    tracing::debug!("Loaded {}", path.display());
    Ok(document)
}

/// `load_validated_config` followed by conversion into a typed record
pub fn load_validated<T: DeserializeOwned>(path: &Path, required_fields: &[&str]) -> Result<T> {
    let document = load_validated_config(path, required_fields)?;
    serde_json::from_value(Value::Object(document)).map_err(|source| BatchError::InvalidDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a text file with surrounding whitespace removed
pub fn load_text(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(BatchError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path).map_err(|source| BatchError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents.trim().to_string())
}

fn paths_by_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    Ok(list_by_extension(dir, extension)?
        .into_iter()
        .map(|name| dir.join(name))
        .collect())
}

/// Load every `*.txt` prompt in `dir`
pub fn load_prompts(dir: &Path) -> Result<Vec<String>> {
    let prompts = paths_by_extension(dir, PROMPT_EXTENSION)?
        .iter()
        .map(|path| load_text(path))
        .collect::<Result<Vec<_>>>()?;

    if prompts.is_empty() {
        tracing::warn!("No prompts found in {}", dir.display());
    } else {
        tracing::info!("Loaded {} prompt(s) from {}", prompts.len(), dir.display());
    }
    Ok(prompts)
}

/// Load one preset, rejecting values the engine cannot use
pub fn load_preset(path: &Path) -> Result<Preset> {
    let preset: Preset = load_validated(path, &Preset::REQUIRED_FIELDS)?;
    if let Some(field) = preset.out_of_range_field() {
        return Err(BatchError::OutOfRange {
            field: field.to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(preset)
}

/// Load and validate every `*.json` preset in `dir`
pub fn load_presets(dir: &Path) -> Result<Vec<Preset>> {
    let presets = paths_by_extension(dir, CONFIG_EXTENSION)?
        .iter()
        .map(|path| load_preset(path))
        .collect::<Result<Vec<_>>>()?;

    if presets.is_empty() {
        return Err(BatchError::NoPresets {
            dir: dir.to_path_buf(),
        });
    }

    tracing::info!("Loaded {} preset(s) from {}", presets.len(), dir.display());
    Ok(presets)
}
