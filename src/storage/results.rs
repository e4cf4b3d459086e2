//! Result persistence
//!
//! Writes the structured result document and renders the human readable
//! report from it.

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{BatchError, Result};
use crate::types::{BatchResult, ResultSet};

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Attempts at finding a free record name before giving up
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Path of the `attempt`-th candidate record for a timestamp
///
/// `Output <timestamp>.json`, then `Output <timestamp> (1).json`, and so on.
pub fn record_path(output_dir: &Path, timestamp: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        output_dir.join(format!("Output {}.json", timestamp))
    } else {
        output_dir.join(format!("Output {} ({}).json", timestamp, attempt))
    }
}

/// Serialize `results` into `output_dir/Output <timestamp>.json`
pub fn write_results(results: Vec<BatchResult>, output_dir: &Path) -> Result<PathBuf> {
    write_result_set(&ResultSet::new(results), output_dir)
}

/// Write `set` under the first free record name in `output_dir`
///
/// The document is written to a temporary file in `output_dir` first and
/// renamed into place once complete, so a crash never leaves a truncated
/// record under the final name. Existing records are never overwritten: a
/// taken name moves on to the next numbered suffix.
pub fn write_result_set(set: &ResultSet, output_dir: &Path) -> Result<PathBuf> {
    let json = to_pretty_json(set)?;
    let first_path = record_path(output_dir, &set.timestamp, 0);

    let write_err = |path: &Path, source: std::io::Error| BatchError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(output_dir).map_err(|e| write_err(&first_path, e))?;
    let mut temp = tempfile::NamedTempFile::new_in(output_dir).map_err(|e| write_err(&first_path, e))?;
    temp.write_all(json.as_bytes()).map_err(|e| write_err(&first_path, e))?;
    temp.as_file().sync_all().map_err(|e| write_err(&first_path, e))?;

    let mut attempt = 0;
    let final_path = loop {
        let candidate = record_path(output_dir, &set.timestamp, attempt);
        match temp.persist_noclobber(&candidate) {
            Ok(_) => break candidate,
            Err(e)
                if e.error.kind() == std::io::ErrorKind::AlreadyExists
                    && attempt + 1 < MAX_NAME_ATTEMPTS =>
            {
                tracing::debug!("{} already exists, trying the next name", candidate.display());
                temp = e.file;
                attempt += 1;
            }
            Err(e) => return Err(write_err(&candidate, e.error)),
        }
    };

    tracing::info!(
        "Wrote {} result(s) to {}",
        set.results.len(),
        final_path.display()
    );
    Ok(final_path)
}

/// Render the text report for a result document
///
/// Results are sorted by model name (stable, so equal names keep their
/// document order). The report is named after the record, with a `.txt`
/// extension. Returns the path of the written report.
pub fn render_report(record_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let json = fs::read_to_string(record_path).map_err(|source| BatchError::UnreadableFile {
        path: record_path.to_path_buf(),
        source,
    })?;
    let mut set: ResultSet =
        serde_json::from_str(&json).map_err(|source| BatchError::InvalidDocument {
            path: record_path.to_path_buf(),
            source,
        })?;

    set.results.sort_by(|a, b| a.model.cmp(&b.model));

    let mut report = String::new();
    for result in &set.results {
        report.push_str(&format!("Model: {}\n", result.model));
        report.push_str(&format!("Prompt: {}\n", result.prompt));
        report.push_str(&format!("Output: {}\n\n", result.output));
        report.push_str(&format!(
            "Preset used: {}\n\n",
            to_pretty_json(&result.preset_used)?
        ));
    }

    let stem = record_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("Output {}", set.timestamp));
    let path = output_dir.join(format!("{}.txt", stem));
    fs::write(&path, report).map_err(|source| BatchError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!("Wrote report to {}", path.display());
    Ok(path)
}
