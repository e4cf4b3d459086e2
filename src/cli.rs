//! Command line interface
//!
//! Every runtime setting can come from a flag, from the environment, or from
//! a `.env` file in the project root.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::storage::settings::SettingOverrides;

#[derive(Parser, Debug)]
#[command(name = "promptgrid")]
#[command(about = "Run every model against every preset and prompt", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project root containing models/, prompts/, presets/ and outputs/
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// CPU threads (defaults to the physical core count)
    #[arg(long, env = "N_THREADS")]
    pub threads: Option<u32>,

    /// Sampling seed (defaults to 1337)
    #[arg(long, env = "SEED")]
    pub seed: Option<u32>,

    /// Maximum tokens generated per prompt (defaults to 256)
    #[arg(long, env = "MAX_TOKENS")]
    pub max_tokens: Option<u32>,

    /// Context window size (defaults to 2048)
    #[arg(long = "ctx", env = "N_CTX")]
    pub n_ctx: Option<u32>,

    /// Show debug logs, including llama.cpp's own output
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not lock model weights in RAM
    #[arg(long)]
    pub no_mlock: bool,
}

/// Load `<root>/.env` into the process environment
///
/// Variables already set in the environment are left untouched. Returns the
/// file path when one was loaded.
pub fn load_env_file(root: &Path) -> Result<Option<PathBuf>, dotenvy::Error> {
    let path = root.join(".env");
    if !path.is_file() {
        return Ok(None);
    }
    dotenvy::from_path(&path)?;
    Ok(Some(path))
}

impl Cli {
    /// Parse arguments after loading the `.env` of the selected root
    ///
    /// The command line is parsed twice: once to find `--root`, then again so
    /// that variables from the file feed the `env` fallbacks.
    pub fn parse_with_env_file() -> (Self, Result<Option<PathBuf>, dotenvy::Error>) {
        let root = Self::parse().root;
        let env_file = load_env_file(&root);
        (Self::parse(), env_file)
    }

    pub fn overrides(&self) -> SettingOverrides {
        SettingOverrides {
            n_threads: self.threads,
            seed: self.seed,
            max_tokens: self.max_tokens,
            n_ctx: self.n_ctx,
            verbose: self.verbose,
            use_mlock: !self.no_mlock,
        }
    }
}
