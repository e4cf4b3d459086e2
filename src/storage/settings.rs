//! Batch settings
//!
//! Resolves runtime settings from command line / environment overrides,
//! falling back to logged defaults for anything left unset.

use crate::system::resources::physical_core_count;
use crate::types::RuntimeOptions;

pub const DEFAULT_SEED: u32 = 1337;
pub const DEFAULT_MAX_TOKENS: u32 = 256;
pub const DEFAULT_CONTEXT_SIZE: u32 = 2048;

/// Smallest context window accepted
const MIN_CONTEXT_SIZE: u32 = 64;

/// Values supplied by the user; `None` means "use the default"
#[derive(Debug, Clone, Default)]
pub struct SettingOverrides {
    pub n_threads: Option<u32>,
    pub seed: Option<u32>,
    pub max_tokens: Option<u32>,
    pub n_ctx: Option<u32>,
    pub verbose: bool,
    pub use_mlock: bool,
}

/// Fully resolved settings for one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSettings {
    /// CPU threads used by the engine
    pub n_threads: u32,
    /// Sampling seed
    pub seed: u32,
    /// Token budget per generation
    pub max_tokens: u32,
    /// Context window size
    pub context_size: u32,
    /// Forward engine logs
    pub verbose: bool,
    /// Lock model weights in RAM
    pub use_mlock: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            n_threads: physical_core_count(),
            seed: DEFAULT_SEED,
            max_tokens: DEFAULT_MAX_TOKENS,
            context_size: DEFAULT_CONTEXT_SIZE,
            verbose: false,
            use_mlock: true,
        }
    }
}

fn or_default(value: Option<u32>, name: &str, default: impl FnOnce() -> u32) -> u32 {
    match value {
        Some(v) => v,
        None => {
            let v = default();
            tracing::warn!("{} not found in environment. Using {}", name, v);
            v
        }
    }
}

impl BatchSettings {
    /// Build settings from overrides, logging every default that gets applied
    pub fn resolve(overrides: &SettingOverrides) -> Self {
        let mut settings = Self {
            n_threads: or_default(overrides.n_threads, "N_THREADS", physical_core_count),
            seed: or_default(overrides.seed, "SEED", || DEFAULT_SEED),
            max_tokens: or_default(overrides.max_tokens, "MAX_TOKENS", || DEFAULT_MAX_TOKENS),
            context_size: or_default(overrides.n_ctx, "N_CTX", || DEFAULT_CONTEXT_SIZE),
            verbose: overrides.verbose,
            use_mlock: overrides.use_mlock,
        };
        settings.validate();
        settings
    }

    /// Clamp values the engine cannot work with
    pub fn validate(&mut self) {
        if self.n_threads == 0 {
            tracing::warn!("N_THREADS must be at least 1, using 1");
            self.n_threads = 1;
        }

        if self.context_size < MIN_CONTEXT_SIZE {
            tracing::warn!(
                "Context size {} too small, raising to {}",
                self.context_size,
                MIN_CONTEXT_SIZE
            );
            self.context_size = MIN_CONTEXT_SIZE;
        }

        if self.max_tokens == 0 {
            tracing::warn!("MAX_TOKENS must be at least 1, using 1");
            self.max_tokens = 1;
        }

        // Generation stops at the context limit anyway
        if self.max_tokens > self.context_size {
            tracing::warn!(
                "MAX_TOKENS {} exceeds the context window {}, output will be cut at the context limit",
                self.max_tokens,
                self.context_size
            );
        }
    }

    /// Options handed to every engine construction
    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            n_threads: self.n_threads,
            n_ctx: self.context_size,
            seed: self.seed,
            verbose: self.verbose,
            use_mlock: self.use_mlock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let settings = BatchSettings::resolve(&SettingOverrides::default());
        assert_eq!(settings.seed, 1337);
        assert_eq!(settings.max_tokens, 256);
        assert_eq!(settings.context_size, 2048);
        assert_eq!(settings.n_threads, physical_core_count());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = SettingOverrides {
            n_threads: Some(3),
            seed: Some(7),
            max_tokens: Some(64),
            n_ctx: Some(4096),
            verbose: true,
            use_mlock: false,
        };
        let settings = BatchSettings::resolve(&overrides);
        assert_eq!(settings.n_threads, 3);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.max_tokens, 64);
        assert_eq!(settings.context_size, 4096);
        assert!(settings.verbose);
        assert!(!settings.use_mlock);
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = BatchSettings::default();

        settings.n_threads = 0;
        settings.validate();
        assert_eq!(settings.n_threads, 1);

        settings.context_size = 8;
        settings.validate();
        assert_eq!(settings.context_size, 64);

        settings.max_tokens = 0;
        settings.validate();
        assert_eq!(settings.max_tokens, 1);
    }

    #[test]
    fn test_runtime_options() {
        let settings = BatchSettings {
            n_threads: 8,
            seed: 42,
            max_tokens: 128,
            context_size: 1024,
            verbose: false,
            use_mlock: true,
        };
        let options = settings.runtime_options();
        assert_eq!(options.n_threads, 8);
        assert_eq!(options.n_ctx, 1024);
        assert_eq!(options.seed, 42);
        assert!(options.use_mlock);
    }
}
