//! Configuration types
//!
//! Runtime options handed to the inference engine when a model is loaded.

/// Engine construction options
///
/// Built once from the resolved batch settings and passed by reference to
/// every engine construction. Nothing here is mutated during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Number of CPU threads used for evaluation
    pub n_threads: u32,
    /// Context window size in tokens
    pub n_ctx: u32,
    /// Sampling seed
    pub seed: u32,
    /// Forward the engine's native logs
    pub verbose: bool,
    /// Lock model weights in RAM to avoid swapping
    pub use_mlock: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            n_threads: 1,
            n_ctx: 2048,
            seed: 1337,
            verbose: false,
            use_mlock: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RuntimeOptions::default();
        assert_eq!(options.n_ctx, 2048);
        assert_eq!(options.seed, 1337);
        assert!(options.use_mlock);
        assert!(!options.verbose);
    }
}
