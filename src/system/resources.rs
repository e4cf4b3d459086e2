//! Host resources
//!
//! CPU topology used to size the engine's thread pool.

/// Number of physical CPU cores (at least 1), hyper-threads excluded
pub fn physical_core_count() -> u32 {
    let physical = num_cpus::get_physical();
    if physical == 0 {
        tracing::warn!("Could not detect physical cores, falling back to logical count");
        return num_cpus::get().max(1) as u32;
    }
    physical as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_core_count_positive() {
        let cores = physical_core_count();
        assert!(cores >= 1);
        assert!(cores as usize <= num_cpus::get().max(1));
    }
}
