//! Engine configuration.

use derive_builder::Builder;

/// Configuration for the graph execution engine.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Maximum number of node work units running concurrently.
    #[builder(default = "default_workers()")]
    pub workers: usize,
}

impl EngineConfig {
    /// Returns a builder for creating a configuration.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("workers must be at least 1".into());
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_builder_with_workers() {
        let config = EngineConfig::builder().workers(4usize).build().unwrap();
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = EngineConfig::builder().workers(0usize).build();
        assert!(result.is_err());
    }
}
