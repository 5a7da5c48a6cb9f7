//! Model — PipelineConfig and oracle settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Depth of every inter-stage queue.
    pub queue_depth: usize,
    /// Samples of a new mask to collect before consulting the oracle.
    pub sample_threshold: usize,
    /// Per-mask sample buffer bound; oldest samples drop beyond it.
    pub sample_cap: usize,
    /// Line buffers circulating in the pool.
    pub pool_size: usize,
    /// Characters per line buffer.
    pub buffer_capacity: usize,
    pub oracle: OracleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Label-inference endpoint. Without one the positional fallback
    /// oracle is used.
    pub endpoint: Option<String>,
    /// Name of the env var holding the bearer token.
    pub api_key_env: String,
    pub timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_depth: 100,
            sample_threshold: 3,
            sample_cap: 64,
            pool_size: 1024,
            buffer_capacity: 4096,
            oracle: OracleConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: "LOGSIEVE_ORACLE_KEY".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl PipelineConfig {
    /// Validate configuration values before the pipeline starts.
    pub fn validate(&self) -> Result<(), String> {
        if self.queue_depth == 0 {
            return Err("queue_depth must be > 0".to_string());
        }
        if self.sample_threshold == 0 {
            return Err("sample_threshold must be > 0".to_string());
        }
        if self.sample_cap < self.sample_threshold {
            return Err(format!(
                "sample_cap ({}) must not be below sample_threshold ({})",
                self.sample_cap, self.sample_threshold
            ));
        }
        if self.pool_size == 0 {
            return Err("pool_size must be > 0".to_string());
        }
        if self.buffer_capacity == 0 {
            return Err("buffer_capacity must be > 0".to_string());
        }
        if self.oracle.timeout_ms == 0 {
            return Err("oracle.timeout_ms must be > 0".to_string());
        }
        if self.oracle.api_key_env.is_empty() {
            return Err("oracle.api_key_env must not be empty".to_string());
        }
        Ok(())
    }
}
