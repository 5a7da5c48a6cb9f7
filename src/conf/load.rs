//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::PipelineConfig;

impl PipelineConfig {
    /// Load configuration.
    /// Priority: Environment Variables > Config File > Defaults.
    ///
    /// The file path comes from `path` (the `--config` flag) or the
    /// `LOGSIEVE_CONFIG_FILE` env var; a missing file falls back to
    /// defaults rather than failing.
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var("LOGSIEVE_CONFIG_FILE").ok());

        let mut config = match config_path {
            Some(ref p) if Path::new(p).exists() => {
                tracing::info!("Loading configuration from: {}", p);
                Self::from_file(p)?
            }
            Some(ref p) => {
                tracing::info!("Config file not found at {}, using defaults", p);
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: PipelineConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(depth) = env_parse("LOGSIEVE_QUEUE_DEPTH") {
            self.queue_depth = depth;
        }
        if let Some(threshold) = env_parse("LOGSIEVE_SAMPLE_THRESHOLD") {
            self.sample_threshold = threshold;
        }
        if let Some(cap) = env_parse("LOGSIEVE_SAMPLE_CAP") {
            self.sample_cap = cap;
        }
        if let Some(size) = env_parse("LOGSIEVE_POOL_SIZE") {
            self.pool_size = size;
        }
        if let Some(capacity) = env_parse("LOGSIEVE_BUFFER_CAPACITY") {
            self.buffer_capacity = capacity;
        }
        if let Ok(endpoint) = std::env::var("LOGSIEVE_ORACLE_ENDPOINT") {
            self.oracle.endpoint = Some(endpoint);
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}
