use std::sync::Arc;

use crate::conf::PipelineConfig;
use crate::metrics::PipelineMetrics;
use crate::oracle::LabelOracle;
use crate::pool::LineBufferPool;
use crate::registry::{MaskRegistry, SampleStore};

/// Everything the pipeline stages share: the mask registry, the sample
/// buffers, the line pool, counters, and the injected oracle client.
pub struct PipelineState {
    pub config: PipelineConfig,
    pub registry: MaskRegistry,
    pub samples: SampleStore,
    pub pool: LineBufferPool,
    pub metrics: PipelineMetrics,
    pub oracle: Arc<dyn LabelOracle>,
}

impl PipelineState {
    pub fn new(config: PipelineConfig, oracle: Arc<dyn LabelOracle>) -> Self {
        Self {
            registry: MaskRegistry::new(),
            samples: SampleStore::new(config.sample_cap),
            pool: LineBufferPool::new(config.pool_size, config.buffer_capacity),
            metrics: PipelineMetrics::new(),
            oracle,
            config,
        }
    }
}

pub type SharedState = Arc<PipelineState>;
