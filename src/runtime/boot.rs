//! Boot — logging init, config load, oracle selection, state creation.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::PipelineConfig;
use crate::oracle::{LabelOracle, PositionalOracle, RemoteOracle};
use crate::state::{PipelineState, SharedState};

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logsieve=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load config, choose the oracle, and build shared pipeline state.
pub fn boot(config_path: Option<&str>) -> Result<SharedState, Box<dyn std::error::Error>> {
    let config = PipelineConfig::load(config_path)?;
    config.validate()?;
    info!(
        queue_depth = config.queue_depth,
        sample_threshold = config.sample_threshold,
        pool_size = config.pool_size,
        "configuration loaded"
    );

    let oracle: Arc<dyn LabelOracle> = match &config.oracle.endpoint {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "using remote label oracle");
            Arc::new(RemoteOracle::new(endpoint.clone(), &config.oracle)?)
        }
        None => {
            warn!("no oracle endpoint configured, labelling tokens positionally");
            Arc::new(PositionalOracle)
        }
    };

    Ok(Arc::new(PipelineState::new(config, oracle)))
}
