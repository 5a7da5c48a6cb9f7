//! Oracle module — label inference behind a narrow async interface.
//!
//! Every pipeline component talks to the oracle through [`LabelOracle`].
//! `live.rs` provides the HTTP-backed implementation; `fake.rs` provides
//! deterministic doubles for tests and offline runs.

pub mod fake;
pub mod live;

use async_trait::async_trait;
use thiserror::Error;

use crate::mask::{Context, ContextCandidate};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle transport failed: {0}")]
    Transport(String),
    #[error("oracle returned status {0}")]
    Status(u16),
    #[error("oracle response malformed: {0}")]
    Malformed(String),
    #[error("oracle returned no labels")]
    Empty,
}

/// Label-inference service. A successful response carries one label per
/// token of the candidate's mask. Implementations must be `Send + Sync`
/// so promotion tasks can share one client.
#[async_trait]
pub trait LabelOracle: Send + Sync {
    async fn infer(&self, candidate: &ContextCandidate) -> Result<Context, OracleError>;
}

pub use fake::{FakeOracle, PositionalOracle};
pub use live::RemoteOracle;
