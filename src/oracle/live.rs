//! Live — HTTP client for the remote labelling service.
//!
//! Posts `{"mask": …, "samples": […]}` and expects `{"labels": […]}`.
//! The bearer token is read once at construction from the env var named
//! in the oracle config; the rest of the pipeline never sees it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{LabelOracle, OracleError};
use crate::conf::OracleConfig;
use crate::mask::{Context, ContextCandidate};

#[derive(Debug, Deserialize)]
struct InferResponse {
    labels: Vec<String>,
}

pub struct RemoteOracle {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteOracle {
    pub fn new(endpoint: String, config: &OracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let api_key = std::env::var(&config.api_key_env).ok();
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl LabelOracle for RemoteOracle {
    async fn infer(&self, candidate: &ContextCandidate) -> Result<Context, OracleError> {
        let mut request = self.client.post(&self.endpoint).json(candidate);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        let body: InferResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        if body.labels.is_empty() {
            return Err(OracleError::Empty);
        }

        debug!(
            mask = %candidate.mask,
            labels = body.labels.len(),
            "oracle inference succeeded"
        );
        Ok(Context {
            labels: body.labels,
        })
    }
}
