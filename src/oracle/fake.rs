//! Fake — deterministic oracle doubles.
//!
//! [`FakeOracle`] serves canned contexts per mask with optional scripted
//! failures; tests use it to drive promotion, retry, and replay without
//! a remote service. [`PositionalOracle`] labels tokens by position and
//! backs the binary when no endpoint is configured.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{LabelOracle, OracleError};
use crate::mask::{Context, ContextCandidate};

#[derive(Default)]
struct Inner {
    contexts: HashMap<String, Vec<String>>,
    /// Remaining scripted failures per mask; decremented per call.
    failures: HashMap<String, u32>,
}

#[derive(Default)]
pub struct FakeOracle {
    inner: Mutex<Inner>,
    calls: AtomicU64,
    latency: Option<Duration>,
}

impl FakeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `labels` for `mask`.
    pub fn with_context(self, mask: &str, labels: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock().expect("fake oracle poisoned");
            inner
                .contexts
                .insert(mask.to_string(), labels.iter().map(|l| l.to_string()).collect());
        }
        self
    }

    /// Fail the next `count` calls for `mask` before succeeding.
    pub fn failing_first(self, mask: &str, count: u32) -> Self {
        {
            let mut inner = self.inner.lock().expect("fake oracle poisoned");
            inner.failures.insert(mask.to_string(), count);
        }
        self
    }

    /// Sleep this long inside every call, mimicking a remote round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Total `infer` invocations across all masks.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LabelOracle for FakeOracle {
    async fn infer(&self, candidate: &ContextCandidate) -> Result<Context, OracleError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut inner = self.inner.lock().expect("fake oracle poisoned");
        if let Some(remaining) = inner.failures.get_mut(&candidate.mask) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(OracleError::Transport("scripted failure".to_string()));
            }
        }

        inner
            .contexts
            .get(&candidate.mask)
            .map(|labels| Context {
                labels: labels.clone(),
            })
            .ok_or(OracleError::Empty)
    }
}

/// Labels tokens `field0`, `field1`, … by masking one sample line.
/// Keeps the tool usable without a remote endpoint.
pub struct PositionalOracle;

#[async_trait]
impl LabelOracle for PositionalOracle {
    async fn infer(&self, candidate: &ContextCandidate) -> Result<Context, OracleError> {
        let sample = candidate.samples.first().ok_or(OracleError::Empty)?;
        let line: Vec<char> = sample.chars().collect();
        let masked = crate::mask::mask_line(&line);

        Ok(Context {
            labels: (0..masked.tokens.len())
                .map(|i| format!("field{i}"))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mask: &str, samples: &[&str]) -> ContextCandidate {
        ContextCandidate {
            mask: mask.to_string(),
            samples: samples.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_fake_serves_canned_context() {
        let oracle = FakeOracle::new().with_context("Y-Y", &["month", "day"]);
        let context = oracle
            .infer(&candidate("Y-Y", &["03-17"]))
            .await
            .expect("canned context");
        assert_eq!(context.labels, vec!["month", "day"]);
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_fake_scripted_failures_then_success() {
        let oracle = FakeOracle::new()
            .with_context("Y", &["word"])
            .failing_first("Y", 2);

        assert!(oracle.infer(&candidate("Y", &["a"])).await.is_err());
        assert!(oracle.infer(&candidate("Y", &["a"])).await.is_err());
        assert!(oracle.infer(&candidate("Y", &["a"])).await.is_ok());
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn test_fake_unknown_mask_errors() {
        let oracle = FakeOracle::new();
        assert!(matches!(
            oracle.infer(&candidate("Y", &["a"])).await,
            Err(OracleError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_positional_matches_token_count() {
        let oracle = PositionalOracle;
        let context = oracle
            .infer(&candidate("Y-Y_Y", &["hello-world_123"]))
            .await
            .expect("labels");
        assert_eq!(context.labels, vec!["field0", "field1", "field2"]);
    }

    #[tokio::test]
    async fn test_positional_requires_a_sample() {
        let oracle = PositionalOracle;
        assert!(oracle.infer(&candidate("Y", &[])).await.is_err());
    }
}
