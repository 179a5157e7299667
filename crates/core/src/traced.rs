// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced probe wrapper for consistent observability

use crate::probe::{Probe, ProbeError};
use crate::resource::Resource;
use async_trait::async_trait;
use std::time::Duration;
use tracing::Instrument;

/// Wrapper that adds tracing to any Probe
#[derive(Clone)]
pub struct TracedProbe<P> {
    inner: P,
}

impl<P> TracedProbe<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: Probe> Probe for TracedProbe<P> {
    async fn probe(&self, resource: &Resource, timeout: Duration) -> Result<(), ProbeError> {
        let span = tracing::debug_span!(
            "probe",
            resource = resource.label(),
            scheme = %resource.scheme,
        );

        async {
            tracing::trace!(timeout_ms = timeout.as_millis() as u64, "probing");

            let start = std::time::Instant::now();
            let result = self.inner.probe(resource, timeout).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "ready"),
                Err(e) => tracing::debug!(elapsed_ms, error = %e, "not ready"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
