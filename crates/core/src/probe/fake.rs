// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake probe for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Probe, ProbeError};
use crate::resource::Resource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded probe call
#[derive(Debug, Clone)]
pub struct ProbeCall {
    pub resource: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy)]
enum Behavior {
    /// Fail this many more attempts, then succeed
    ReadyAfter(u32),
    Never,
    Hang,
}

/// Fake probe with scripted per-resource behavior
///
/// Resources are keyed by their raw token. Unscripted resources are ready
/// on the first attempt.
#[derive(Clone, Default)]
pub struct FakeProbe {
    behaviors: Arc<Mutex<HashMap<String, Behavior>>>,
    calls: Arc<Mutex<Vec<ProbeCall>>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `failures` attempts on `raw`, then report ready
    pub fn ready_after(self, raw: &str, failures: u32) -> Self {
        self.script(raw, Behavior::ReadyAfter(failures))
    }

    /// Never report `raw` ready
    pub fn never_ready(self, raw: &str) -> Self {
        self.script(raw, Behavior::Never)
    }

    /// Block forever when probing `raw`
    pub fn hang(self, raw: &str) -> Self {
        self.script(raw, Behavior::Hang)
    }

    fn script(self, raw: &str, behavior: Behavior) -> Self {
        self.behaviors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(raw.to_string(), behavior);
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProbeCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of attempts made against `raw`
    pub fn attempts(&self, raw: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.resource == raw)
            .count()
    }
}

#[async_trait]
impl Probe for FakeProbe {
    async fn probe(&self, resource: &Resource, timeout: Duration) -> Result<(), ProbeError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ProbeCall {
                resource: resource.raw.clone(),
                timeout,
            });

        let behavior = {
            let mut behaviors = self.behaviors.lock().unwrap_or_else(|e| e.into_inner());
            let entry = behaviors
                .entry(resource.raw.clone())
                .or_insert(Behavior::ReadyAfter(0));
            let current = *entry;
            if let Behavior::ReadyAfter(n) = entry {
                *n = n.saturating_sub(1);
            }
            current
        };

        match behavior {
            Behavior::ReadyAfter(0) => Ok(()),
            Behavior::ReadyAfter(_) | Behavior::Never => Err(ProbeError::Scripted(format!(
                "{} not ready",
                resource.label()
            ))),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
