// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrent readiness polling
//!
//! Every resource gets its own retry loop running as a task. Loops share
//! the overall deadline and a cancellation token but nothing else; the
//! waiter joins them and reports every outcome, not just the first
//! failure.

use crate::policy::{Policy, WaitConfig};
use crate::probe::{Probe, ProbeError, SchemeProbe};
use crate::resource::Resource;
use crate::traced::TracedProbe;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Terminal state of one resource's retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    /// Deadline passed before a probe succeeded
    TimedOut,
    /// Retry budget from the `retries` tag ran out
    Failed,
    Cancelled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => write!(f, "ready"),
            Status::TimedOut => write!(f, "timed out"),
            Status::Failed => write!(f, "failed"),
            Status::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of polling a single resource
#[derive(Debug)]
pub struct Outcome {
    pub resource: Resource,
    pub status: Status,
    pub attempts: u32,
    pub elapsed: Duration,
    /// Error from the last failed attempt
    pub last_error: Option<ProbeError>,
}

impl Outcome {
    pub fn is_ready(&self) -> bool {
        self.status == Status::Ready
    }
}

/// Outcomes for every resource, in input order
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
    pub elapsed: Duration,
}

impl Report {
    pub fn is_ready(&self) -> bool {
        self.outcomes.iter().all(Outcome::is_ready)
    }

    pub fn unready(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_ready())
    }

    fn has(&self, status: Status) -> bool {
        self.outcomes.iter().any(|o| o.status == status)
    }

    fn into_result(self) -> Result<Report, WaitError> {
        if self.has(Status::Cancelled) {
            Err(WaitError::Cancelled(self))
        } else if self.has(Status::TimedOut) {
            Err(WaitError::Timeout(self))
        } else if self.has(Status::Failed) {
            Err(WaitError::Exhausted(self))
        } else {
            Ok(self)
        }
    }
}

fn unready_labels(report: &Report) -> String {
    report
        .unready()
        .map(|o| o.resource.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that end a wait without every resource ready
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("timed out waiting for {}", unready_labels(.0))]
    Timeout(Report),
    #[error("gave up on {} after exhausting retries", unready_labels(.0))]
    Exhausted(Report),
    #[error("cancelled while waiting for {}", unready_labels(.0))]
    Cancelled(Report),
    #[error("polling task failed: {0}")]
    Task(#[from] JoinError),
}

impl WaitError {
    /// Per-resource outcomes, when polling ran to completion
    pub fn report(&self) -> Option<&Report> {
        match self {
            WaitError::Timeout(report)
            | WaitError::Exhausted(report)
            | WaitError::Cancelled(report) => Some(report),
            WaitError::Task(_) => None,
        }
    }
}

/// Polls resources concurrently until all are ready or time runs out
#[derive(Clone)]
pub struct Waiter<P> {
    probe: P,
    config: WaitConfig,
    cancel: CancellationToken,
}

impl<P> Waiter<P>
where
    P: Probe + Clone + 'static,
{
    pub fn new(probe: P, config: WaitConfig) -> Self {
        Self {
            probe,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop all polling when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Wait for every resource, returning once all loops are terminal
    pub async fn wait_all(&self, resources: &[Resource]) -> Result<Report, WaitError> {
        let start = Instant::now();
        if resources.is_empty() {
            return Ok(Report::default());
        }

        tracing::info!(
            count = resources.len(),
            timeout_ms = self.config.timeout.as_millis() as u64,
            "waiting for resources"
        );

        let mut tasks = JoinSet::new();
        for (index, resource) in resources.iter().cloned().enumerate() {
            let probe = self.probe.clone();
            let policy = self.config.policy_for(&resource.overrides);
            let cancel = self.cancel.clone();
            tasks.spawn(async move {
                let outcome = poll_one(&probe, resource, &policy, &cancel).await;
                (index, outcome)
            });
        }

        // Each task writes exactly one slot
        let mut slots: Vec<Option<Outcome>> = resources.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined?;
            if let Some(slot) = slots.get_mut(index) {
                debug_assert!(slot.is_none(), "outcome written twice");
                *slot = Some(outcome);
            }
        }

        let report = Report {
            outcomes: slots.into_iter().flatten().collect(),
            elapsed: start.elapsed(),
        };
        report.into_result()
    }
}

/// Wait for resources with the production probes
pub async fn wait_all(resources: &[Resource], config: WaitConfig) -> Result<Report, WaitError> {
    Waiter::new(TracedProbe::new(SchemeProbe), config)
        .wait_all(resources)
        .await
}

/// Stand-in deadline for timeouts too large to represent
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

async fn poll_one<P: Probe>(
    probe: &P,
    resource: Resource,
    policy: &Policy,
    cancel: &CancellationToken,
) -> Outcome {
    let start = Instant::now();
    let deadline = start
        .checked_add(policy.timeout)
        .unwrap_or_else(|| start + FAR_FUTURE);
    let mut interval = policy.interval;
    let mut attempts = 0u32;
    let mut last_error = None;

    let status = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break Status::TimedOut;
        }

        attempts += 1;
        let attempt_timeout = policy.attempt_timeout.min(remaining);
        let attempt = tokio::time::timeout(attempt_timeout, probe.probe(&resource, attempt_timeout));
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = attempt => Some(result.unwrap_or_else(|_| Err(ProbeError::Timeout(attempt_timeout)))),
        };
        let Some(result) = result else {
            break Status::Cancelled;
        };

        match result {
            Ok(()) => break Status::Ready,
            Err(e) => {
                tracing::debug!(resource = resource.label(), attempts, error = %e, "not ready");
                last_error = Some(e);
            }
        }

        if !policy.allows_attempt(attempts) {
            break Status::Failed;
        }

        let now = Instant::now();
        if now >= deadline {
            break Status::TimedOut;
        }
        let wake = now.checked_add(interval).unwrap_or(deadline).min(deadline);
        let cancelled = tokio::select! {
            biased;
            _ = cancel.cancelled() => true,
            _ = tokio::time::sleep_until(wake) => false,
        };
        if cancelled {
            break Status::Cancelled;
        }
        interval = policy.backoff.next(interval);
    };

    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_millis() as u64;
    match status {
        Status::Ready => {
            tracing::info!(resource = resource.label(), attempts, elapsed_ms, "ready");
        }
        Status::Cancelled => {
            tracing::info!(resource = resource.label(), attempts, "cancelled");
        }
        Status::TimedOut | Status::Failed => tracing::warn!(
            resource = resource.label(),
            attempts,
            elapsed_ms,
            %status,
            error = last_error.as_ref().map(tracing::field::display),
            "not ready"
        ),
    }

    Outcome {
        resource,
        status,
        attempts,
        elapsed,
        last_error: if status == Status::Ready {
            None
        } else {
            last_error
        },
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
