// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timing policy: global wait configuration and per-resource overrides

use crate::tags::Tags;
use std::time::Duration;

/// Default overall deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Default bound on a single probe attempt
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default delay between attempts
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Tag keys that override timing for a single resource
pub const TAG_TIMEOUT: &str = "timeout";
pub const TAG_ATTEMPT_TIMEOUT: &str = "attempt-timeout";
pub const TAG_INTERVAL: &str = "interval";
pub const TAG_RETRIES: &str = "retries";

/// How the delay between attempts evolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Always wait the configured interval
    #[default]
    Fixed,
    /// Double the interval after every failed attempt, up to `max`
    Exponential { max: Duration },
}

impl Backoff {
    /// Delay to use after `current`
    pub fn next(&self, current: Duration) -> Duration {
        match self {
            Backoff::Fixed => current,
            Backoff::Exponential { max } => current.saturating_mul(2).min(*max),
        }
    }
}

/// Global wait configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Overall deadline shared by every resource
    pub timeout: Duration,
    /// Upper bound for one probe attempt
    pub attempt_timeout: Duration,
    /// Delay between attempts on the same resource
    pub interval: Duration,
    pub backoff: Backoff,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            backoff: Backoff::Fixed,
        }
    }
}

impl WaitConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Effective policy for one resource
    ///
    /// A resource timeout can only shorten the overall deadline, never
    /// extend it.
    pub fn policy_for(&self, overrides: &Overrides) -> Policy {
        let timeout = overrides
            .timeout
            .map_or(self.timeout, |t| t.min(self.timeout));
        Policy {
            timeout,
            attempt_timeout: overrides.attempt_timeout.unwrap_or(self.attempt_timeout),
            interval: overrides.interval.unwrap_or(self.interval),
            backoff: self.backoff,
            retries: overrides.retries,
        }
    }
}

/// Per-resource timing overrides read from tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub timeout: Option<Duration>,
    pub attempt_timeout: Option<Duration>,
    pub interval: Option<Duration>,
    /// Retries allowed after the first attempt
    pub retries: Option<u32>,
}

/// A recognised tag carrying a value that does not parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOverride {
    pub key: String,
    pub value: String,
    pub reason: String,
}

impl Overrides {
    /// Read the recognised timing keys from a tag map
    ///
    /// Unknown keys are left for the probes (`absent`, `nonempty`, ...).
    pub fn from_tags(tags: &Tags) -> Result<Self, InvalidOverride> {
        Ok(Self {
            timeout: duration_tag(tags, TAG_TIMEOUT)?,
            attempt_timeout: duration_tag(tags, TAG_ATTEMPT_TIMEOUT)?,
            interval: duration_tag(tags, TAG_INTERVAL)?,
            retries: tags
                .get(TAG_RETRIES)
                .map(|v| {
                    v.parse::<u32>().map_err(|e| InvalidOverride {
                        key: TAG_RETRIES.to_string(),
                        value: v.clone(),
                        reason: e.to_string(),
                    })
                })
                .transpose()?,
        })
    }
}

fn duration_tag(tags: &Tags, key: &str) -> Result<Option<Duration>, InvalidOverride> {
    tags.get(key)
        .map(|v| {
            humantime::parse_duration(v).map_err(|e| InvalidOverride {
                key: key.to_string(),
                value: v.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Effective timing for a single resource's retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub timeout: Duration,
    pub attempt_timeout: Duration,
    pub interval: Duration,
    pub backoff: Backoff,
    pub retries: Option<u32>,
}

impl Policy {
    /// Whether another attempt is allowed after `attempts` have been made
    pub fn allows_attempt(&self, attempts: u32) -> bool {
        match self.retries {
            Some(retries) => attempts <= retries,
            None => true,
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
