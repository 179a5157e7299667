// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness probes, one strategy per scheme family

mod command;
mod file;
mod http;
mod tcp;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use command::CommandProbe;
pub use file::FileProbe;
pub use http::HttpProbe;
pub use tcp::TcpProbe;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProbe, ProbeCall};

use crate::resource::{Resource, Scheme};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a single probe attempt did not find the resource ready
///
/// None of these are fatal: the orchestrator retries until its deadline.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot resolve {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no {family} address for {address}")]
    NoAddress {
        address: String,
        family: &'static str,
    },
    #[error("connect to {address} failed: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("{path} does not exist")]
    NotFound { path: String },
    #[error("{path} still exists")]
    StillPresent { path: String },
    #[error("{path} is empty")]
    EmptyFile { path: String },
    #[error("cannot stat {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start command: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("command exited with {0}")]
    Exit(std::process::ExitStatus),
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
    #[error("probe worker failed: {0}")]
    Worker(String),
    #[cfg(any(test, feature = "test-support"))]
    #[error("{0}")]
    Scripted(String),
}

/// One readiness check against a resource
///
/// Implementations must return within `timeout`; the orchestrator also
/// bounds each call and drops it on expiry.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, resource: &Resource, timeout: Duration) -> Result<(), ProbeError>;
}

/// Probe for resources that need nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyProbe;

#[async_trait]
impl Probe for EmptyProbe {
    async fn probe(&self, _resource: &Resource, _timeout: Duration) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl Scheme {
    /// The probe strategy for this scheme
    pub fn checker(&self) -> &'static dyn Probe {
        match self {
            Scheme::Tcp | Scheme::Tcp4 | Scheme::Tcp6 | Scheme::Postgres | Scheme::Mysql => {
                &TcpProbe
            }
            Scheme::Http | Scheme::Https | Scheme::Ws | Scheme::Wss => &HttpProbe,
            Scheme::File => &FileProbe,
            Scheme::Command => &CommandProbe,
            Scheme::Empty => &EmptyProbe,
        }
    }
}

/// Production probe: delegates to each resource's scheme checker
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemeProbe;

#[async_trait]
impl Probe for SchemeProbe {
    async fn probe(&self, resource: &Resource, timeout: Duration) -> Result<(), ProbeError> {
        resource.scheme.checker().probe(resource, timeout).await
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
