// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP probe for http, https, ws and wss

use super::{Probe, ProbeError};
use crate::resource::{Resource, Scheme};
use async_trait::async_trait;
use std::time::Duration;

/// Ready once the server answers a GET with any HTTP response
///
/// Status codes and bodies are not inspected. WebSocket endpoints are
/// reached over their HTTP transport, so `wss` gets the TLS handshake that
/// `https` does.
///
/// The request runs on the blocking pool. A dropped attempt abandons it
/// and the thread exits once the attempt timeout passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpProbe;

impl HttpProbe {
    /// Request URL for the resource, without userinfo or fragment
    pub fn url(resource: &Resource) -> String {
        let scheme = match resource.scheme {
            Scheme::Https | Scheme::Wss => "https",
            _ => "http",
        };
        let mut url = format!("{}://{}{}", scheme, resource.address(), resource.path);
        if !resource.query.is_empty() {
            url.push('?');
            url.push_str(&resource.query);
        }
        url
    }
}

fn request(url: &str, timeout: Duration) -> Result<u16, ureq::Error> {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    let agent = ureq::Agent::new_with_config(config);
    let response = agent.get(url).call()?;
    Ok(response.status().as_u16())
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, resource: &Resource, timeout: Duration) -> Result<(), ProbeError> {
        let url = Self::url(resource);
        let target = url.clone();
        let result = tokio::task::spawn_blocking(move || request(&target, timeout))
            .await
            .map_err(|e| ProbeError::Worker(e.to_string()))?;

        match result {
            Ok(status) | Err(ureq::Error::StatusCode(status)) => {
                tracing::trace!(url = %url, status, "response received");
                Ok(())
            }
            Err(e) => Err(ProbeError::Http {
                url,
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
