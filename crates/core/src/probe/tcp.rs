// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP dial probe for tcp, tcp4, tcp6 and database schemes

use super::{Probe, ProbeError};
use crate::resource::{Resource, Scheme};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};

/// Ready once a TCP connection to `host:port` is established
///
/// The connection is closed right away; no protocol bytes are exchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpProbe;

impl TcpProbe {
    fn accepts(scheme: Scheme, addr: &SocketAddr) -> bool {
        match scheme {
            Scheme::Tcp4 => addr.is_ipv4(),
            Scheme::Tcp6 => addr.is_ipv6(),
            _ => true,
        }
    }

    fn family(scheme: Scheme) -> &'static str {
        match scheme {
            Scheme::Tcp4 => "IPv4",
            Scheme::Tcp6 => "IPv6",
            _ => "IP",
        }
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self, resource: &Resource, timeout: Duration) -> Result<(), ProbeError> {
        let address = resource.address();
        let candidates: Vec<SocketAddr> = lookup_host(address.as_str())
            .await
            .map_err(|source| ProbeError::Resolve {
                address: address.clone(),
                source,
            })?
            .filter(|addr| Self::accepts(resource.scheme, addr))
            .collect();

        let mut last_error = ProbeError::NoAddress {
            address: address.clone(),
            family: Self::family(resource.scheme),
        };
        for addr in candidates {
            match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => {
                    tracing::trace!(%addr, "connected");
                    drop(stream);
                    return Ok(());
                }
                Ok(Err(source)) => {
                    last_error = ProbeError::Connect {
                        address: addr.to_string(),
                        source,
                    };
                }
                Err(_) => last_error = ProbeError::Timeout(timeout),
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
#[path = "tcp_tests.rs"]
mod tests;
