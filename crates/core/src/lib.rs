// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! standby-core: resource parsing and readiness polling for the standby CLI
//!
//! This crate provides:
//! - Resource descriptors parsed from URI, command and empty tokens
//! - Tolerant tag parsing for per-resource options
//! - One readiness probe per scheme family (TCP, HTTP, file, command)
//! - A concurrent poller with deadlines, retries, backoff and cancellation

pub mod policy;
pub mod poll;
pub mod probe;
pub mod resource;
pub mod tags;
pub mod traced;

pub use policy::{Backoff, Overrides, Policy, WaitConfig};
pub use poll::{wait_all, Outcome, Report, Status, WaitError, Waiter};
pub use probe::{
    CommandProbe, EmptyProbe, FileProbe, HttpProbe, Probe, ProbeError, SchemeProbe, TcpProbe,
};
pub use resource::{parse_resource, parse_resources, ParseError, Resource, Scheme};
pub use tags::{parse_tags, Tags};
pub use traced::TracedProbe;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use probe::{FakeProbe, ProbeCall};
