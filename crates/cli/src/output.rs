// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for wait reports

use clap::ValueEnum;
use serde::Serialize;
use standby_core::{Outcome, Report, Status};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Serializable view of a whole wait
#[derive(Debug, Serialize)]
pub struct ReportView {
    pub ready: bool,
    pub elapsed_ms: u64,
    pub resources: Vec<OutcomeView>,
}

/// Serializable view of one resource's outcome
#[derive(Debug, Serialize)]
pub struct OutcomeView {
    pub resource: String,
    pub scheme: &'static str,
    pub status: &'static str,
    pub attempts: u32,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn status_key(status: Status) -> &'static str {
    match status {
        Status::Ready => "ready",
        Status::TimedOut => "timed_out",
        Status::Failed => "failed",
        Status::Cancelled => "cancelled",
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl From<&Outcome> for OutcomeView {
    fn from(outcome: &Outcome) -> Self {
        Self {
            resource: outcome.resource.label().to_string(),
            scheme: outcome.resource.scheme.as_str(),
            status: status_key(outcome.status),
            attempts: outcome.attempts,
            elapsed_ms: millis(outcome.elapsed),
            error: outcome.last_error.as_ref().map(ToString::to_string),
        }
    }
}

impl From<&Report> for ReportView {
    fn from(report: &Report) -> Self {
        Self {
            ready: report.is_ready(),
            elapsed_ms: millis(report.elapsed),
            resources: report.outcomes.iter().map(OutcomeView::from).collect(),
        }
    }
}

impl fmt::Display for OutcomeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<9} {} ({} attempt{}, {})",
            self.status,
            self.resource,
            self.attempts,
            if self.attempts == 1 { "" } else { "s" },
            humantime::format_duration(Duration::from_millis(self.elapsed_ms))
        )?;
        if let Some(error) = &self.error {
            write!(f, ": {}", error)?;
        }
        Ok(())
    }
}

impl fmt::Display for ReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, resource) in self.resources.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", resource)?;
        }
        Ok(())
    }
}

/// Render a report in the specified format
pub fn render(report: &Report, format: OutputFormat) -> String {
    let view = ReportView::from(report);
    match format {
        OutputFormat::Text => view.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&view).unwrap_or_default(),
    }
}

/// Print a report in the specified format
pub fn print(report: &Report, format: OutputFormat) {
    let rendered = render(report, format);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
