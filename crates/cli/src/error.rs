// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure reports for the terminal
//!
//! Every way the CLI can fail ends in a [`Diagnostic`]: a one-line message,
//! detail notes (usually one per unready resource), hints on what to try
//! next, and the process exit code.

use standby_core::{ParseError, Status, WaitError};
use std::error::Error;
use std::fmt;
use std::process::ExitCode;
use std::time::Duration;

/// Exit code when resources never became ready or the command failed to start
pub const EXIT_NOT_READY: u8 = 1;
/// Exit code for unparseable resources
pub const EXIT_USAGE: u8 = 2;

const SUPPORTED_SCHEMES: &str = "http, https, ws, wss, tcp, tcp4, tcp6, file, postgres, mysql";

#[derive(Debug)]
pub struct Diagnostic {
    pub message: String,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
    code: u8,
    cause: Option<Box<dyn Error + Send + Sync>>,
}

impl Diagnostic {
    fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            notes: Vec::new(),
            hints: Vec::new(),
            code,
            cause: None,
        }
    }

    fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    fn caused_by<E: Error + Send + Sync + 'static>(mut self, cause: E) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;
        for note in &self.notes {
            writeln!(f, "  -> {}", note)?;
        }
        for hint in &self.hints {
            writeln!(f, "hint: {}", hint)?;
        }
        Ok(())
    }
}

impl Error for Diagnostic {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

impl Diagnostic {
    /// A resource token could not be parsed
    pub fn invalid_resource(err: ParseError) -> Self {
        let diagnostic = Diagnostic::new(EXIT_USAGE, err.to_string());
        let diagnostic = match &err {
            ParseError::UnsupportedScheme { .. } => {
                diagnostic.hint(format!("Use one of: {}", SUPPORTED_SCHEMES))
            }
            ParseError::MissingPort { .. } => {
                diagnostic.hint("Add a port, e.g. tcp://localhost:5432")
            }
            ParseError::InvalidTag { key, .. } if key == "retries" => {
                diagnostic.hint("Use a whole number, e.g. #retries=3")
            }
            ParseError::InvalidTag { key, .. } => {
                diagnostic.hint(format!("Use a duration, e.g. #{}=5s", key))
            }
            ParseError::MissingScheme { token } | ParseError::InvalidUri { token, .. }
                if token.starts_with("//") =>
            {
                diagnostic.hint(format!("Name a scheme, e.g. tcp:{}", token))
            }
            _ => diagnostic.hint(
                "Quote each resource so it reaches standby as a single argument",
            ),
        };
        diagnostic.caused_by(err)
    }

    /// Polling ended with some resources not ready
    pub fn not_ready(err: WaitError, timeout: Duration) -> Self {
        let mut diagnostic = Diagnostic::new(EXIT_NOT_READY, err.to_string());
        if let Some(report) = err.report() {
            for outcome in report.unready() {
                let mut line = format!(
                    "{}: {} after {} attempt{}",
                    outcome.resource.label(),
                    outcome.status,
                    outcome.attempts,
                    if outcome.attempts == 1 { "" } else { "s" }
                );
                if let Some(last) = &outcome.last_error {
                    line.push_str(&format!(" ({})", last));
                }
                diagnostic = diagnostic.note(line);
            }

            if report.unready().any(|o| o.status == Status::TimedOut) {
                diagnostic = diagnostic.hint(format!(
                    "Allow more time with --timeout (currently {})",
                    humantime::format_duration(timeout)
                ));
            }
            if report.unready().any(|o| o.status == Status::Failed) {
                diagnostic = diagnostic.hint("Raise or drop the #retries tag");
            }
            if report.unready().any(|o| o.status != Status::Cancelled) {
                diagnostic = diagnostic.hint("Run with -v to log every attempt");
            }
        }
        diagnostic.caused_by(err)
    }

    /// The async runtime could not be built
    pub fn runtime_failed(err: std::io::Error) -> Self {
        Diagnostic::new(EXIT_NOT_READY, "cannot start the async runtime")
            .note(err.to_string())
            .caused_by(err)
    }

    /// The follow-on command could not be started
    pub fn exec_failed(program: &str, err: std::io::Error) -> Self {
        let diagnostic =
            Diagnostic::new(EXIT_NOT_READY, format!("cannot run {}", program)).note(err.to_string());
        let diagnostic = if err.kind() == std::io::ErrorKind::NotFound {
            diagnostic.hint(format!("Check that {} is installed and on PATH", program))
        } else {
            diagnostic
        };
        diagnostic.caused_by(err)
    }
}
