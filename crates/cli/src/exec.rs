// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hand-off to the follow-on command

use crate::error::Diagnostic;
use std::io::Write;
use std::process::{Command, ExitCode};

/// Run `command` in place of this process
///
/// On Unix this only returns on failure. Elsewhere the command runs as a
/// child and its exit code is propagated. An empty command succeeds.
pub fn run(command: &[String]) -> Result<ExitCode, Diagnostic> {
    let Some((program, args)) = command.split_first() else {
        return Ok(ExitCode::SUCCESS);
    };
    tracing::debug!(program, args = args.len(), "starting command");
    let _ = std::io::stdout().flush();

    let mut cmd = Command::new(program);
    cmd.args(args);
    hand_off(program, cmd)
}

#[cfg(unix)]
fn hand_off(program: &str, mut cmd: Command) -> Result<ExitCode, Diagnostic> {
    use std::os::unix::process::CommandExt;
    let err = cmd.exec();
    Err(Diagnostic::exec_failed(program, err))
}

#[cfg(not(unix))]
fn hand_off(program: &str, mut cmd: Command) -> Result<ExitCode, Diagnostic> {
    let status = cmd
        .status()
        .map_err(|e| Diagnostic::exec_failed(program, e))?;
    let code = status
        .code()
        .and_then(|c| u8::try_from(c).ok())
        .unwrap_or(1);
    Ok(ExitCode::from(code))
}
