// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argument vector splitting

/// Split `args` at the first `--` into resource tokens and the follow-on
/// command. Later `--` occurrences belong to the command.
pub fn split_args<S: AsRef<str>>(args: &[S]) -> (&[S], &[S]) {
    match args.iter().position(|arg| arg.as_ref() == "--") {
        Some(separator) => (&args[..separator], &args[separator + 1..]),
        None => (args, &[]),
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
