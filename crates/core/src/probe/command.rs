// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess probe

use super::{Probe, ProbeError};
use crate::resource::Resource;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Ready when `sh -c <command>` exits with status 0
///
/// Every attempt starts a fresh process group. The whole group is killed
/// when the attempt ends, times out or is dropped, so nothing the shell
/// forked outlives the attempt.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandProbe;

#[async_trait]
impl Probe for CommandProbe {
    async fn probe(&self, resource: &Resource, timeout: Duration) -> Result<(), ProbeError> {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&resource.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(ProbeError::Spawn)?;
        let _group = group::ProcessGroup::leader(child.id());

        let waited = tokio::time::timeout(timeout, child.wait()).await;
        let status = match waited {
            Ok(status) => status.map_err(ProbeError::Spawn)?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(ProbeError::Timeout(timeout));
            }
        };

        if status.success() {
            Ok(())
        } else {
            Err(ProbeError::Exit(status))
        }
    }
}

#[cfg(unix)]
mod group {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    /// Kills the process group led by the probe's shell on drop
    pub(super) struct ProcessGroup(Option<Pid>);

    impl ProcessGroup {
        pub(super) fn leader(pid: Option<u32>) -> Self {
            Self(
                pid.and_then(|pid| i32::try_from(pid).ok())
                    .map(Pid::from_raw),
            )
        }
    }

    impl Drop for ProcessGroup {
        fn drop(&mut self) {
            if let Some(pgid) = self.0.take() {
                // ESRCH once every member has exited
                let _ = killpg(pgid, Signal::SIGKILL);
            }
        }
    }
}

#[cfg(not(unix))]
mod group {
    pub(super) struct ProcessGroup;

    impl ProcessGroup {
        pub(super) fn leader(_pid: Option<u32>) -> Self {
            Self
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
