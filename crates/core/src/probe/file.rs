// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem probe

use super::{Probe, ProbeError};
use crate::resource::Resource;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::time::Duration;

/// Wait until the file is gone instead of present
pub const TAG_ABSENT: &str = "absent";
/// Require a non-zero size, not just existence
pub const TAG_NONEMPTY: &str = "nonempty";

/// Ready when the path exists (or, tagged `absent`, when it does not)
#[derive(Clone, Copy, Debug, Default)]
pub struct FileProbe;

#[async_trait]
impl Probe for FileProbe {
    async fn probe(&self, resource: &Resource, _timeout: Duration) -> Result<(), ProbeError> {
        let path = resource.path.as_str();
        let absent = resource.has_tag(TAG_ABSENT);

        match tokio::fs::metadata(path).await {
            Ok(_) if absent => Err(ProbeError::StillPresent {
                path: path.to_string(),
            }),
            Ok(meta) if resource.has_tag(TAG_NONEMPTY) && meta.len() == 0 => {
                Err(ProbeError::EmptyFile {
                    path: path.to_string(),
                })
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if absent {
                    Ok(())
                } else {
                    Err(ProbeError::NotFound {
                        path: path.to_string(),
                    })
                }
            }
            Err(source) => Err(ProbeError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
