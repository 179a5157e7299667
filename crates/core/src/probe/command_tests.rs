// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::resource::parse_resource;
use std::time::Instant;
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn zero_exit_is_ready() {
    let resource = parse_resource("true").unwrap();
    CommandProbe.probe(&resource, TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn non_zero_exit_reports_status() {
    let resource = parse_resource("exit 3").unwrap();
    let err = CommandProbe.probe(&resource, TIMEOUT).await.unwrap_err();
    match err {
        ProbeError::Exit(status) => assert_eq!(status.code(), Some(3)),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn arguments_are_passed_through_the_shell() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("marker");
    let resource = parse_resource(&format!("touch {}", marker.display())).unwrap();

    CommandProbe.probe(&resource, TIMEOUT).await.unwrap();
    assert!(marker.exists());
}

#[tokio::test]
async fn slow_command_is_cut_off_at_timeout() {
    let resource = parse_resource("sleep 10").unwrap();
    let start = Instant::now();
    let err = CommandProbe
        .probe(&resource, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Timeout(_)), "got {err}");
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn missing_program_is_not_ready() {
    let resource = parse_resource("definitely-not-a-real-program-4711").unwrap();
    let err = CommandProbe.probe(&resource, TIMEOUT).await.unwrap_err();
    // sh reports 127 for unknown commands
    assert!(matches!(err, ProbeError::Exit(_)), "got {err}");
}

/// Shell line that forks a background job touching `marker` after a second
fn forking_command(marker: &std::path::Path) -> String {
    format!("(sleep 1 && touch '{}') & wait", marker.display())
}

#[tokio::test]
async fn timeout_kills_forked_descendants() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("survivor");
    let resource = parse_resource(&forking_command(&marker)).unwrap();

    let err = CommandProbe
        .probe(&resource, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Timeout(_)), "got {err}");

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(!marker.exists(), "background job outlived the attempt");
}

#[tokio::test]
async fn cancelled_wait_kills_forked_descendants() {
    use crate::policy::WaitConfig;
    use crate::poll::{Status, WaitError, Waiter};
    use tokio_util::sync::CancellationToken;

    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("survivor");
    let resources = vec![parse_resource(&forking_command(&marker)).unwrap()];

    let token = CancellationToken::new();
    let waiter = Waiter::new(CommandProbe, WaitConfig::default()).with_cancellation(token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();
    });

    let start = Instant::now();
    let err = waiter.wait_all(&resources).await.unwrap_err();
    canceller.await.unwrap();
    assert!(start.elapsed() < Duration::from_secs(1));
    match err {
        WaitError::Cancelled(report) => assert_eq!(report.outcomes[0].status, Status::Cancelled),
        other => panic!("unexpected error: {other}"),
    }

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(!marker.exists(), "background job outlived the cancelled attempt");
}
