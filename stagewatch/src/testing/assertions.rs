//! Assertions and polling helpers for tests.

use std::time::Duration;

use crate::core::{OverallStatus, StageId, StageStatus};
use crate::derive::PipelineProgress;

/// Virtual or real time `eventually` waits before giving up.
pub const EVENTUALLY_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Asserts the status of one stage.
pub fn assert_stage_status(progress: &PipelineProgress, stage: StageId, expected: StageStatus) {
    let actual = progress.status_of(stage);
    assert_eq!(
        actual, expected,
        "Expected stage {stage} to be {expected:?}, got {actual:?}"
    );
}

/// Asserts the statuses of all stages in pipeline order.
pub fn assert_stage_statuses(progress: &PipelineProgress, expected: &[StageStatus]) {
    let actual: Vec<StageStatus> = progress.stages.iter().map(|s| s.status).collect();
    assert_eq!(actual, expected, "Unexpected stage statuses");
}

/// Asserts the overall run status.
pub fn assert_overall(progress: &PipelineProgress, expected: OverallStatus) {
    assert_eq!(
        progress.overall, expected,
        "Expected overall {expected:?}, got {:?}",
        progress.overall
    );
}

/// Polls `condition` until it holds, panicking after [`EVENTUALLY_TIMEOUT`].
///
/// Works with paused Tokio time: each poll sleeps, which lets timers fire.
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + EVENTUALLY_TIMEOUT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Condition not met within {EVENTUALLY_TIMEOUT:?}"
        );
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
