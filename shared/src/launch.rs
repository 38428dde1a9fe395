//! Launch records kept by the supervisor and served by the JSON API

use serde::{Deserialize, Serialize};

use crate::{now_ms, CommandKind};

/// Lifecycle of one script launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LaunchStatus {
    /// Process spawned and not yet reaped
    Running,
    /// Process exited; `code` is `None` when killed by a signal
    Exited { code: Option<i32> },
    /// Process could not be spawned or waited on
    Failed { message: String },
    /// Process outlived the configured timeout and was killed
    TimedOut,
    /// Launch refused by the gate
    Rejected { message: String },
}

impl LaunchStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, LaunchStatus::Running)
    }

    /// True only for a clean zero exit
    pub fn is_success(&self) -> bool {
        matches!(self, LaunchStatus::Exited { code: Some(0) })
    }
}

/// History entry for one launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub launch_id: u64,
    pub command: CommandKind,
    pub started_at_ms: u64,
    pub finished_at_ms: Option<u64>,
    pub status: LaunchStatus,
}

impl LaunchRecord {
    /// Create a record for a launch that is starting now
    pub fn running(launch_id: u64, command: CommandKind) -> Self {
        Self {
            launch_id,
            command,
            started_at_ms: now_ms(),
            finished_at_ms: None,
            status: LaunchStatus::Running,
        }
    }

    /// Create an already-finished record for a refused launch
    pub fn rejected(launch_id: u64, command: CommandKind, message: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            launch_id,
            command,
            started_at_ms: now,
            finished_at_ms: Some(now),
            status: LaunchStatus::Rejected {
                message: message.into(),
            },
        }
    }

    /// Mark the launch finished with the given status
    pub fn finish(&mut self, status: LaunchStatus) {
        self.finished_at_ms = Some(now_ms());
        self.status = status;
    }

    /// Wall-clock run time, once finished
    pub fn duration_ms(&self) -> Option<u64> {
        self.finished_at_ms
            .map(|end| end.saturating_sub(self.started_at_ms))
    }
}
