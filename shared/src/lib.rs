//! Drone control panel shared types
//!
//! This crate provides the closed command catalog, launch records and the
//! launch gate used by the control panel server and its tests.

pub mod command;
pub mod gate;
pub mod launch;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-export commonly used types at crate root
pub use command::{CommandGroup, CommandKind, CommandParseError};
pub use gate::{GateDecision, LaunchGate, LaunchPolicy};
pub use launch::{LaunchRecord, LaunchStatus};

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Limits and defaults for script launches
pub mod limits {
    /// Interpreter used for the autopilot scripts
    pub const DEFAULT_PROGRAM: &str = "python3";

    /// Directory holding the autopilot scripts, relative to the working directory
    pub const DEFAULT_SCRIPT_DIR: &str = "Scripts/BasicArdu";

    /// Number of finished launches kept in the history
    pub const DEFAULT_HISTORY_LIMIT: usize = 50;

    /// Script timeout; 0 disables the timeout
    pub const DEFAULT_TIMEOUT_SECS: u64 = 0;

    /// Longest command identifier accepted from a request
    pub const MAX_COMMAND_LEN: usize = 32;
}
