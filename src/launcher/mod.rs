//! Script launching for the control panel
//!
//! This module handles:
//! - Spawning the external autopilot scripts
//! - Optionally forwarding their output into the log
//! - Waiting on and killing launched processes

mod process;
mod traits;

pub use process::ProcessLauncher;
pub use traits::{RunningScript, ScriptLauncher};

use thiserror::Error;

/// Errors raised while launching or supervising a script
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait on script: {0}")]
    Wait(#[source] std::io::Error),

    #[error("failed to kill script: {0}")]
    Kill(#[source] std::io::Error),
}
