//! Launcher trait abstraction for pluggable process backends

use super::LaunchError;
use crate::command::ScriptSpec;
use async_trait::async_trait;
use dronectl_shared::CommandKind;

/// A launched script that can be waited on or killed
#[async_trait]
pub trait RunningScript: Send + 'static {
    /// OS process id, if the backend has one
    fn pid(&self) -> Option<u32>;

    /// Wait for the script to exit, returning its exit code
    /// (`None` when terminated by a signal)
    async fn wait(&mut self) -> Result<Option<i32>, LaunchError>;

    /// Forcefully stop the script
    async fn kill(&mut self) -> Result<(), LaunchError>;
}

/// Factory for launching scripts
#[async_trait]
pub trait ScriptLauncher: Send + Sync {
    /// Start `spec` for `kind`, returning as soon as the process exists
    async fn launch(
        &self,
        kind: CommandKind,
        spec: &ScriptSpec,
    ) -> Result<Box<dyn RunningScript>, LaunchError>;

    /// Human-readable name for this backend
    fn name(&self) -> &'static str;
}
