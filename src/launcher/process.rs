//! OS process launcher backed by `tokio::process`

use super::traits::{RunningScript, ScriptLauncher};
use super::LaunchError;
use crate::command::ScriptSpec;
use async_trait::async_trait;
use dronectl_shared::CommandKind;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Child process wrapper implementing RunningScript
pub struct ChildScript {
    inner: Child,
}

impl ChildScript {
    pub fn new(child: Child) -> Self {
        Self { inner: child }
    }
}

#[async_trait]
impl RunningScript for ChildScript {
    fn pid(&self) -> Option<u32> {
        self.inner.id()
    }

    async fn wait(&mut self) -> Result<Option<i32>, LaunchError> {
        let status = self.inner.wait().await.map_err(LaunchError::Wait)?;
        Ok(status.code())
    }

    async fn kill(&mut self) -> Result<(), LaunchError> {
        self.inner.kill().await.map_err(LaunchError::Kill)
    }
}

/// Launches scripts as child processes
pub struct ProcessLauncher {
    capture_output: bool,
}

impl ProcessLauncher {
    /// Create a launcher; with `capture_output` the script's stdout and
    /// stderr are logged line by line, otherwise they are discarded
    pub fn new(capture_output: bool) -> Self {
        Self { capture_output }
    }
}

#[async_trait]
impl ScriptLauncher for ProcessLauncher {
    async fn launch(
        &self,
        kind: CommandKind,
        spec: &ScriptSpec,
    ) -> Result<Box<dyn RunningScript>, LaunchError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).stdin(Stdio::null());

        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }

        if self.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            command: spec.command_line(),
            source,
        })?;

        debug!("Spawned `{}` pid={:?}", spec.command_line(), child.id());

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(kind, "stdout", stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(kind, "stderr", stderr));
        }

        Ok(Box::new(ChildScript::new(child)))
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

/// Log every line a script prints until the stream closes
async fn forward_output<R>(kind: CommandKind, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => info!(target: "dronectl::script", "[{}:{}] {}", kind, stream, line),
            Ok(None) => break,
            Err(e) => {
                warn!("[{}] Failed to read script {}: {}", kind, stream, e);
                break;
            }
        }
    }
}
