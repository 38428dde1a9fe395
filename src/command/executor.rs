//! Command executor - resolves a request parameter and launches its script

use super::catalog::ScriptCatalog;
use crate::launcher::ScriptLauncher;
use crate::supervisor::{Admission, LaunchSupervisor};
use dronectl_shared::CommandKind;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What a request's `command` parameter led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No command parameter; nothing launched
    NoCommand,
    /// Unknown or disabled command; silently ignored
    Ignored { raw: String, reason: String },
    /// Script started and is being supervised
    Launched { launch_id: u64, command: CommandKind },
    /// Refused because another script is still running
    Busy {
        command: CommandKind,
        running: Vec<(u64, CommandKind)>,
    },
    /// Script could not be started
    LaunchFailed {
        launch_id: u64,
        command: CommandKind,
        message: String,
    },
}

impl DispatchOutcome {
    /// One-line description for request logs
    pub fn summary(&self) -> String {
        match self {
            DispatchOutcome::NoCommand => "no command".into(),
            DispatchOutcome::Ignored { raw, reason } => format!("ignored {raw:?} ({reason})"),
            DispatchOutcome::Launched { launch_id, command } => {
                format!("launched #{launch_id} {command}")
            }
            DispatchOutcome::Busy { command, running } => {
                format!("{command} refused, {} running", running.len())
            }
            DispatchOutcome::LaunchFailed {
                launch_id,
                command,
                message,
            } => format!("#{launch_id} {command} failed: {message}"),
        }
    }
}

/// Turns panel requests into supervised script launches
pub struct CommandExecutor {
    catalog: ScriptCatalog,
    launcher: Arc<dyn ScriptLauncher>,
    supervisor: Arc<LaunchSupervisor>,
}

impl CommandExecutor {
    pub fn new(
        catalog: ScriptCatalog,
        launcher: Arc<dyn ScriptLauncher>,
        supervisor: Arc<LaunchSupervisor>,
    ) -> Self {
        Self {
            catalog,
            launcher,
            supervisor,
        }
    }

    pub fn catalog(&self) -> &ScriptCatalog {
        &self.catalog
    }

    pub fn supervisor(&self) -> &LaunchSupervisor {
        &self.supervisor
    }

    /// Dispatch the raw `command` parameter of one request
    pub async fn execute(&self, raw: Option<&str>) -> DispatchOutcome {
        let Some(raw) = raw else {
            return DispatchOutcome::NoCommand;
        };

        let kind = match CommandKind::parse(raw) {
            Ok(kind) => kind,
            Err(e) => {
                debug!("Ignoring command {:?}: {}", raw, e);
                return DispatchOutcome::Ignored {
                    raw: raw.to_string(),
                    reason: e.to_string(),
                };
            }
        };

        let Some(spec) = self.catalog.get(kind) else {
            debug!("Ignoring disabled command {}", kind);
            return DispatchOutcome::Ignored {
                raw: raw.to_string(),
                reason: format!("Command disabled: {kind}"),
            };
        };

        let launch_id = match self.supervisor.admit(kind).await {
            Admission::Admitted { launch_id } => launch_id,
            Admission::Refused { launch_id, running } => {
                warn!(
                    "Launch #{} {} refused, still running: {:?}",
                    launch_id, kind, running
                );
                return DispatchOutcome::Busy {
                    command: kind,
                    running,
                };
            }
        };

        info!(
            "Executing command: #{} {} via {} `{}`",
            launch_id,
            kind,
            self.launcher.name(),
            spec.command_line()
        );

        match self.launcher.launch(kind, spec).await {
            Ok(script) => {
                let _supervision = self.supervisor.watch(launch_id, kind, script);
                DispatchOutcome::Launched {
                    launch_id,
                    command: kind,
                }
            }
            Err(e) => {
                error!("Launch #{} {} failed: {}", launch_id, kind, e);
                let message = e.to_string();
                self.supervisor.fail(launch_id, message.clone()).await;
                DispatchOutcome::LaunchFailed {
                    launch_id,
                    command: kind,
                    message,
                }
            }
        }
    }
}
