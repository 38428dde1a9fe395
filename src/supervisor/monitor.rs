//! Launch Supervisor
//!
//! Owns the launch gate and the launch history. Every admitted script is
//! awaited in a background task so its exit status is logged, its gate slot
//! is released and, when a timeout is configured, it is killed on overrun.

use crate::config::LaunchConfig;
use crate::launcher::RunningScript;
use dronectl_shared::{
    CommandKind, GateDecision, LaunchGate, LaunchPolicy, LaunchRecord, LaunchStatus,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{error, info, warn};

/// Result of asking the supervisor to start a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Slot reserved; the caller must either `watch` or `fail` this launch
    Admitted { launch_id: u64 },
    /// Refused by the launch policy
    Refused {
        launch_id: u64,
        running: Vec<(u64, CommandKind)>,
    },
}

struct SupervisorState {
    gate: LaunchGate,
    history: VecDeque<LaunchRecord>,
}

/// Tracks launches from admission to exit
pub struct LaunchSupervisor {
    state: Arc<Mutex<SupervisorState>>,
    next_launch_id: AtomicU64,
    timeout: Option<Duration>,
    history_limit: usize,
}

impl LaunchSupervisor {
    pub fn new(config: &LaunchConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SupervisorState {
                gate: LaunchGate::new(config.policy),
                history: VecDeque::new(),
            })),
            next_launch_id: AtomicU64::new(0),
            timeout: config.timeout(),
            history_limit: config.history_limit,
        }
    }

    pub async fn policy(&self) -> LaunchPolicy {
        self.state.lock().await.gate.policy()
    }

    /// Reserve a launch slot for `kind`
    pub async fn admit(&self, kind: CommandKind) -> Admission {
        let launch_id = self.next_launch_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock().await;

        match state.gate.admit(launch_id, kind) {
            GateDecision::Admit => {
                push_bounded(
                    &mut state.history,
                    LaunchRecord::running(launch_id, kind),
                    self.history_limit,
                );
                Admission::Admitted { launch_id }
            }
            GateDecision::Refuse { running } => {
                let busy = running
                    .iter()
                    .map(|(id, k)| format!("{k}#{id}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                push_bounded(
                    &mut state.history,
                    LaunchRecord::rejected(launch_id, kind, format!("still running: {busy}")),
                    self.history_limit,
                );
                Admission::Refused { launch_id, running }
            }
        }
    }

    /// Record that an admitted launch never started
    pub async fn fail(&self, launch_id: u64, message: impl Into<String>) {
        let status = LaunchStatus::Failed {
            message: message.into(),
        };
        let _ = finish(&self.state, launch_id, status).await;
    }

    /// Supervise an admitted, running script until it exits
    ///
    /// The returned handle resolves to the final status; dropping it does
    /// not stop supervision.
    pub fn watch(
        &self,
        launch_id: u64,
        kind: CommandKind,
        mut script: Box<dyn RunningScript>,
    ) -> JoinHandle<LaunchStatus> {
        let state = self.state.clone();
        let timeout = self.timeout;

        info!("[LAUNCH] #{} {} started pid={:?}", launch_id, kind, script.pid());

        tokio::spawn(async move {
            let status = match timeout {
                Some(limit) => match tokio::time::timeout(limit, script.wait()).await {
                    Ok(result) => exit_status(result),
                    Err(_) => {
                        warn!("[LAUNCH] #{} {} exceeded {:?}, killing", launch_id, kind, limit);
                        if let Err(e) = script.kill().await {
                            error!("[LAUNCH] #{} {} kill failed: {}", launch_id, kind, e);
                        }
                        LaunchStatus::TimedOut
                    }
                },
                None => exit_status(script.wait().await),
            };

            let duration_ms = finish(&state, launch_id, status.clone()).await;

            if status.is_success() {
                info!("[LAUNCH] #{} {} finished in {:?}ms", launch_id, kind, duration_ms);
            } else {
                warn!(
                    "[LAUNCH] #{} {} ended after {:?}ms: {:?}",
                    launch_id, kind, duration_ms, status
                );
            }

            status
        })
    }

    /// Launch history, newest first
    pub async fn history(&self) -> Vec<LaunchRecord> {
        self.state.lock().await.history.iter().rev().cloned().collect()
    }

    /// Launches currently holding a gate slot
    pub async fn running(&self) -> Vec<(u64, CommandKind)> {
        self.state.lock().await.gate.running()
    }
}

fn exit_status(result: Result<Option<i32>, crate::launcher::LaunchError>) -> LaunchStatus {
    match result {
        Ok(code) => LaunchStatus::Exited { code },
        Err(e) => LaunchStatus::Failed {
            message: e.to_string(),
        },
    }
}

/// Release the gate slot and close out the history entry, returning the
/// run time when the entry is still in the history
async fn finish(
    state: &Mutex<SupervisorState>,
    launch_id: u64,
    status: LaunchStatus,
) -> Option<u64> {
    let mut state = state.lock().await;
    state.gate.release(launch_id);

    let record = state
        .history
        .iter_mut()
        .find(|r| r.launch_id == launch_id)?;
    record.finish(status);
    record.duration_ms()
}

/// Append a record, evicting the oldest finished entries past `limit`
fn push_bounded(history: &mut VecDeque<LaunchRecord>, record: LaunchRecord, limit: usize) {
    history.push_back(record);

    while history.len() > limit {
        match history.iter().position(|r| r.status.is_finished()) {
            Some(pos) => {
                history.remove(pos);
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::LaunchError;
    use async_trait::async_trait;
    use tokio::sync::oneshot;

    /// Script that exits when told to, or never
    struct FakeScript {
        exit: Option<oneshot::Receiver<i32>>,
        killed: Arc<std::sync::atomic::AtomicBool>,
    }

    #[async_trait]
    impl RunningScript for FakeScript {
        fn pid(&self) -> Option<u32> {
            None
        }

        async fn wait(&mut self) -> Result<Option<i32>, LaunchError> {
            match self.exit.as_mut() {
                Some(rx) => Ok(rx.await.ok()),
                None => std::future::pending().await,
            }
        }

        async fn kill(&mut self) -> Result<(), LaunchError> {
            self.killed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config(policy: LaunchPolicy) -> LaunchConfig {
        LaunchConfig {
            policy,
            ..Default::default()
        }
    }

    fn fake() -> (Box<dyn RunningScript>, oneshot::Sender<i32>) {
        let (tx, rx) = oneshot::channel();
        let script = FakeScript {
            exit: Some(rx),
            killed: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        };
        (Box::new(script), tx)
    }

    #[tokio::test]
    async fn test_exclusive_refuses_while_running() {
        let supervisor = LaunchSupervisor::new(&config(LaunchPolicy::Exclusive));

        let Admission::Admitted { launch_id } = supervisor.admit(CommandKind::Takeoff).await else {
            panic!("first launch should be admitted");
        };
        let (script, tx) = fake();
        let handle = supervisor.watch(launch_id, CommandKind::Takeoff, script);

        let refused = supervisor.admit(CommandKind::Square).await;
        assert_eq!(
            refused,
            Admission::Refused {
                launch_id: 2,
                running: vec![(1, CommandKind::Takeoff)],
            }
        );

        tx.send(0).unwrap();
        assert_eq!(handle.await.unwrap(), LaunchStatus::Exited { code: Some(0) });

        assert!(supervisor.running().await.is_empty());
        assert!(matches!(
            supervisor.admit(CommandKind::Square).await,
            Admission::Admitted { launch_id: 3 }
        ));
    }

    #[tokio::test]
    async fn test_concurrent_policy_admits_overlap() {
        let supervisor = LaunchSupervisor::new(&config(LaunchPolicy::Concurrent));
        assert_eq!(supervisor.policy().await, LaunchPolicy::Concurrent);

        assert!(matches!(
            supervisor.admit(CommandKind::Takeoff).await,
            Admission::Admitted { .. }
        ));
        assert!(matches!(
            supervisor.admit(CommandKind::Landing).await,
            Admission::Admitted { .. }
        ));
        assert_eq!(supervisor.running().await.len(), 2);
    }

    #[tokio::test]
    async fn test_history_records_exit_and_rejection() {
        let supervisor = LaunchSupervisor::new(&config(LaunchPolicy::Exclusive));

        let Admission::Admitted { launch_id } = supervisor.admit(CommandKind::Arm).await else {
            panic!("expected admission");
        };
        let (script, tx) = fake();
        let handle = supervisor.watch(launch_id, CommandKind::Arm, script);
        supervisor.admit(CommandKind::Takeoff).await;

        tx.send(1).unwrap();
        handle.await.unwrap();

        let history = supervisor.history().await;
        assert_eq!(history.len(), 2);
        // Newest first
        assert_eq!(history[0].command, CommandKind::Takeoff);
        assert!(matches!(history[0].status, LaunchStatus::Rejected { .. }));
        assert_eq!(history[1].status, LaunchStatus::Exited { code: Some(1) });
        assert!(history[1].finished_at_ms.is_some());
    }

    #[tokio::test]
    async fn test_landing_admitted_while_script_hangs() {
        let supervisor = LaunchSupervisor::new(&config(LaunchPolicy::Exclusive));

        let Admission::Admitted { launch_id } = supervisor.admit(CommandKind::Waypoint).await
        else {
            panic!("expected admission");
        };
        let hung = FakeScript {
            exit: None,
            killed: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        };
        let _handle = supervisor.watch(launch_id, CommandKind::Waypoint, Box::new(hung));

        assert!(matches!(
            supervisor.admit(CommandKind::Square).await,
            Admission::Refused { .. }
        ));
        assert!(matches!(
            supervisor.admit(CommandKind::Landing).await,
            Admission::Admitted { launch_id: 3 }
        ));
        assert!(matches!(
            supervisor.admit(CommandKind::Disarm).await,
            Admission::Admitted { launch_id: 4 }
        ));
        assert_eq!(supervisor.running().await.len(), 3);
    }

    #[tokio::test]
    async fn test_finished_launch_records_duration() {
        let supervisor = LaunchSupervisor::new(&config(LaunchPolicy::Exclusive));

        let Admission::Admitted { launch_id } = supervisor.admit(CommandKind::Left).await else {
            panic!("expected admission");
        };
        let (script, tx) = fake();
        let handle = supervisor.watch(launch_id, CommandKind::Left, script);
        tx.send(0).unwrap();

        assert!(handle.await.unwrap().is_success());
        let history = supervisor.history().await;
        assert!(history[0].duration_ms().is_some());
    }

    #[tokio::test]
    async fn test_fail_releases_slot() {
        let supervisor = LaunchSupervisor::new(&config(LaunchPolicy::Exclusive));

        let Admission::Admitted { launch_id } = supervisor.admit(CommandKind::Front).await else {
            panic!("expected admission");
        };
        supervisor.fail(launch_id, "python3 not found").await;

        assert!(supervisor.running().await.is_empty());
        let history = supervisor.history().await;
        assert_eq!(
            history[0].status,
            LaunchStatus::Failed {
                message: "python3 not found".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_kills_script() {
        let supervisor = LaunchSupervisor::new(&LaunchConfig {
            timeout_secs: 5,
            ..Default::default()
        });

        let killed = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let script = FakeScript {
            exit: None,
            killed: killed.clone(),
        };

        let Admission::Admitted { launch_id } = supervisor.admit(CommandKind::Waypoint).await
        else {
            panic!("expected admission");
        };
        let handle = supervisor.watch(launch_id, CommandKind::Waypoint, Box::new(script));

        assert_eq!(handle.await.unwrap(), LaunchStatus::TimedOut);
        assert!(killed.load(Ordering::SeqCst));
        assert!(supervisor.running().await.is_empty());
    }

    #[test]
    fn test_history_bound_keeps_running_entries() {
        let mut history = VecDeque::new();
        push_bounded(&mut history, LaunchRecord::running(1, CommandKind::Takeoff), 2);
        push_bounded(&mut history, LaunchRecord::rejected(2, CommandKind::Left, "busy"), 2);
        push_bounded(&mut history, LaunchRecord::rejected(3, CommandKind::Right, "busy"), 2);

        let ids: Vec<u64> = history.iter().map(|r| r.launch_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
