//! Launch Gate
//!
//! Decides whether a new script may start given the scripts already running.
//! Under the exclusive policy a second script is refused while the first is
//! still in flight, so two flight patterns never race each other. Recovery
//! commands (landing, disarm) are always admitted so a hung script cannot
//! lock the aircraft out of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CommandKind;

/// How concurrent launches are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchPolicy {
    /// Only one script runs at a time, except recovery commands
    #[default]
    Exclusive,
    /// Every request launches, regardless of what is already running
    Concurrent,
}

/// Result of asking the gate for a launch slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Launch may proceed; the slot is held until released
    Admit,
    /// Another script is still running
    Refuse { running: Vec<(u64, CommandKind)> },
}

/// Tracks running launches and applies the launch policy
#[derive(Debug)]
pub struct LaunchGate {
    policy: LaunchPolicy,
    running: BTreeMap<u64, CommandKind>,
}

impl LaunchGate {
    pub fn new(policy: LaunchPolicy) -> Self {
        Self {
            policy,
            running: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> LaunchPolicy {
        self.policy
    }

    /// Try to reserve a slot for `launch_id`
    pub fn admit(&mut self, launch_id: u64, kind: CommandKind) -> GateDecision {
        if self.policy == LaunchPolicy::Exclusive && !self.is_idle() && !kind.is_recovery() {
            return GateDecision::Refuse {
                running: self.running(),
            };
        }

        self.running.insert(launch_id, kind);
        GateDecision::Admit
    }

    /// Release the slot held by `launch_id`
    pub fn release(&mut self, launch_id: u64) -> Option<CommandKind> {
        self.running.remove(&launch_id)
    }

    /// Running launches, oldest first
    pub fn running(&self) -> Vec<(u64, CommandKind)> {
        self.running.iter().map(|(id, kind)| (*id, *kind)).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }
}

impl Default for LaunchGate {
    fn default() -> Self {
        Self::new(LaunchPolicy::default())
    }
}
