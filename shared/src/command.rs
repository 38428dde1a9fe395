//! Closed catalog of panel commands
//!
//! Every button on the control page maps to exactly one [`CommandKind`], and
//! every kind maps to one pre-written autopilot script.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::limits::MAX_COMMAND_LEN;

/// Errors that can occur while parsing a command identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Empty command identifier")]
    Empty,

    #[error("Command identifier too long: {0} bytes (max: {MAX_COMMAND_LEN})")]
    TooLong(usize),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// Section of the control page a command is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandGroup {
    /// Motor arming state
    Status,
    /// Takeoff, landing and movement patterns
    Movement,
}

impl CommandGroup {
    pub fn title(&self) -> &'static str {
        match self {
            CommandGroup::Status => "Status",
            CommandGroup::Movement => "Movement",
        }
    }
}

/// A command the panel can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Arm,
    Disarm,
    Takeoff,
    Landing,
    Square,
    Vertical,
    Left,
    Right,
    Front,
    Back,
    Waypoint,
}

impl CommandKind {
    /// All commands, in page order
    pub const ALL: [CommandKind; 11] = [
        CommandKind::Arm,
        CommandKind::Disarm,
        CommandKind::Takeoff,
        CommandKind::Landing,
        CommandKind::Square,
        CommandKind::Vertical,
        CommandKind::Left,
        CommandKind::Right,
        CommandKind::Front,
        CommandKind::Back,
        CommandKind::Waypoint,
    ];

    /// Parse a request parameter into a command
    ///
    /// Matching is exact and case sensitive.
    pub fn parse(raw: &str) -> Result<Self, CommandParseError> {
        if raw.is_empty() {
            return Err(CommandParseError::Empty);
        }
        if raw.len() > MAX_COMMAND_LEN {
            return Err(CommandParseError::TooLong(raw.len()));
        }

        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.id() == raw)
            .ok_or_else(|| CommandParseError::UnknownCommand(raw.to_string()))
    }

    /// Identifier used in the `command` query parameter
    pub fn id(&self) -> &'static str {
        match self {
            CommandKind::Arm => "arm",
            CommandKind::Disarm => "disarm",
            CommandKind::Takeoff => "takeoff",
            CommandKind::Landing => "landing",
            CommandKind::Square => "square",
            CommandKind::Vertical => "vertical",
            CommandKind::Left => "left",
            CommandKind::Right => "right",
            CommandKind::Front => "front",
            CommandKind::Back => "back",
            CommandKind::Waypoint => "waypoint",
        }
    }

    /// Button caption
    pub fn label(&self) -> &'static str {
        match self {
            CommandKind::Arm => "Arming",
            CommandKind::Disarm => "Disarming",
            CommandKind::Takeoff => "Takeoff",
            CommandKind::Landing => "Landing",
            CommandKind::Square => "Square Movement",
            CommandKind::Vertical => "Vertical Movement",
            CommandKind::Left => "Left",
            CommandKind::Right => "Right",
            CommandKind::Front => "Front",
            CommandKind::Back => "Back",
            CommandKind::Waypoint => "Waypoint",
        }
    }

    pub fn group(&self) -> CommandGroup {
        match self {
            CommandKind::Arm | CommandKind::Disarm => CommandGroup::Status,
            _ => CommandGroup::Movement,
        }
    }

    /// Commands that bring the aircraft back to a safe state
    pub fn is_recovery(&self) -> bool {
        matches!(self, CommandKind::Landing | CommandKind::Disarm)
    }

    /// Script file launched for this command when no override is configured
    pub fn default_script(&self) -> &'static str {
        match self {
            CommandKind::Arm => "arming.py",
            CommandKind::Disarm => "disarming.py",
            CommandKind::Takeoff => "takeoff.py",
            CommandKind::Landing => "landing.py",
            CommandKind::Square => "squareMovement.py",
            CommandKind::Vertical => "vertMovement.py",
            CommandKind::Left => "moveLeft.py",
            CommandKind::Right => "moveRight.py",
            CommandKind::Front => "moveFront.py",
            CommandKind::Back => "moveBack.py",
            CommandKind::Waypoint => "waypointTesting.py",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CommandKind {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
