//! Command dispatch for the control panel
//!
//! This module handles:
//! - Resolving the `command` request parameter against the catalog
//! - Asking the supervisor for a launch slot
//! - Launching the script and handing it to the supervisor

mod catalog;
pub(crate) mod executor;

pub use catalog::{ScriptCatalog, ScriptSpec};
pub use executor::{CommandExecutor, DispatchOutcome};
