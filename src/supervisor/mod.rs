//! Launch Supervision
//!
//! Applies the launch policy, reaps finished scripts, enforces the optional
//! script timeout and keeps a bounded launch history.

mod monitor;

pub use monitor::{Admission, LaunchSupervisor};
