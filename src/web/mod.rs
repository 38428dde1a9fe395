//! HTTP surface of the control panel
//!
//! - `GET /`, `GET /index` - control page, `?command=<id>` launches a script
//! - `GET /api/commands` - command catalog as JSON
//! - `GET /api/launches` - launch history, newest first
//! - `GET /api/status` - launch policy and running scripts
//! - `GET /healthz` - liveness

mod page;
mod routes;

use crate::command::CommandExecutor;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<CommandExecutor>,
}

impl AppState {
    pub fn new(executor: Arc<CommandExecutor>) -> Self {
        Self { executor }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::panel))
        .route("/index", get(routes::panel))
        .route("/api/commands", get(routes::commands))
        .route("/api/launches", get(routes::launches))
        .route("/api/status", get(routes::status))
        .route("/healthz", get(routes::healthz))
        .with_state(state)
}
