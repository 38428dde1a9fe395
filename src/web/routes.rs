//! HTTP handlers

use super::page;
use super::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use dronectl_shared::{CommandGroup, CommandKind, LaunchPolicy, LaunchRecord};
use serde::Serialize;
use tracing::debug;

/// Raw query pairs, kept in request order
type QueryPairs = Vec<(String, String)>;

/// Last `command` value in the query; a repeated parameter resolves to the
/// final occurrence
fn last_command(pairs: QueryPairs) -> Option<String> {
    pairs
        .into_iter()
        .rev()
        .find(|(key, _)| key == "command")
        .map(|(_, value)| value)
}

/// Control page; dispatches `?command=` before rendering
///
/// Never fails: an unreadable query string is treated as no command.
pub async fn panel(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Html<String> {
    let command = match query {
        Ok(Query(pairs)) => last_command(pairs),
        Err(e) => {
            debug!("Unreadable query string: {}", e);
            None
        }
    };

    let outcome = state.executor.execute(command.as_deref()).await;
    debug!("GET / -> {}", outcome.summary());
    let policy = state.executor.supervisor().policy().await;
    Html(page::render(state.executor.catalog(), &outcome, policy))
}

#[derive(Debug, Serialize)]
pub struct CommandInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub group: CommandGroup,
    pub enabled: bool,
}

pub async fn commands(State(state): State<AppState>) -> Json<Vec<CommandInfo>> {
    let catalog = state.executor.catalog();
    let list = CommandKind::ALL
        .into_iter()
        .map(|kind| CommandInfo {
            id: kind.id(),
            label: kind.label(),
            group: kind.group(),
            enabled: catalog.is_enabled(kind),
        })
        .collect();
    Json(list)
}

pub async fn launches(State(state): State<AppState>) -> Json<Vec<LaunchRecord>> {
    Json(state.executor.supervisor().history().await)
}

#[derive(Debug, Serialize)]
pub struct RunningLaunch {
    pub launch_id: u64,
    pub command: CommandKind,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub policy: LaunchPolicy,
    pub running: Vec<RunningLaunch>,
}

/// Launch policy and scripts currently running
pub async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    let supervisor = state.executor.supervisor();
    let running = supervisor
        .running()
        .await
        .into_iter()
        .map(|(launch_id, command)| RunningLaunch { launch_id, command })
        .collect();

    Json(StatusReport {
        policy: supervisor.policy().await,
        running,
    })
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
