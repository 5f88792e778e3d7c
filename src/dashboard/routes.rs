//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.
//! Every mutating command runs under the write lock and persists the
//! session before the lock is released.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::engine::period::PeriodChange;
use crate::engine::session::{
    LogMutation, SessionController, SessionSnapshot, SettlementReport, SetupSummary, GRID_COLUMNS,
};
use crate::storage;
use crate::strategy::Analysis;
use crate::types::{BalancePoint, Outcome, PanelError};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub session: RwLock<SessionController>,
    /// Where to persist the session after each command. `None` disables it.
    pub state_file: Option<String>,
}

impl DashboardState {
    pub fn new(controller: SessionController, state_file: Option<String>) -> Self {
        Self {
            session: RwLock::new(controller),
            state_file,
        }
    }

    fn persist(&self, controller: &SessionController) {
        let Some(path) = self.state_file.as_deref() else {
            return;
        };
        if let Err(e) = storage::save_session(controller.session(), Some(path)) {
            warn!(error = %e, path, "Failed to save session");
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApiError {
    Panel(PanelError),
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl From<PanelError> for ApiError {
    fn from(e: PanelError) -> Self {
        ApiError::Panel(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Panel(e @ PanelError::Blocked(_)) => (StatusCode::CONFLICT, e.to_string()),
            ApiError::Panel(e @ PanelError::InvalidConfiguration(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Panel(e @ PanelError::NotConfigured) => {
                (StatusCode::PRECONDITION_FAILED, e.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureRequest {
    pub initial_balance: Decimal,
    pub daily_goal: Decimal,
    /// Falls back to the configured default odds.
    pub odds: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeRequest {
    /// Outcome name or alias ("home", "red", "tie", ...).
    pub outcome: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettleRequest {
    pub won: bool,
}

/// A command result plus the snapshot to re-render from.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse<T> {
    pub result: T,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub total: usize,
    pub columns: usize,
    pub rows: Vec<Vec<Outcome>>,
    /// The same rows rendered as coloured markers.
    pub markers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Read handlers
// ---------------------------------------------------------------------------

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let ctl = state.session.read().await;
    Json(ctl.snapshot())
}

/// GET /api/analysis
pub async fn get_analysis(State(state): State<AppState>) -> Json<Analysis> {
    let ctl = state.session.read().await;
    Json(ctl.classify())
}

/// GET /api/history
pub async fn get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let ctl = state.session.read().await;
    let rows = ctl.history_grid();
    let markers = rows
        .iter()
        .map(|row| row.iter().map(Outcome::marker).collect::<Vec<_>>().join(" "))
        .collect();
    Json(HistoryResponse {
        total: ctl.session().history.len(),
        columns: GRID_COLUMNS,
        rows,
        markers,
    })
}

/// GET /api/balance-history
pub async fn get_balance_history(State(state): State<AppState>) -> Json<Vec<BalancePoint>> {
    let ctl = state.session.read().await;
    let history = ctl
        .session()
        .ledger
        .as_ref()
        .map(|l| l.bank_history.clone())
        .unwrap_or_default();
    Json(history)
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// POST /api/configure
pub async fn post_configure(
    State(state): State<AppState>,
    Json(req): Json<ConfigureRequest>,
) -> Result<Json<CommandResponse<SetupSummary>>, ApiError> {
    let mut ctl = state.session.write().await;
    let odds = req.odds.unwrap_or_else(|| ctl.default_odds());
    let summary = ctl.configure(req.initial_balance, req.daily_goal, odds)?;
    info!(
        balance = %summary.balance,
        daily_goal = %summary.daily_goal,
        stake = %summary.stake,
        "Session configured"
    );
    state.persist(&ctl);
    Ok(Json(CommandResponse {
        result: summary,
        snapshot: ctl.snapshot(),
    }))
}

/// POST /api/outcome
pub async fn post_outcome(
    State(state): State<AppState>,
    Json(req): Json<OutcomeRequest>,
) -> Result<Json<CommandResponse<LogMutation>>, ApiError> {
    let outcome: Outcome = req
        .outcome
        .parse()
        .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))?;

    let mut ctl = state.session.write().await;
    let mutation = ctl.record_outcome(outcome)?;
    info!(
        outcome = %outcome,
        rounds = mutation.log_len,
        awaiting = mutation.awaiting_settlement,
        "Outcome recorded"
    );
    state.persist(&ctl);
    Ok(Json(CommandResponse {
        result: mutation,
        snapshot: ctl.snapshot(),
    }))
}

/// POST /api/settle
pub async fn post_settle(
    State(state): State<AppState>,
    Json(req): Json<SettleRequest>,
) -> Result<Json<CommandResponse<SettlementReport>>, ApiError> {
    let mut ctl = state.session.write().await;
    let report = ctl.settle(req.won)?;
    info!(
        won = report.settlement.won,
        delta = %report.settlement.delta,
        balance = %report.settlement.balance,
        period_profit = %report.settlement.period_profit,
        "Entry settled"
    );
    if let Some(reason) = report.settlement.locked {
        warn!(%reason, "Period locked");
    }
    state.persist(&ctl);
    Ok(Json(CommandResponse {
        result: report,
        snapshot: ctl.snapshot(),
    }))
}

/// POST /api/period/next
pub async fn post_next_period(
    State(state): State<AppState>,
) -> Json<CommandResponse<PeriodChange>> {
    let mut ctl = state.session.write().await;
    let change = ctl.advance_period();
    info!(from = %change.from, to = %change.to, closing_profit = %change.closing_profit, "Period advanced");
    state.persist(&ctl);
    Json(CommandResponse {
        result: change,
        snapshot: ctl.snapshot(),
    })
}

/// POST /api/history/clear
pub async fn post_clear_history(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let mut ctl = state.session.write().await;
    ctl.clear_history();
    info!("Outcome log cleared");
    state.persist(&ctl);
    Json(ctl.snapshot())
}

/// POST /api/reset
pub async fn post_reset(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let mut ctl = state.session.write().await;
    ctl.reset_all();
    info!(id = %ctl.session().id, "Session reset");
    state.persist(&ctl);
    Json(ctl.snapshot())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
