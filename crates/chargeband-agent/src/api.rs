//! HTTP control surface.
//!
//! GET /                  — status banner
//! GET /automate-modem    — run one decision cycle
//! GET /modem-status      — modem liveness probe
//! GET /restart-modem     — ask the modem to reboot
//! GET /turn-on-charger   — reachability-gated turn-on
//! GET /turn-off-charger  — unconditional turn-off
//! GET /charger-status    — live relay position from the cloud API
//! GET /scheduler-status  — registered jobs and next-fire times
//!
//! Every route answers 200 with a JSON status object; collaborator failures
//! surface as `status: "error"` in the body, never as a 5xx from this layer.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use chargeband_common::models::OperationResult;

use crate::automation::Automation;
use crate::scheduler::Scheduler;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub automation: Arc<Automation>,
    pub scheduler: Arc<Scheduler>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/automate-modem", get(automate_modem))
        .route("/modem-status", get(modem_status))
        .route("/restart-modem", get(restart_modem))
        .route("/turn-on-charger", get(turn_on_charger))
        .route("/turn-off-charger", get(turn_off_charger))
        .route("/charger-status", get(charger_status))
        .route("/scheduler-status", get(scheduler_status))
        .with_state(state)
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "success",
        "message": "chargeband-agent running",
    }))
}

async fn automate_modem(State(state): State<AppState>) -> Json<OperationResult> {
    Json(state.automation.run_cycle().await)
}

async fn modem_status(State(state): State<AppState>) -> Json<OperationResult> {
    Json(state.automation.modem_status().await)
}

async fn restart_modem(State(state): State<AppState>) -> Json<OperationResult> {
    Json(state.automation.restart_modem().await)
}

async fn turn_on_charger(State(state): State<AppState>) -> Json<OperationResult> {
    Json(state.automation.gated_turn_on().await)
}

async fn turn_off_charger(State(state): State<AppState>) -> Json<OperationResult> {
    Json(state.automation.turn_off().await)
}

async fn charger_status(State(state): State<AppState>) -> Json<OperationResult> {
    Json(state.automation.charger_status().await)
}

async fn scheduler_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let jobs = state.scheduler.jobs().await;
    Json(serde_json::json!({
        "status": "ok",
        "jobs": jobs,
    }))
}
