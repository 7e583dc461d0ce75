use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use quotegate_core::{
    HistoryReport, HoldersReport, Operation, Period, QueryResult, Symbol, TableReport,
};

use crate::error::ApiError;
use crate::state::AppState;

/// One routing table for the whole gateway, one route per operation.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/api/info/:symbol", get(info))
        .route("/api/history/:symbol", get(history))
        .route("/api/financials/:symbol", get(financials))
        .route("/api/earnings/:symbol", get(earnings))
        .route("/api/holders/:symbol", get(holders))
        .route("/api/recommendations/:symbol", get(recommendations))
        .route("/api/calendar/:symbol", get(calendar))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub period: Option<String>,
}

async fn home() -> Json<Value> {
    let endpoints: serde_json::Map<String, Value> = Operation::ALL
        .iter()
        .map(|op| (op.route().to_owned(), Value::from(op.describe())))
        .collect();
    Json(json!({
        "message": "quote gateway",
        "endpoints": endpoints,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "yfinance-api" }))
}

async fn info(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<QueryResult>, ApiError> {
    let symbol = Symbol::parse(&symbol)?;
    Ok(Json(state.gateway.info(&symbol).await?))
}

async fn history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryReport>, ApiError> {
    let symbol = Symbol::parse(&symbol)?;
    let period = match query.period.as_deref() {
        Some(raw) => raw.parse::<Period>()?,
        None => Period::default(),
    };
    Ok(Json(state.gateway.history(&symbol, period).await?))
}

async fn financials(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<TableReport>, ApiError> {
    let symbol = Symbol::parse(&symbol)?;
    Ok(Json(state.gateway.financials(&symbol).await?))
}

async fn earnings(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<TableReport>, ApiError> {
    let symbol = Symbol::parse(&symbol)?;
    Ok(Json(state.gateway.earnings(&symbol).await?))
}

async fn holders(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<HoldersReport>, ApiError> {
    let symbol = Symbol::parse(&symbol)?;
    Ok(Json(state.gateway.holders(&symbol).await?))
}

async fn recommendations(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<TableReport>, ApiError> {
    let symbol = Symbol::parse(&symbol)?;
    Ok(Json(state.gateway.recommendations(&symbol).await?))
}

async fn calendar(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<QueryResult>, ApiError> {
    let symbol = Symbol::parse(&symbol)?;
    Ok(Json(state.gateway.calendar(&symbol).await?))
}
