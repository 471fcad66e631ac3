use crate::{AppState, error::AppError, service};
use analytics::PerformanceReport;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chrono::{NaiveDate, Utc};
use core_types::{AnalysisRequest, Period};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// # GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "Agent Service is running" }))
}

/// # GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

/// # POST /tools/analyze_stock
/// Takes the full request in the body, e.g. `{"ticker": "AAPL", "period": "2y"}`.
pub async fn analyze_stock(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<PerformanceReport>, AppError> {
    let Json(request) = body?;
    run(&state, &request).await
}

/// Optional overrides for `GET /api/analysis/:ticker`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub period: Option<Period>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub risk_free_rate: Option<f64>,
}

/// # GET /api/analysis/:ticker
pub async fn get_analysis(
    Path(ticker): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<AnalysisQuery>, QueryRejection>,
) -> Result<Json<PerformanceReport>, AppError> {
    let Query(query) = query?;
    let request = AnalysisRequest {
        ticker,
        period: query.period,
        start: query.start,
        end: query.end,
        risk_free_rate: query.risk_free_rate,
    };
    run(&state, &request).await
}

async fn run(state: &AppState, request: &AnalysisRequest) -> Result<Json<PerformanceReport>, AppError> {
    let today = Utc::now().date_naive();
    let report = service::analyze(state.source.as_ref(), request, &state.analysis, today).await?;
    Ok(Json(report))
}
