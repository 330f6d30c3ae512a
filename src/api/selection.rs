use crate::api::{parse_symbol, AppState};
use crate::error::AppError;
use crate::orchestration::RecommendationSet;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub symbol: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub symbol: Option<String>,
    /// False when the computed result was superseded before it could be
    /// applied.
    pub applied: bool,
    pub recommendations: Option<RecommendationSet>,
}

pub async fn select_symbol(
    State(state): State<AppState>,
    body: Result<Json<SelectRequest>, JsonRejection>,
) -> Result<Json<SelectionResponse>, AppError> {
    let Json(body) = body?;
    let symbol = parse_symbol(&body.symbol)?;
    state.service.select(symbol.clone());
    let applied = state.service.compute_selected().await?;

    Ok(Json(SelectionResponse {
        symbol: Some(symbol.to_string()),
        applied: applied.is_some(),
        recommendations: applied.map(|set| set.as_ref().clone()),
    }))
}

pub async fn get_selection(State(state): State<AppState>) -> Result<Json<SelectionResponse>, AppError> {
    let current = state.service.current();
    Ok(Json(SelectionResponse {
        symbol: state.service.selected().map(|s| s.to_string()),
        applied: current.is_some(),
        recommendations: current.map(|set| set.as_ref().clone()),
    }))
}
