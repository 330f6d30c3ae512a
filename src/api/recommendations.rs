use crate::api::{parse_symbol, AppState};
use crate::error::AppError;
use crate::orchestration::RecommendationSet;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Upper bound on symbols per batch request.
pub const MAX_BATCH_SYMBOLS: usize = 25;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsQuery {
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQuery {
    /// Comma-separated symbols.
    pub symbols: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<RecommendationSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
}

pub async fn get_recommendations(
    params: Result<Query<RecommendationsQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<RecommendationSet>, AppError> {
    let Query(params) = params?;
    let symbol = parse_symbol(&params.symbol)?;
    let set = state.service.recommendations(&symbol).await?;
    Ok(Json(set.as_ref().clone()))
}

/// One failing symbol does not fail the batch; its entry carries the error.
pub async fn get_recommendations_batch(
    params: Result<Query<BatchQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<BatchResponse>, AppError> {
    let Query(params) = params?;
    let mut symbols = Vec::new();
    for raw in params.symbols.split(',').filter(|s| !s.trim().is_empty()) {
        let symbol = parse_symbol(raw)?;
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    if symbols.is_empty() {
        return Err(AppError::BadRequest("symbols must name at least one symbol".into()));
    }
    if symbols.len() > MAX_BATCH_SYMBOLS {
        return Err(AppError::BadRequest(format!(
            "at most {} symbols per request",
            MAX_BATCH_SYMBOLS
        )));
    }

    let results = state
        .service
        .batch(&symbols)
        .await
        .into_iter()
        .map(|(symbol, result)| match result {
            Ok(set) => BatchEntry {
                symbol: symbol.to_string(),
                recommendations: Some(set.as_ref().clone()),
                error: None,
            },
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "batch entry failed");
                BatchEntry {
                    symbol: symbol.to_string(),
                    recommendations: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    Ok(Json(BatchResponse { results }))
}
