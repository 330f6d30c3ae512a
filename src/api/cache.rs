use crate::api::{parse_symbol, AppState};
use crate::error::AppError;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub dropped: usize,
}

/// Drops cached inputs for one symbol, or for all symbols when none is given.
pub async fn refresh_cache(
    params: Result<Query<RefreshQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let Query(params) = params?;
    let symbol = params.symbol.as_deref().map(parse_symbol).transpose()?;
    let dropped = state.service.refresh(symbol.as_ref());
    Ok(Json(RefreshResponse { dropped }))
}
