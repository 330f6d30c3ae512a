use crate::api::{parse_symbol, AppState};
use crate::domain::BuySequenceOrder;
use crate::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    pub symbol: String,
    /// Indices of the rungs to keep. Empty keeps the ladder unchanged.
    #[serde(default)]
    pub selected: Vec<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustResponse {
    pub symbol: String,
    pub orders: Vec<BuySequenceOrder>,
}

pub async fn adjust_buy_sequence(
    State(state): State<AppState>,
    body: Result<Json<AdjustRequest>, JsonRejection>,
) -> Result<Json<AdjustResponse>, AppError> {
    let Json(body) = body?;
    let symbol = parse_symbol(&body.symbol)?;
    let orders = state
        .service
        .adjusted_buy_sequence(&symbol, &body.selected)
        .await?;

    Ok(Json(AdjustResponse {
        symbol: symbol.to_string(),
        orders,
    }))
}
