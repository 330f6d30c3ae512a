pub mod buy_sequence;
pub mod cache;
pub mod health;
pub mod recommendations;
pub mod selection;

use crate::config::Config;
use crate::domain::Symbol;
use crate::error::AppError;
use crate::orchestration::RecommendationService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    pub config: Config,
}

impl AppState {
    pub fn new(service: Arc<RecommendationService>, config: Config) -> Self {
        Self { service, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/recommendations", get(recommendations::get_recommendations))
        .route(
            "/v1/recommendations/batch",
            get(recommendations::get_recommendations_batch),
        )
        .route("/v1/buy-sequence/adjust", post(buy_sequence::adjust_buy_sequence))
        .route("/v1/cache/refresh", post(cache::refresh_cache))
        .route(
            "/v1/selection",
            get(selection::get_selection).post(selection::select_symbol),
        )
        .layer(cors)
        .with_state(state)
}

pub(crate) fn parse_symbol(raw: &str) -> Result<Symbol, AppError> {
    raw.parse::<Symbol>()
        .map_err(|e| AppError::BadRequest(format!("Invalid symbol {:?}: {}", raw, e)))
}
