use axum::http::StatusCode;
use chrono::NaiveDate;
use lotladder::api;
use lotladder::config::Config;
use lotladder::datasource::{DataSourceError, MockDataSource};
use lotladder::engine::FixedClock;
use lotladder::{Decimal, OptionsSummary, RecommendationService, SnapshotCache, Symbol, TaxLot, TimeMs};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tower::util::ServiceExt;

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn lot(day: i64, quantity: &str, cps: &str) -> TaxLot {
    TaxLot::new(TimeMs::new(day), d(quantity), d("32"), d(cps), Decimal::ONE).unwrap()
}

fn intc_mock() -> MockDataSource {
    let intc = Symbol::new("INTC");
    MockDataSource::new()
        .with_price(intc.clone(), d("32"))
        .with_lots(intc.clone(), vec![lot(1, "60", "20"), lot(2, "60", "25")])
        .with_atr(intc.clone(), d("2"))
        .with_options(
            intc,
            OptionsSummary {
                minimum_strike: Some(d("48")),
                minimum_days_to_expiration: Some(18),
                contract_count: 1,
            },
        )
}

fn setup_app(datasource: MockDataSource) -> axum::Router {
    let now = NaiveDate::from_ymd_opt(2025, 6, 2)
        .unwrap()
        .and_hms_opt(15, 0, 0)
        .unwrap();
    let config = Config {
        port: 0,
        database_path: ":memory:".to_string(),
        cache_capacity: NonZeroUsize::new(10).unwrap(),
        atr_period: 14,
    };
    let service = RecommendationService::new(
        Arc::new(datasource),
        Arc::new(SnapshotCache::new(config.cache_capacity)),
        Arc::new(FixedClock(now)),
    );
    api::create_router(api::AppState::new(Arc::new(service), config))
}

async fn request(app: axum::Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (status, json) = request(setup_app(intc_mock()), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_ready_reports_cache() {
    let (status, json) = request(setup_app(intc_mock()), "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ready");
    assert_eq!(json["cacheCapacity"], 10);
    assert_eq!(json["cachedSymbols"], 0);
}

#[tokio::test]
async fn test_recommendations_response_shape() {
    let (status, json) = request(setup_app(intc_mock()), "GET", "/v1/recommendations?symbol=intc", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["symbol"], "INTC");
    assert_eq!(json["currentPrice"].as_f64(), Some(32.0));
    assert_eq!(json["sellLadder"].as_array().unwrap().len(), 2);
    assert_eq!(json["sellLadder"][0]["strategy"], "ladder");
    assert_eq!(json["sellLadder"][0]["sharesToSell"].as_f64(), Some(60.0));
    assert_eq!(json["top100"]["breakEven"].as_f64(), Some(23.0));
    assert_eq!(json["top100"]["openDate"], "Top100");
    assert_eq!(json["minBreakEven"]["sharesToSell"].as_f64(), Some(1.0));
    assert_eq!(json["minAtr"]["openDate"], "MinATR");
    assert_eq!(json["onePercentTrailingStop"]["strategy"], "onePercentTrailingStop");
    assert_eq!(json["maxShares"]["sharesToSell"].as_f64(), Some(120.0));
    assert!(json["buy"].is_null());
    assert_eq!(json["percentBuys"].as_array().unwrap().len(), 5);
    assert_eq!(json["percentBuys"][1]["holdingPercent"].as_f64(), Some(5.0));
    assert_eq!(json["buySequence"].as_array().unwrap().len(), 4);
    assert_eq!(json["buySequence"][0]["orderIndex"], 0);
    assert_eq!(json["inputFingerprint"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_recommendations_rejects_invalid_symbol() {
    let (status, json) = request(setup_app(intc_mock()), "GET", "/v1/recommendations?symbol=%24%24", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Invalid symbol"));
}

#[tokio::test]
async fn test_recommendations_missing_symbol_param() {
    let (status, json) = request(setup_app(intc_mock()), "GET", "/v1/recommendations", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("symbol"));
}

#[tokio::test]
async fn test_batch_missing_symbols_param() {
    let (status, json) = request(setup_app(intc_mock()), "GET", "/v1/recommendations/batch", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_adjust_rejects_malformed_body() {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/buy-sequence/adjust")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"symbol\": "))
        .unwrap();
    let resp = setup_app(intc_mock()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_selection_body_missing_symbol() {
    let body = serde_json::json!({"ticker": "INTC"});
    let (status, json) = request(setup_app(intc_mock()), "POST", "/v1/selection", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("symbol"));
}

#[tokio::test]
async fn test_datasource_failure_is_bad_gateway() {
    let mock = MockDataSource::new().with_failure(DataSourceError::Unavailable("brokerage offline".into()));
    let (status, json) = request(setup_app(mock), "GET", "/v1/recommendations?symbol=INTC", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "Unavailable: brokerage offline");
}

#[tokio::test]
async fn test_batch_keeps_request_order() {
    let (status, json) = request(
        setup_app(intc_mock()),
        "GET",
        "/v1/recommendations/batch?symbols=AAPL,INTC,intc",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["symbol"], "AAPL");
    assert!(results[0]["recommendations"]["sellLadder"].as_array().unwrap().is_empty());
    assert_eq!(results[1]["symbol"], "INTC");
    assert_eq!(results[1]["recommendations"]["sellLadder"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_batch_requires_symbols() {
    let (status, _) = request(setup_app(intc_mock()), "GET", "/v1/recommendations/batch?symbols=,", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_adjust_buy_sequence() {
    let body = serde_json::json!({"symbol": "INTC", "selected": [0, 2, 9]});
    let (status, json) = request(setup_app(intc_mock()), "POST", "/v1/buy-sequence/adjust", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let orders = json["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["orderIndex"], 0);
    assert_eq!(orders[0]["trailingStopPercent"].as_f64(), Some(8.5));
    assert_eq!(orders[1]["orderIndex"], 2);
    assert_eq!(orders[1]["trailingStopPercent"].as_f64(), Some(25.5));
}

#[tokio::test]
async fn test_adjust_with_empty_selection_keeps_ladder() {
    let body = serde_json::json!({"symbol": "INTC", "selected": []});
    let (status, json) = request(setup_app(intc_mock()), "POST", "/v1/buy-sequence/adjust", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["orders"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_cache_refresh_counts_dropped_entries() {
    let app = setup_app(intc_mock());

    let (status, _) = request(app.clone(), "GET", "/v1/recommendations?symbol=INTC", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = request(app.clone(), "POST", "/v1/cache/refresh?symbol=INTC", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["dropped"], 1);

    let (_, json) = request(app, "POST", "/v1/cache/refresh", None).await;
    assert_eq!(json["dropped"], 0);
}

#[tokio::test]
async fn test_selection_round_trip() {
    let app = setup_app(intc_mock());

    let (status, json) = request(app.clone(), "GET", "/v1/selection", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["symbol"].is_null());
    assert_eq!(json["applied"], false);

    let body = serde_json::json!({"symbol": "INTC"});
    let (status, json) = request(app.clone(), "POST", "/v1/selection", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["symbol"], "INTC");
    assert_eq!(json["applied"], true);
    assert_eq!(json["recommendations"]["symbol"], "INTC");

    let (_, json) = request(app, "GET", "/v1/selection", None).await;
    assert_eq!(json["symbol"], "INTC");
    assert_eq!(json["applied"], true);
}
