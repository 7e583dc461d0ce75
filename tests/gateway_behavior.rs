//! Behavior tests for the HTTP surface: status codes, body shapes and the
//! error contract, driven end to end through the router with a scripted
//! provider.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};

use quotegate_core::{HoldersSnapshot, ProviderError};
use quotegate_tests::{app, candle, get, mapping, ScriptedProvider};

// =============================================================================
// Info
// =============================================================================

#[tokio::test]
async fn info_returns_the_provider_mapping_unchanged() {
    let provider = Arc::new(ScriptedProvider {
        info: Ok(mapping(&[
            ("shortName", json!("Apple Inc.")),
            ("sector", json!("Technology")),
            ("regularMarketPrice", json!(189.5)),
        ])),
        ..Default::default()
    });

    let (status, body) = get(app(provider), "/api/info/AAPL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "shortName": "Apple Inc.",
            "sector": "Technology",
            "regularMarketPrice": 189.5,
        })
    );
}

#[tokio::test]
async fn info_with_empty_mapping_returns_404() {
    let provider = Arc::new(ScriptedProvider::default());

    let (status, body) = get(app(provider), "/api/info/AAPL").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let detail = body["detail"].as_str().expect("detail message");
    assert!(detail.contains("info"));
    assert!(detail.contains("AAPL"));
}

#[tokio::test]
async fn symbol_lookup_is_case_insensitive() {
    let provider = Arc::new(ScriptedProvider {
        info: Ok(mapping(&[("shortName", json!("Apple Inc."))])),
        ..Default::default()
    });

    let (_, lower_body) = get(app(provider.clone()), "/api/info/aapl").await;
    let (_, upper_body) = get(app(provider.clone()), "/api/info/AAPL").await;

    assert_eq!(lower_body, upper_body);
    assert_eq!(
        provider.recorded_calls(),
        vec!["info AAPL", "info AAPL"],
        "both spellings must reach the provider uppercased"
    );
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn history_echoes_symbol_period_and_count() {
    let provider = Arc::new(ScriptedProvider {
        history: Ok(vec![candle("2024-01-02", 185.64), candle("2024-01-03", 184.25)]),
        ..Default::default()
    });

    let (status, body) = get(app(provider), "/api/history/aapl?period=5d").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], json!("AAPL"));
    assert_eq!(body["period"], json!("5d"));
    assert_eq!(body["count"], json!(2));
    let rows = body["data"].as_array().expect("data is an array");
    assert_eq!(rows.len(), 2);
    for row in rows {
        let date = row["Date"].as_str().expect("Date field");
        assert_eq!(date.len(), 10, "dates are YYYY-MM-DD: {date}");
        assert!(row.get("Open").is_some());
        assert!(row.get("Close").is_some());
    }
}

#[tokio::test]
async fn history_with_no_rows_returns_404() {
    let provider = Arc::new(ScriptedProvider::default());

    let (status, body) = get(app(provider), "/api/history/AAPL?period=1y").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let detail = body["detail"].as_str().expect("detail message");
    assert!(detail.contains("history"));
    assert!(detail.contains("AAPL"));
}

#[tokio::test]
async fn omitted_period_behaves_like_one_month() {
    let provider = Arc::new(ScriptedProvider {
        history: Ok(vec![candle("2024-01-02", 185.64)]),
        ..Default::default()
    });

    let (_, implicit) = get(app(provider.clone()), "/api/history/AAPL").await;
    let (_, explicit) = get(app(provider.clone()), "/api/history/AAPL?period=1mo").await;

    assert_eq!(implicit, explicit);
    assert_eq!(
        provider.recorded_calls(),
        vec!["history AAPL 1mo", "history AAPL 1mo"]
    );
}

#[tokio::test]
async fn unknown_period_is_rejected_with_400() {
    let provider = Arc::new(ScriptedProvider::default());

    let (status, body) = get(app(provider.clone()), "/api/history/AAPL?period=7w").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().expect("detail message");
    assert!(detail.contains("period"));
    assert!(
        provider.recorded_calls().is_empty(),
        "invalid input must not reach the provider"
    );
}

// =============================================================================
// Tabular operations
// =============================================================================

#[tokio::test]
async fn financials_are_wrapped_under_symbol_and_data() {
    let provider = Arc::new(ScriptedProvider {
        financials: Ok(mapping(&[(
            "totalRevenue",
            json!({"2023-09-30": 383285000000.0_f64}),
        )])),
        ..Default::default()
    });

    let (status, body) = get(app(provider), "/api/financials/aapl").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], json!("AAPL"));
    assert_eq!(
        body["data"]["totalRevenue"]["2023-09-30"],
        json!(383285000000.0_f64)
    );
}

#[tokio::test]
async fn earnings_with_empty_table_returns_404() {
    let provider = Arc::new(ScriptedProvider::default());

    let (status, body) = get(app(provider), "/api/earnings/MSFT").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let detail = body["detail"].as_str().expect("detail message");
    assert!(detail.contains("earnings"));
    assert!(detail.contains("MSFT"));
}

#[tokio::test]
async fn recommendations_round_trip() {
    let provider = Arc::new(ScriptedProvider {
        recommendations: Ok(mapping(&[(
            "0m",
            json!({"strongBuy": 11, "buy": 21, "hold": 6, "sell": 0, "strongSell": 0}),
        )])),
        ..Default::default()
    });

    let (status, body) = get(app(provider), "/api/recommendations/AAPL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["0m"]["strongBuy"], json!(11));
}

#[tokio::test]
async fn calendar_returns_a_bare_mapping() {
    let provider = Arc::new(ScriptedProvider {
        calendar: Ok(mapping(&[("exDividendDate", json!(1707436800))])),
        ..Default::default()
    });

    let (status, body) = get(app(provider), "/api/calendar/AAPL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"exDividendDate": 1707436800}));
}

// =============================================================================
// Holders
// =============================================================================

#[tokio::test]
async fn holders_with_only_major_block_omits_institutional_key() {
    let provider = Arc::new(ScriptedProvider {
        holders: Ok(HoldersSnapshot {
            major_holders: Some(mapping(&[("insidersPercentHeld", json!(0.02))])),
            institutional_holders: None,
        }),
        ..Default::default()
    });

    let (status, body) = get(app(provider), "/api/holders/AAPL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["major_holders"]["insidersPercentHeld"], json!(0.02));
    assert!(
        body.get("institutional_holders").is_none(),
        "absent block must be omitted, not null"
    );
}

#[tokio::test]
async fn holders_with_both_blocks_empty_returns_404() {
    let provider = Arc::new(ScriptedProvider {
        holders: Ok(HoldersSnapshot {
            major_holders: Some(Default::default()),
            institutional_holders: Some(Default::default()),
        }),
        ..Default::default()
    });

    let (status, _) = get(app(provider), "/api/holders/AAPL").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Error contract
// =============================================================================

#[tokio::test]
async fn provider_failure_surfaces_operation_and_cause() {
    let provider = Arc::new(ScriptedProvider {
        history: Err(ProviderError::upstream("rate limited")),
        ..Default::default()
    });

    let (status, body) = get(app(provider), "/api/history/AAPL").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().expect("detail message");
    assert!(detail.contains("history"));
    assert!(detail.contains("rate limited"));
    assert!(detail.starts_with("Error fetching"));
}

#[tokio::test]
async fn structured_not_found_is_not_rewrapped_as_500() {
    let provider = Arc::new(ScriptedProvider {
        info: Err(ProviderError::not_found(
            "Quote not found for ticker symbol: ZZZZ",
        )),
        ..Default::default()
    });

    let (status, _) = get(app(provider), "/api/info/ZZZZ").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn error_bodies_use_the_detail_key() {
    let provider = Arc::new(ScriptedProvider {
        calendar: Err(ProviderError::upstream("boom")),
        ..Default::default()
    });

    let (_, body) = get(app(provider), "/api/calendar/AAPL").await;

    let object = body.as_object().expect("error body is an object");
    assert_eq!(object.len(), 1);
    assert!(object.contains_key("detail"));
}

// =============================================================================
// Service surface
// =============================================================================

#[tokio::test]
async fn health_reports_service_identity() {
    let provider = Arc::new(ScriptedProvider::default());

    let (status, body) = get(app(provider), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "service": "yfinance-api"}));
}

#[tokio::test]
async fn home_banner_lists_every_operation_route() {
    let provider = Arc::new(ScriptedProvider::default());

    let (status, body) = get(app(provider), "/").await;

    assert_eq!(status, StatusCode::OK);
    let endpoints = body["endpoints"].as_object().expect("endpoint listing");
    assert_eq!(endpoints.len(), 7);
    for route in [
        "/api/info/{symbol}",
        "/api/history/{symbol}",
        "/api/financials/{symbol}",
        "/api/earnings/{symbol}",
        "/api/holders/{symbol}",
        "/api/recommendations/{symbol}",
        "/api/calendar/{symbol}",
    ] {
        assert!(endpoints.contains_key(route), "missing {route}");
    }
}

#[tokio::test]
async fn unknown_routes_fall_through_to_404() {
    let provider = Arc::new(ScriptedProvider::default());

    let (status, body) = get(app(provider), "/api/dividends/AAPL").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null, "axum fallback has no JSON body");
}
