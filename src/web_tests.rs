#![cfg(test)]

use super::error::MuffinError;
use super::forecast::{ForecastClient, ForecastPayload, ForecastService, MissingMonthPolicy, TariffSchedule};
use super::web::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

/// Answers every call with the same outcome
struct FixedClient(std::result::Result<String, u16>);

#[async_trait::async_trait]
impl ForecastClient for FixedClient {
    async fn calculate(&self, _payload: &ForecastPayload) -> crate::Result<String> {
        match &self.0 {
            Ok(body) => Ok(body.clone()),
            Err(status) => Err(MuffinError::upstream_transport(
                Some(*status),
                format!("forecast API returned {}", status),
            )),
        }
    }
}

fn state_with(client: FixedClient) -> AppState {
    AppState::new(ForecastService::new(
        Arc::new(client),
        TariffSchedule::default(),
        MissingMonthPolicy::ZeroFill,
    ))
}

fn flat_month() -> String {
    serde_json::json!({"data": {"intervals": [
        {"from_datetime": "2023-01-01T10:00:00", "to_datetime": "2023-01-01T11:00:00",
         "variable": "consumption.electricity", "value": 10.0},
        {"from_datetime": "2023-01-01T17:00:00", "to_datetime": "2023-01-01T18:00:00",
         "variable": "consumption.electricity", "value": 10.0}
    ]}})
    .to_string()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_consumption(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/consumption")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const WINDOW: &str = r#"{"forecast": {"address": "1065 Evelyn Ave. Albany, CA 94706",
    "from_datetime": "2023-01-01T00:00:00", "to_datetime": "2023-02-01T00:00:00"}}"#;

#[tokio::test]
async fn root_greets() {
    let router = build_router(state_with(FixedClient(Ok(flat_month()))));
    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Welcome to the EnergyMuffin Data API!");
}

#[tokio::test]
async fn health_reports_version() {
    let router = build_router(state_with(FixedClient(Ok(flat_month()))));
    let response = router
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("APP_VERSION"));
}

#[tokio::test]
async fn tariff_exposes_rates() {
    let router = build_router(state_with(FixedClient(Ok(flat_month()))));
    let response = router
        .oneshot(Request::builder().uri("/api/tariff").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["peak_rate"], 0.40);
    assert_eq!(body["peak_start_hour"], 16);
}

#[tokio::test]
async fn consumption_returns_monthly_rows() {
    let router = build_router(state_with(FixedClient(Ok(flat_month()))));
    let response = router.oneshot(post_consumption(WINDOW)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let rows = body["monthly_forecasts"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["month_year"], "2023-01");
    let expected = 10.0 * 0.37 + 10.0 * 0.40;
    assert!((rows[0]["baseline_cost"].as_f64().unwrap() - expected).abs() < 1e-9);
    assert_eq!(rows[0]["action_savings"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn missing_window_is_bad_request() {
    let router = build_router(state_with(FixedClient(Ok(flat_month()))));
    let response = router.oneshot(post_consumption("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "input");
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("No forecast information provided")
    );
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let router = build_router(state_with(FixedClient(Ok(flat_month()))));
    let response = router.oneshot(post_consumption("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "input");
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let router = build_router(state_with(FixedClient(Err(503))));
    let response = router.oneshot(post_consumption(WINDOW)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await["error"], "upstream_transport");
}

#[tokio::test]
async fn missing_electricity_is_bad_gateway() {
    let body = serde_json::json!({"data": {"intervals": [
        {"from_datetime": "2023-01-01T10:00:00", "to_datetime": "2023-01-01T11:00:00",
         "variable": "consumption.fossil_fuel", "value": 1.0}
    ]}})
    .to_string();
    let router = build_router(state_with(FixedClient(Ok(body))));
    let response = router.oneshot(post_consumption(WINDOW)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await["error"], "data_incomplete");
}

#[test]
fn status_mapping_by_kind() {
    assert_eq!(
        MuffinError::validation("forecast.address", "empty").status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        MuffinError::duplicate_interval("2023-01-01 00:00:00", "consumption.electricity")
            .status_code(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        MuffinError::config("no key").status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn bind_addr_falls_back_to_loopback() {
    let (addr, ok) = bind_addr("0.0.0.0", 8000);
    assert!(ok);
    assert_eq!(addr.port(), 8000);
    let (addr, ok) = bind_addr("not-a-host", 8000);
    assert!(!ok);
    assert_eq!(addr.ip().to_string(), "127.0.0.1");
}
