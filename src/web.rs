//! Axum-based HTTP server with optional OpenAPI (utoipa) and Swagger UI

use crate::error::MuffinError;
use crate::forecast::{ConsumptionRequest, ConsumptionResponse, ForecastService, TariffSchedule};
use axum::extract::rejection::JsonRejection;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
}

impl AppState {
    pub fn new(service: ForecastService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct WelcomeBody {
    pub message: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: String,
    pub version: String,
}

/// Body of every non-2xx answer
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl MuffinError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for MuffinError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind().to_string(),
            detail: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/", responses(
    (status = 200, description = "Greeting", body = WelcomeBody)
)))]
pub async fn root() -> impl IntoResponse {
    Json(WelcomeBody {
        message: "Welcome to the EnergyMuffin Data API!".to_string(),
    })
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/health", responses(
    (status = 200, description = "Service is healthy", body = HealthBody)
)))]
pub async fn health() -> impl IntoResponse {
    Json(HealthBody {
        status: "ok".to_string(),
        version: env!("APP_VERSION").to_string(),
    })
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/tariff", responses(
    (status = 200, description = "Active tariff schedule", body = TariffSchedule)
)))]
pub async fn tariff(State(state): State<AppState>) -> Json<TariffSchedule> {
    Json(*state.service.tariff())
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/consumption",
    request_body = ConsumptionRequest,
    responses(
        (status = 200, description = "Monthly baseline vs. action costs", body = ConsumptionResponse),
        (status = 400, description = "Malformed or incomplete request", body = ErrorBody),
        (status = 502, description = "Forecasting API failure", body = ErrorBody),
    )
))]
pub async fn consumption(
    State(state): State<AppState>,
    body: Result<Json<ConsumptionRequest>, JsonRejection>,
) -> Result<Json<ConsumptionResponse>, MuffinError> {
    let Json(request) = body.map_err(|rejection| MuffinError::input(rejection.body_text()))?;
    let response = state.service.compare(&request).await?;
    Ok(Json(response))
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(root, health, tariff, consumption),
    components(schemas(
        WelcomeBody, HealthBody, ErrorBody, TariffSchedule,
        ConsumptionRequest, ConsumptionResponse,
        crate::forecast::ForecastWindow, crate::forecast::UsageRecord,
        crate::forecast::UsageVariable, crate::forecast::HvacDirective,
        crate::forecast::HvacMode, crate::forecast::MonthlyComparison,
    )),
    tags((name = "energymuffin", description = "EnergyMuffin Data API"))
)]
pub struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/tariff", get(tariff))
        .route("/consumption", post(consumption));

    #[cfg(feature = "openapi")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()),
        )
    };

    router
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Resolve the bind address, falling back to loopback on an unparsable host
pub fn bind_addr(host: &str, port: u16) -> (SocketAddr, bool) {
    match host.parse::<IpAddr>() {
        Ok(ip) => (SocketAddr::new(ip, port), true),
        Err(_) => (([127, 0, 0, 1], port).into(), false),
    }
}

pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let router = build_router(state);

    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={}, port={}",
        host, port
    ));

    let (addr, parsed_ok) = bind_addr(host, port);
    if !parsed_ok {
        logger.warn(&format!(
            "Invalid host '{}'; falling back to 127.0.0.1",
            host
        ));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (POST /consumption, docs /docs)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    logger.info("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        crate::logging::get_logger("web")
            .error(&format!("Failed to listen for shutdown signal: {}", e));
        std::future::pending::<()>().await;
    }
}
