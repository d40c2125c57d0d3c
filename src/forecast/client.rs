use crate::config::ApiConfig;
use crate::error::{MuffinError, Result};
use crate::forecast::payload::ForecastPayload;
use crate::logging::{StructuredLogger, get_logger};
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;

/// Longest slice of an error body copied into logs and error messages
const BODY_EXCERPT_CHARS: usize = 300;

/// Remote building energy model calculation
#[async_trait::async_trait]
pub trait ForecastClient: Send + Sync {
    /// Submit a payload and return the raw response body
    async fn calculate(&self, payload: &ForecastPayload) -> Result<String>;
}

/// reqwest-backed client for the BEM calculate endpoint
pub struct BemApiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    logger: StructuredLogger,
}

impl BemApiClient {
    /// Create new client; the underlying connection pool is shared across requests
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MuffinError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.trim().to_string(),
            logger: get_logger("bem_client"),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ForecastClient for BemApiClient {
    async fn calculate(&self, payload: &ForecastPayload) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(MuffinError::config("Forecast API key is not configured"));
        }

        self.logger.debug(&format!(
            "POST {} (setpoints={})",
            self.endpoint,
            payload.setpoints().len()
        ));
        let resp = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, concat!("energymuffin/", env!("APP_VERSION")))
            .header("X-API-Key", &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let excerpt = excerpt(&body);
            self.logger
                .error(&format!("Forecast API error: {} {}", status, excerpt));
            return Err(MuffinError::upstream_transport(
                Some(status.as_u16()),
                format!("forecast API returned {}: {}", status, excerpt),
            ));
        }

        let body = resp.text().await?;
        self.logger
            .debug(&format!("Forecast API answered {} bytes", body.len()));
        Ok(body)
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    out.push('…');
    out
}
