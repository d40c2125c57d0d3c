use anyhow::Result;
use energymuffin::config::Config;
use energymuffin::forecast::{BemApiClient, ForecastService};
use energymuffin::logging::{get_logger, init_logging};
use energymuffin::web::{AppState, serve};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let logger = get_logger("main");
    if let Err(e) = config.validate() {
        logger.error(&format!("Invalid configuration: {}", e));
        return Err(anyhow::anyhow!("Invalid configuration: {}", e));
    }

    let client = BemApiClient::new(&config.api)
        .map_err(|e| anyhow::anyhow!("Failed to create forecast client: {}", e))?;
    logger.info(&format!(
        "EnergyMuffin {} starting up (endpoint {})",
        env!("APP_VERSION"),
        client.endpoint()
    ));
    let service = ForecastService::from_config(Arc::new(client), &config);

    serve(AppState::new(service), &config.web.host, config.web.port).await
}
