use super::*;

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://ei.palmetto.com/api/v0/bem/calculate".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            missing_months: MissingMonthPolicy::ZeroFill,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/energymuffin.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            tariff: TariffSchedule::default(),
            aggregation: AggregationConfig::default(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}
