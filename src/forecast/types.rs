//! Inbound request and outbound response models for the consumption endpoint

use crate::error::{MuffinError, Result};
use crate::forecast::aggregate::MonthlyComparison;
use crate::forecast::setpoint::{HvacMode, SetpointSchedule};
use crate::time::ApiDateTime;
use serde::{Deserialize, Serialize};

/// Granularity used when the caller does not pick one
pub const DEFAULT_GRANULARITY: &str = "hour";

/// Known-usage variable accepted from callers
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageVariable {
    #[serde(rename = "consumption.electricity")]
    Electricity,
    #[serde(rename = "consumption.fossil_fuel")]
    FossilFuel,
}

/// Billed or metered usage over a time range, forwarded as-is
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub from_datetime: ApiDateTime,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub to_datetime: ApiDateTime,
    pub variable: UsageVariable,
    pub value: f64,
}

/// Address and time window to forecast
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastWindow {
    pub address: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub from_datetime: ApiDateTime,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub to_datetime: ApiDateTime,
    #[serde(default)]
    pub granularity: Option<String>,
}

impl ForecastWindow {
    pub fn granularity(&self) -> &str {
        self.granularity
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(DEFAULT_GRANULARITY)
    }

    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(MuffinError::validation(
                "forecast.address",
                "Address cannot be empty",
            ));
        }
        if self.to_datetime.instant() <= self.from_datetime.instant() {
            return Err(MuffinError::validation(
                "forecast.to_datetime",
                format!(
                    "must be after from_datetime ({} >= {})",
                    self.from_datetime, self.to_datetime
                ),
            ));
        }
        Ok(())
    }
}

/// One HVAC behaviour change for the action scenario
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HvacDirective {
    pub variable: HvacMode,
    /// Hour of day the setpoint becomes active; wraps modulo 24, so -2 is 22
    pub start_time: i64,
    /// Number of hours the setpoint is held; zero or less holds it nowhere
    pub duration: i64,
    pub setpoint: i32,
}

impl HvacDirective {
    pub fn to_schedule(&self) -> SetpointSchedule {
        SetpointSchedule::generate(self.variable, self.start_time, self.duration, self.setpoint)
    }
}

/// Body of `POST /consumption`
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRequest {
    #[serde(default)]
    pub forecast: Option<ForecastWindow>,
    #[serde(default)]
    pub consumption_records: Option<Vec<UsageRecord>>,
    #[serde(default, rename = "HVAC_info")]
    pub hvac_info: Option<Vec<HvacDirective>>,
}

impl ConsumptionRequest {
    /// The forecast window, or an input error when it was not supplied
    pub fn window(&self) -> Result<&ForecastWindow> {
        let window = self
            .forecast
            .as_ref()
            .ok_or_else(|| MuffinError::input("No forecast information provided"))?;
        window.validate()?;
        Ok(window)
    }

    /// Known usage, `None` when absent or empty
    pub fn usage(&self) -> Option<&[UsageRecord]> {
        self.consumption_records
            .as_deref()
            .filter(|records| !records.is_empty())
    }

    pub fn hvac_directives(&self) -> &[HvacDirective] {
        self.hvac_info.as_deref().unwrap_or_default()
    }
}

/// Body returned by `POST /consumption`
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionResponse {
    pub monthly_forecasts: Vec<MonthlyComparison>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn window_json() -> serde_json::Value {
        json!({
            "address": "1065 Evelyn Ave. Albany, CA 94706",
            "from_datetime": "2023-01-01T00:00:00",
            "to_datetime": "2024-01-01T00:00:00"
        })
    }

    #[test]
    fn parses_full_request() {
        let body = json!({
            "forecast": window_json(),
            "consumption_records": [{
                "from_datetime": "2023-01-01T00:00:00",
                "to_datetime": "2023-02-01T00:00:00",
                "variable": "consumption.electricity",
                "value": 512.5
            }],
            "HVAC_info": [
                {"variable": "heating", "start_time": 8, "duration": 3, "setpoint": 21},
                {"variable": "cooling", "start_time": 8, "duration": 3, "setpoint": 23}
            ]
        });
        let req: ConsumptionRequest = serde_json::from_value(body).unwrap();
        let window = req.window().unwrap();
        assert_eq!(window.granularity(), "hour");
        assert_eq!(req.usage().unwrap().len(), 1);
        assert_eq!(req.hvac_directives().len(), 2);
        assert_eq!(req.hvac_directives()[1].variable, HvacMode::Cooling);
    }

    #[test]
    fn missing_forecast_is_an_input_error() {
        let req: ConsumptionRequest = serde_json::from_value(json!({})).unwrap();
        let err = req.window().unwrap_err();
        assert!(matches!(err, MuffinError::Input { .. }));
        assert!(err.to_string().contains("No forecast information provided"));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut body = window_json();
        body["to_datetime"] = json!("2022-12-31T00:00:00");
        let req = ConsumptionRequest {
            forecast: Some(serde_json::from_value(body).unwrap()),
            ..Default::default()
        };
        assert!(matches!(
            req.window().unwrap_err(),
            MuffinError::Validation { .. }
        ));
    }

    #[test]
    fn window_compares_instants_across_offsets() {
        let window: ForecastWindow = serde_json::from_value(json!({
            "address": "1 Main St",
            "from_datetime": "2023-01-01T00:00:00+05:00",
            "to_datetime": "2022-12-31T23:00:00Z"
        }))
        .unwrap();
        assert!(window.validate().is_ok());

        let window: ForecastWindow = serde_json::from_value(json!({
            "address": "1 Main St",
            "from_datetime": "2023-01-01T00:00:00-05:00",
            "to_datetime": "2023-01-01T04:00:00Z"
        }))
        .unwrap();
        assert!(matches!(
            window.validate().unwrap_err(),
            MuffinError::Validation { .. }
        ));
    }

    #[test]
    fn negative_start_hour_wraps() {
        let directive: HvacDirective = serde_json::from_value(json!(
            {"variable": "heating", "start_time": -2, "duration": 3, "setpoint": 21}
        ))
        .unwrap();
        let schedule = directive.to_schedule();
        let active: Vec<usize> = (0..24).filter(|h| schedule.at(*h) == Some(21)).collect();
        assert_eq!(active, vec![0, 22, 23]);
    }

    #[test]
    fn unknown_usage_variable_is_rejected() {
        let record = json!({
            "from_datetime": "2023-01-01T00:00:00",
            "to_datetime": "2023-02-01T00:00:00",
            "variable": "consumption.water",
            "value": 1.0
        });
        assert!(serde_json::from_value::<UsageRecord>(record).is_err());
    }

    #[test]
    fn empty_usage_counts_as_absent() {
        let req = ConsumptionRequest {
            consumption_records: Some(Vec::new()),
            ..Default::default()
        };
        assert!(req.usage().is_none());
        assert!(req.hvac_directives().is_empty());
    }
}
