//! Request body for the building energy model calculate endpoint

use crate::forecast::setpoint::SetpointSchedule;
use crate::forecast::types::UsageRecord;
use serde::Serialize;

/// Variables requested on every forecast, end uses first, totals last
pub const FORECAST_VARIABLES: [&str; 11] = [
    "consumption.electricity.refrigerator",
    "consumption.electricity.cooking_range",
    "consumption.electricity.dishwasher",
    "consumption.electricity.ceiling_fan",
    "consumption.electricity.plug_loads",
    "consumption.electricity.lighting",
    "consumption.electricity.heating",
    "consumption.electricity.cooling",
    "consumption.fossil_fuel.hot_water",
    "consumption.electricity",
    "consumption.fossil_fuel",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPayload {
    pub parameters: Parameters,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption: Option<Consumption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub from_datetime: String,
    pub to_datetime: String,
    pub variables: &'static [&'static str],
    pub group_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consumption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actuals: Option<Vec<UsageRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attributes {
    pub baseline: Vec<SetpointSchedule>,
}

/// Assemble the calculate request.
///
/// `consumption` is only emitted when known usage or setpoints are present;
/// empty collections count as absent. Setpoints are always sent as a list, so
/// a single schedule can be passed as `Some(schedule)` or `[schedule]`.
pub fn build_payload<I>(
    address: &str,
    from_datetime: &str,
    to_datetime: &str,
    granularity: &str,
    usage: Option<&[UsageRecord]>,
    setpoints: I,
) -> ForecastPayload
where
    I: IntoIterator<Item = SetpointSchedule>,
{
    let actuals = usage.filter(|u| !u.is_empty()).map(<[UsageRecord]>::to_vec);
    let baseline: Vec<SetpointSchedule> = setpoints.into_iter().collect();
    let attributes = (!baseline.is_empty()).then_some(Attributes { baseline });

    let consumption = match (actuals, attributes) {
        (None, None) => None,
        (actuals, attributes) => Some(Consumption {
            actuals,
            attributes,
        }),
    };

    ForecastPayload {
        parameters: Parameters {
            from_datetime: from_datetime.to_string(),
            to_datetime: to_datetime.to_string(),
            variables: &FORECAST_VARIABLES,
            group_by: granularity.to_string(),
        },
        location: Location {
            address: address.to_string(),
        },
        consumption,
    }
}

impl ForecastPayload {
    /// Setpoint schedules carried by this payload
    pub fn setpoints(&self) -> &[SetpointSchedule] {
        self.consumption
            .as_ref()
            .and_then(|c| c.attributes.as_ref())
            .map(|a| a.baseline.as_slice())
            .unwrap_or_default()
    }
}
