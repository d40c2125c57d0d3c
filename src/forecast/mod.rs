//! Building energy model forecasting pipeline
//!
//! Payload shaping for the remote calculate endpoint, interval response
//! normalization, time-of-day costing and the baseline/action monthly
//! comparison built on top of them.

pub mod aggregate;
pub mod client;
pub mod normalize;
pub mod payload;
pub mod service;
pub mod setpoint;
pub mod tariff;
pub mod types;

pub use aggregate::{
    CostSeries, MissingMonthPolicy, MonthKey, MonthlyComparison, compare_monthly_costs,
    monthly_totals,
};
pub use client::{BemApiClient, ForecastClient};
pub use normalize::{IntervalRecord, IntervalTable, parse_intervals};
pub use payload::{ForecastPayload, build_payload};
pub use service::ForecastService;
pub use setpoint::{HvacMode, SetpointSchedule, cooling, heating};
pub use tariff::{CostTable, TariffPeriod, TariffSchedule};
pub use types::{
    ConsumptionRequest, ConsumptionResponse, ForecastWindow, HvacDirective, UsageRecord,
    UsageVariable,
};

/// Variable carrying whole-home electricity consumption; the tariff is applied to it
pub const ELECTRICITY: &str = "consumption.electricity";
