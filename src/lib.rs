//! # EnergyMuffin - HVAC savings forecasting service
//!
//! Forecasts household energy consumption through a remote building energy
//! model (BEM) API and prices two scenarios against a time-of-day tariff: the
//! home as it is today (baseline) and the home with a modified HVAC setpoint
//! schedule (action). Costs are rolled up per calendar month so callers can
//! see what a thermostat change would save.
//!
//! ## Architecture
//!
//! - `config`: YAML configuration with environment overrides and validation
//! - `logging`: Structured logging and tracing
//! - `forecast`: Payload building, API client, normalization, tariff and
//!   monthly comparison
//! - `time`: Timestamp parsing for API date-times
//! - `web`: HTTP server and REST API
//! - `error`: Error type shared by every module

pub mod config;
pub mod error;
pub mod forecast;
pub mod logging;
pub mod time;
pub mod web;

#[cfg(test)]
mod web_tests;

// Re-export commonly used types
pub use config::Config;
pub use error::{MuffinError, Result};
pub use forecast::ForecastService;
