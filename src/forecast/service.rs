//! Baseline vs. action comparison for one consumption request

use crate::config::Config;
use crate::error::Result;
use crate::forecast::aggregate::{CostSeries, MissingMonthPolicy, compare_monthly_costs};
use crate::forecast::client::ForecastClient;
use crate::forecast::normalize::parse_intervals;
use crate::forecast::payload::{ForecastPayload, build_payload};
use crate::forecast::setpoint::SetpointSchedule;
use crate::forecast::tariff::TariffSchedule;
use crate::forecast::types::{ConsumptionRequest, ConsumptionResponse, HvacDirective};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use std::sync::Arc;

/// The two runs compared per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Baseline,
    Action,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Action => "action",
        }
    }
}

/// Setpoint schedules for a list of HVAC directives, in request order
pub fn setpoints_for(directives: &[HvacDirective]) -> Vec<SetpointSchedule> {
    directives.iter().map(HvacDirective::to_schedule).collect()
}

/// Runs both scenarios against the forecasting API and compares their costs
#[derive(Clone)]
pub struct ForecastService {
    client: Arc<dyn ForecastClient>,
    tariff: TariffSchedule,
    missing_months: MissingMonthPolicy,
}

impl ForecastService {
    pub fn new(
        client: Arc<dyn ForecastClient>,
        tariff: TariffSchedule,
        missing_months: MissingMonthPolicy,
    ) -> Self {
        Self {
            client,
            tariff,
            missing_months,
        }
    }

    pub fn from_config(client: Arc<dyn ForecastClient>, config: &Config) -> Self {
        Self::new(client, config.tariff, config.aggregation.missing_months)
    }

    pub fn tariff(&self) -> &TariffSchedule {
        &self.tariff
    }

    /// Build both payloads for a request without calling out
    pub fn payloads(&self, request: &ConsumptionRequest) -> Result<(ForecastPayload, ForecastPayload)> {
        let window = request.window()?;
        let usage = request.usage();
        let from = window.from_datetime.to_iso();
        let to = window.to_datetime.to_iso();
        let build = |setpoints: Vec<SetpointSchedule>| {
            build_payload(
                &window.address,
                &from,
                &to,
                window.granularity(),
                usage,
                setpoints,
            )
        };
        let baseline = build(Vec::new());
        let action = build(setpoints_for(request.hvac_directives()));
        Ok((baseline, action))
    }

    /// Forecast, cost and compare both scenarios month by month.
    ///
    /// The two calls are made one after the other; any failure aborts the
    /// whole comparison and is logged once with the request id.
    pub async fn compare(&self, request: &ConsumptionRequest) -> Result<ConsumptionResponse> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let logger = get_logger_with_context(
            LogContext::new("forecast").with_request_id(request_id.clone()),
        );
        self.compare_logged(request, &request_id, &logger)
            .await
            .inspect_err(|e| {
                let msg = format!("Comparison failed ({}): {}", e.kind(), e);
                if e.is_client_error() {
                    logger.warn(&msg);
                } else {
                    logger.error(&msg);
                }
            })
    }

    async fn compare_logged(
        &self,
        request: &ConsumptionRequest,
        request_id: &str,
        logger: &StructuredLogger,
    ) -> Result<ConsumptionResponse> {
        let (baseline_payload, action_payload) = self.payloads(request)?;
        logger.info(&format!(
            "Comparing scenarios for '{}' ({} HVAC directive(s))",
            baseline_payload.location.address,
            request.hvac_directives().len()
        ));

        let baseline = self
            .run_scenario(Scenario::Baseline, &baseline_payload, request_id)
            .await?;
        let action = self
            .run_scenario(Scenario::Action, &action_payload, request_id)
            .await?;

        let monthly_forecasts = compare_monthly_costs(&baseline, &action, self.missing_months);
        logger.info(&format!(
            "Comparison ready: {} month(s), total savings {:.2}",
            monthly_forecasts.len(),
            monthly_forecasts
                .iter()
                .map(|m| m.action_savings)
                .sum::<f64>()
        ));
        Ok(ConsumptionResponse { monthly_forecasts })
    }

    async fn run_scenario(
        &self,
        scenario: Scenario,
        payload: &ForecastPayload,
        request_id: &str,
    ) -> Result<CostSeries> {
        let logger = scenario_logger(scenario, request_id);
        logger.debug(&format!(
            "Requesting forecast with {} setpoint schedule(s)",
            payload.setpoints().len()
        ));
        let raw = self.client.calculate(payload).await?;
        let table = parse_intervals(&raw)?;
        let costs = self.tariff.apply(&table)?;
        logger.debug(&format!(
            "{} interval(s), {} variable(s), cost {:.2}",
            table.len(),
            table.column_count(),
            costs.total()
        ));
        Ok(costs.into_cost_series())
    }
}

fn scenario_logger(scenario: Scenario, request_id: &str) -> StructuredLogger {
    get_logger_with_context(
        LogContext::new("forecast")
            .with_request_id(request_id.to_string())
            .with_field("scenario", scenario.as_str().to_string()),
    )
}
