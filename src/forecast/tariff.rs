//! Two-bucket time-of-day tariff
//!
//! Hours inside `[peak_start_hour, peak_end_hour]` are billed at the peak
//! rate, every other hour at the off-peak rate. The hour is the local
//! wall-clock hour of the interval start, floored.

use crate::error::{MuffinError, Result};
use crate::forecast::ELECTRICITY;
use crate::forecast::aggregate::CostSeries;
use crate::forecast::normalize::IntervalTable;
use crate::time::Timestamp;
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which rate applies to an hour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TariffPeriod {
    OffPeak,
    Peak,
}

/// Rates are in currency units per unit of electricity consumption.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffSchedule {
    pub off_peak_rate: f64,
    pub peak_rate: f64,
    /// First peak hour (inclusive)
    pub peak_start_hour: u32,
    /// Last peak hour (inclusive)
    pub peak_end_hour: u32,
}

impl Default for TariffSchedule {
    /// Winter schedule: 0.37 off-peak, 0.40 from 16:00 through 21:59
    fn default() -> Self {
        Self {
            off_peak_rate: 0.37,
            peak_rate: 0.40,
            peak_start_hour: 16,
            peak_end_hour: 21,
        }
    }
}

impl TariffSchedule {
    pub fn new(off_peak_rate: f64, peak_rate: f64) -> Self {
        Self {
            off_peak_rate,
            peak_rate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, rate) in [
            ("tariff.off_peak_rate", self.off_peak_rate),
            ("tariff.peak_rate", self.peak_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(MuffinError::validation(
                    field,
                    "Must be a finite, non-negative rate",
                ));
            }
        }
        if self.peak_start_hour > 23 || self.peak_end_hour > 23 {
            return Err(MuffinError::validation(
                "tariff.peak_start_hour",
                "Peak hours must be within 0-23",
            ));
        }
        if self.peak_start_hour > self.peak_end_hour {
            return Err(MuffinError::validation(
                "tariff.peak_start_hour",
                "Peak window must not start after it ends",
            ));
        }
        Ok(())
    }

    pub fn period_for_hour(&self, hour: u32) -> TariffPeriod {
        if (self.peak_start_hour..=self.peak_end_hour).contains(&hour) {
            TariffPeriod::Peak
        } else {
            TariffPeriod::OffPeak
        }
    }

    pub fn rate(&self, period: TariffPeriod) -> f64 {
        match period {
            TariffPeriod::OffPeak => self.off_peak_rate,
            TariffPeriod::Peak => self.peak_rate,
        }
    }

    /// Rate applying to an interval starting at `at`
    pub fn rate_at(&self, at: Timestamp) -> f64 {
        self.rate(self.period_for_hour(at.hour()))
    }

    /// Cost every row of `table` from its electricity column.
    ///
    /// Rows lacking an electricity value cost nothing; a table without any
    /// electricity column cannot be costed at all.
    pub fn apply(&self, table: &IntervalTable) -> Result<CostTable> {
        if !table.has_column(ELECTRICITY) {
            return Err(MuffinError::missing_variable(ELECTRICITY));
        }
        let costs = table
            .column(ELECTRICITY)
            .map(|(at, consumption)| {
                let cost = consumption.map_or(0.0, |kwh| kwh * self.rate_at(at));
                (at, cost)
            })
            .collect();
        Ok(CostTable {
            intervals: table.clone(),
            costs,
        })
    }
}

/// An [`IntervalTable`] with a derived cost per row
#[derive(Debug, Clone, PartialEq)]
pub struct CostTable {
    intervals: IntervalTable,
    costs: BTreeMap<Timestamp, f64>,
}

impl CostTable {
    pub fn intervals(&self) -> &IntervalTable {
        &self.intervals
    }

    pub fn cost_at(&self, at: &Timestamp) -> Option<f64> {
        self.costs.get(at).copied()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.costs.values().sum()
    }

    pub fn into_cost_series(self) -> CostSeries {
        self.costs
    }
}
