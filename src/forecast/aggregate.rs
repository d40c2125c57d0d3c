//! Monthly roll-up of baseline and action cost series

use crate::time::Timestamp;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cost per interval start
pub type CostSeries = BTreeMap<Timestamp, f64>;

/// Calendar month key, ordered chronologically; taken from local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl From<Timestamp> for MonthKey {
    fn from(at: Timestamp) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// How months reported by only one scenario are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMonthPolicy {
    /// Keep the month; the absent side counts as zero cost
    #[default]
    ZeroFill,
    /// Only emit months present in both scenarios
    Drop,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyComparison {
    /// `YYYY-MM`
    pub month_year: String,
    pub baseline_cost: f64,
    pub action_cost: f64,
    /// `baseline_cost - action_cost`; negative when the action costs more
    pub action_savings: f64,
}

impl MonthlyComparison {
    pub fn new(month: MonthKey, baseline_cost: f64, action_cost: f64) -> Self {
        Self {
            month_year: month.to_string(),
            baseline_cost,
            action_cost,
            action_savings: baseline_cost - action_cost,
        }
    }
}

/// Sum a cost series per calendar month
pub fn monthly_totals(series: &CostSeries) -> BTreeMap<MonthKey, f64> {
    let mut totals = BTreeMap::new();
    for (at, cost) in series {
        *totals.entry(MonthKey::from(*at)).or_insert(0.0) += cost;
    }
    totals
}

/// Outer-join monthly totals of both scenarios, ascending by month.
pub fn compare_monthly_costs(
    baseline: &CostSeries,
    action: &CostSeries,
    policy: MissingMonthPolicy,
) -> Vec<MonthlyComparison> {
    let baseline = monthly_totals(baseline);
    let action = monthly_totals(action);

    let mut months: Vec<MonthKey> = baseline.keys().chain(action.keys()).copied().collect();
    months.sort_unstable();
    months.dedup();

    months
        .into_iter()
        .filter_map(|month| {
            match (baseline.get(&month), action.get(&month), policy) {
                (Some(b), Some(a), _) => Some(MonthlyComparison::new(month, *b, *a)),
                (b, a, MissingMonthPolicy::ZeroFill) => Some(MonthlyComparison::new(
                    month,
                    b.copied().unwrap_or(0.0),
                    a.copied().unwrap_or(0.0),
                )),
                (_, _, MissingMonthPolicy::Drop) => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_timestamp;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
            .and_utc()
            .fixed_offset()
    }

    fn series(points: &[(Timestamp, f64)]) -> CostSeries {
        points.iter().copied().collect()
    }

    #[test]
    fn month_label_is_zero_padded() {
        assert_eq!(MonthKey::from(at(2023, 3, 1, 0)).to_string(), "2023-03");
    }

    #[test]
    fn month_comes_from_local_time() {
        // 1 February in UTC, still 31 January in UTC-8
        let late = parse_timestamp("2023-01-31T23:00:00-08:00").unwrap();
        assert_eq!(MonthKey::from(late).to_string(), "2023-01");
    }

    #[test]
    fn two_month_savings_keep_sign() {
        let baseline = series(&[
            (at(2023, 1, 1, 0), 60.0),
            (at(2023, 1, 31, 23), 40.0),
            (at(2023, 2, 1, 0), 80.0),
        ]);
        let action = series(&[
            (at(2023, 1, 10, 5), 90.0),
            (at(2023, 2, 14, 12), 50.0),
            (at(2023, 2, 28, 23), 35.0),
        ]);
        let rows = compare_monthly_costs(&baseline, &action, MissingMonthPolicy::ZeroFill);
        assert_eq!(
            rows,
            vec![
                MonthlyComparison {
                    month_year: "2023-01".into(),
                    baseline_cost: 100.0,
                    action_cost: 90.0,
                    action_savings: 10.0,
                },
                MonthlyComparison {
                    month_year: "2023-02".into(),
                    baseline_cost: 80.0,
                    action_cost: 85.0,
                    action_savings: -5.0,
                },
            ]
        );
    }

    #[test]
    fn totals_equal_row_sums() {
        let baseline: CostSeries = (0..24)
            .map(|h| (at(2023, 6, 1, h), f64::from(h) * 0.25))
            .collect();
        let totals = monthly_totals(&baseline);
        let expected: f64 = baseline.values().sum();
        assert_eq!(totals.len(), 1);
        assert!((totals[&MonthKey { year: 2023, month: 6 }] - expected).abs() < 1e-12);
    }

    #[test]
    fn months_sort_across_years() {
        let baseline = series(&[(at(2024, 1, 1, 0), 1.0), (at(2023, 12, 1, 0), 2.0)]);
        let rows = compare_monthly_costs(&baseline, &baseline, MissingMonthPolicy::ZeroFill);
        let labels: Vec<&str> = rows.iter().map(|r| r.month_year.as_str()).collect();
        assert_eq!(labels, vec!["2023-12", "2024-01"]);
        assert!(rows.iter().all(|r| r.action_savings == 0.0));
    }

    #[test]
    fn zero_fill_keeps_one_sided_months() {
        let baseline = series(&[(at(2023, 1, 1, 0), 10.0), (at(2023, 2, 1, 0), 20.0)]);
        let action = series(&[(at(2023, 2, 1, 0), 15.0), (at(2023, 3, 1, 0), 5.0)]);
        let rows = compare_monthly_costs(&baseline, &action, MissingMonthPolicy::ZeroFill);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].month_year, "2023-01");
        assert_eq!(rows[0].action_cost, 0.0);
        assert_eq!(rows[0].action_savings, 10.0);
        assert_eq!(rows[2].month_year, "2023-03");
        assert_eq!(rows[2].baseline_cost, 0.0);
        assert_eq!(rows[2].action_savings, -5.0);
    }

    #[test]
    fn drop_keeps_only_shared_months() {
        let baseline = series(&[(at(2023, 1, 1, 0), 10.0), (at(2023, 2, 1, 0), 20.0)]);
        let action = series(&[(at(2023, 2, 1, 0), 15.0), (at(2023, 3, 1, 0), 5.0)]);
        let rows = compare_monthly_costs(&baseline, &action, MissingMonthPolicy::Drop);
        assert_eq!(rows, vec![MonthlyComparison::new(
            MonthKey { year: 2023, month: 2 },
            20.0,
            15.0
        )]);
    }

    #[test]
    fn empty_series_give_no_rows() {
        let empty = CostSeries::new();
        assert!(compare_monthly_costs(&empty, &empty, MissingMonthPolicy::ZeroFill).is_empty());
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        let p: MissingMonthPolicy = serde_yaml::from_str("drop").unwrap();
        assert_eq!(p, MissingMonthPolicy::Drop);
        let p: MissingMonthPolicy = serde_yaml::from_str("zero_fill").unwrap();
        assert_eq!(p, MissingMonthPolicy::ZeroFill);
    }
}
