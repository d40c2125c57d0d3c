//! Normalization of the calculate endpoint's interval response
//!
//! The API answers with a flat list of `(from, to, variable, value)`
//! records. They are pivoted into an [`IntervalTable`]: one row per interval
//! start, one column per variable. Starts are compared as instants, so the
//! repeated wall-clock hour of a daylight-saving fall-back stays two rows. A
//! `(start, variable)` pair seen twice is a contract violation and is
//! reported, never overwritten.

use crate::error::{MuffinError, Result};
use crate::time::{Timestamp, parse_timestamp};
use serde::Deserialize;
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// One interval as delivered by the API
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalRecord {
    pub from_datetime: Timestamp,
    pub to_datetime: Timestamp,
    pub variable: String,
    /// `None` when the API reported `null`
    pub value: Option<f64>,
}

#[derive(Deserialize)]
struct RawInterval {
    from_datetime: String,
    to_datetime: String,
    variable: String,
    value: Option<f64>,
}

impl TryFrom<RawInterval> for IntervalRecord {
    type Error = MuffinError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        let from_datetime = parse_timestamp(&raw.from_datetime).map_err(|_| {
            MuffinError::upstream_contract(format!(
                "invalid from_datetime '{}' for {}",
                raw.from_datetime, raw.variable
            ))
        })?;
        let to_datetime = parse_timestamp(&raw.to_datetime).map_err(|_| {
            MuffinError::upstream_contract(format!(
                "invalid to_datetime '{}' for {}",
                raw.to_datetime, raw.variable
            ))
        })?;
        if to_datetime < from_datetime {
            return Err(MuffinError::upstream_contract(format!(
                "interval for {} ends before it starts ({} > {})",
                raw.variable, from_datetime, to_datetime
            )));
        }
        Ok(Self {
            from_datetime,
            to_datetime,
            variable: raw.variable,
            value: raw.value,
        })
    }
}

/// A single time bucket of the pivoted table
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalRow {
    pub to_datetime: Timestamp,
    values: BTreeMap<String, Option<f64>>,
}

impl IntervalRow {
    /// Cell value; `None` when the variable was not reported for this row or was null
    pub fn get(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied().flatten()
    }
}

/// Time-indexed table, one row per interval start and one column per variable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalTable {
    rows: BTreeMap<Timestamp, IntervalRow>,
    columns: BTreeSet<String>,
}

impl IntervalTable {
    /// Pivot records on variable name, rejecting duplicate `(start, variable)` pairs
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = IntervalRecord>,
    {
        let mut table = Self::default();
        for record in records {
            let row = table
                .rows
                .entry(record.from_datetime)
                .or_insert_with(|| IntervalRow {
                    to_datetime: record.to_datetime,
                    values: BTreeMap::new(),
                });
            match row.values.entry(record.variable) {
                Entry::Occupied(slot) => {
                    return Err(MuffinError::duplicate_interval(
                        record.from_datetime.to_rfc3339(),
                        slot.key().clone(),
                    ));
                }
                Entry::Vacant(slot) => {
                    table.columns.insert(slot.key().clone());
                    slot.insert(record.value);
                }
            }
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Variables present in at least one row, sorted
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, variable: &str) -> bool {
        self.columns.contains(variable)
    }

    pub fn row(&self, from: &Timestamp) -> Option<&IntervalRow> {
        self.rows.get(from)
    }

    pub fn value(&self, from: &Timestamp, variable: &str) -> Option<f64> {
        self.rows.get(from).and_then(|r| r.get(variable))
    }

    /// Rows in ascending start order
    pub fn rows(&self) -> impl Iterator<Item = (&Timestamp, &IntervalRow)> {
        self.rows.iter()
    }

    /// One column as `(start, value)` pairs in ascending start order
    pub fn column<'a>(
        &'a self,
        variable: &'a str,
    ) -> impl Iterator<Item = (Timestamp, Option<f64>)> + 'a {
        self.rows.iter().map(move |(ts, row)| (*ts, row.get(variable)))
    }
}

/// Parse the raw calculate response into an [`IntervalTable`].
pub fn parse_intervals(raw: &str) -> Result<IntervalTable> {
    let body: Value = serde_json::from_str(raw).map_err(|e| {
        MuffinError::upstream_contract(format!("response is not valid JSON: {}", e))
    })?;

    let Some(data) = body.get("data") else {
        return Err(MuffinError::upstream_contract(missing_data_message(&body)));
    };
    let intervals = data
        .get("intervals")
        .ok_or_else(|| MuffinError::upstream_contract("response data has no 'intervals'"))?;
    let raw_intervals: Vec<RawInterval> = serde_json::from_value(intervals.clone())
        .map_err(|e| MuffinError::upstream_contract(format!("malformed interval record: {}", e)))?;

    let records = raw_intervals
        .into_iter()
        .map(IntervalRecord::try_from)
        .collect::<Result<Vec<_>>>()?;
    IntervalTable::from_records(records)
}

// Surface whatever the API put in its error envelope
fn missing_data_message(body: &Value) -> String {
    let detail = ["error", "message", "detail", "errors"]
        .iter()
        .find_map(|key| body.get(*key))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    match detail {
        Some(detail) => format!("response has no 'data' (upstream said: {})", detail),
        None => "response has no 'data'".to_string(),
    }
}
