//! Chart payloads embedded in assistant answers
//!
//! The assistant is asked to describe charts with one of two JSON schemas:
//!
//! - **trend**: one series per sector, each with `{year, co2}` points
//! - **snapshot**: one `{label, value, color}` entry per compared item
//!
//! [`extractor`] pulls the JSON out of free-form text and [`normalizer`]
//! turns a [`ChartPayload`] into the series consumed by the dashboard.

pub mod extractor;
pub mod normalizer;

pub use extractor::{extract, Extraction};
pub use normalizer::{
    normalize, BarDataset, BarSeries, ChartSummary, DonutSeries, NormalizedChart,
};

use crate::error::{EcoInsightError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single yearly emissions measurement of a trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    /// Calendar year
    pub year: i64,
    /// Emitted CO2 for the year; `null` or missing reads as 0
    #[serde(default, deserialize_with = "null_as_zero")]
    pub co2: f64,
}

/// One sector of a trend chart
///
/// Points are kept in the order the assistant produced them; nothing here
/// assumes they are sorted by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    /// Sector or entity name
    pub sector: String,
    /// Display color (CSS-style string as emitted by the model)
    #[serde(default)]
    pub color: String,
    /// Yearly points in insertion order
    #[serde(default)]
    pub data: Vec<YearPoint>,
}

/// One compared item of a snapshot chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    /// Item label
    pub label: String,
    /// Emissions value; `null` or missing reads as 0
    #[serde(default, deserialize_with = "null_as_zero")]
    pub value: f64,
    /// Display color
    #[serde(default)]
    pub color: String,
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Chart description extracted from an assistant answer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart_type", content = "chart_data", rename_all = "snake_case")]
pub enum ChartPayload {
    /// Time series, one entry per sector
    Trend(Vec<TrendSeries>),
    /// Single point in time comparison
    Snapshot(Vec<SnapshotItem>),
}

impl ChartPayload {
    /// Detect the chart shape of a parsed JSON value and decode its items
    ///
    /// Accepts either the wrapper object (`{"chart_type": ..., "chart_data": [...]}`)
    /// or a bare item array. A wrapper is a trend iff `chart_type == "trend"`;
    /// a bare array is a trend iff its first element carries a `data` key.
    /// Everything that is not a trend is decoded as a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `EcoInsightError::ChartPayload` when the value is neither an
    /// object nor an array, or when the items do not match the detected shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecoinsight::chart::ChartPayload;
    /// use serde_json::json;
    ///
    /// let payload = ChartPayload::from_value(&json!([
    ///     { "sector": "USA", "color": "#3b82f6", "data": [{ "year": 2020, "co2": 100 }] }
    /// ])).unwrap();
    /// assert!(payload.is_trend());
    /// ```
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        let (items, is_trend) = match value {
            JsonValue::Object(map) => {
                let items = map
                    .get("chart_data")
                    .cloned()
                    .unwrap_or_else(|| JsonValue::Array(Vec::new()));
                let is_trend = map.get("chart_type").and_then(JsonValue::as_str) == Some("trend");
                (items, is_trend)
            }
            JsonValue::Array(list) => {
                let is_trend = list
                    .first()
                    .and_then(JsonValue::as_object)
                    .is_some_and(|first| first.contains_key("data"));
                (value.clone(), is_trend)
            }
            other => {
                return Err(EcoInsightError::ChartPayload(format!(
                    "expected an object or array, found {}",
                    json_kind(other)
                ))
                .into())
            }
        };

        let payload = if is_trend {
            Self::Trend(serde_json::from_value(items).map_err(|e| {
                EcoInsightError::ChartPayload(format!("invalid trend series: {}", e))
            })?)
        } else {
            Self::Snapshot(serde_json::from_value(items).map_err(|e| {
                EcoInsightError::ChartPayload(format!("invalid snapshot items: {}", e))
            })?)
        };

        Ok(payload)
    }

    /// Whether this payload is the time-series variant
    pub fn is_trend(&self) -> bool {
        matches!(self, Self::Trend(_))
    }

    /// Number of chart entities (sectors or items)
    pub fn len(&self) -> usize {
        match self {
            Self::Trend(series) => series.len(),
            Self::Snapshot(items) => items.len(),
        }
    }

    /// Whether the payload has no entities at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
