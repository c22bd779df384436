//! Chart normalization
//!
//! Turns either payload variant into one renderer-facing shape: summary
//! figures, a bar series and a donut (distribution) series. Normalization is a
//! pure function of its input.

use super::{ChartPayload, SnapshotItem, TrendSeries, YearPoint};
use serde::Serialize;
use std::collections::BTreeSet;

/// Label used for the single bar dataset of a snapshot chart
const SNAPSHOT_DATASET_LABEL: &str = "Emissions";

/// Summary figure label for snapshot charts
const SNAPSHOT_SUMMARY_LABEL: &str = "Current";

/// Summary figure label for trend charts without any year
const EMPTY_TREND_LABEL: &str = "Trend";

/// Headline figures shown above the charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    /// Sum of the values shown in the distribution chart
    pub total_co2: f64,
    /// Entity with the largest value, `None` when nothing contributed
    pub top_sector: Option<String>,
    /// Period the totals refer to (latest year, "Trend" or "Current")
    pub label: String,
    /// Number of chart entities
    pub entity_count: usize,
}

/// One bar dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDataset {
    /// Legend label
    pub label: String,
    /// One value per bar label
    pub values: Vec<f64>,
    /// Either a single color for the whole dataset or one per value
    pub colors: Vec<String>,
}

/// Grouped bar chart data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    /// Category axis labels (years for trends, item labels for snapshots)
    pub labels: Vec<String>,
    /// Datasets plotted against the labels
    pub datasets: Vec<BarDataset>,
}

/// Distribution (donut) chart data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutSeries {
    /// Slice labels
    pub labels: Vec<String>,
    /// Slice values
    pub values: Vec<f64>,
    /// Slice colors
    pub colors: Vec<String>,
}

/// Renderer-facing chart representation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedChart {
    /// Whether the chart is a time series
    pub is_trend: bool,
    /// The entities the chart was built from
    pub items: ChartPayload,
    /// Bar chart data
    pub bar: BarSeries,
    /// Distribution chart data
    pub donut: DonutSeries,
    /// Headline figures
    pub summary: ChartSummary,
}

/// Normalize a chart payload
///
/// # Examples
///
/// ```
/// use ecoinsight::chart::{normalize, ChartPayload, SnapshotItem};
///
/// let chart = normalize(&ChartPayload::Snapshot(vec![
///     SnapshotItem { label: "Transport".into(), value: 4500.0, color: "#ef4444".into() },
///     SnapshotItem { label: "Energy".into(), value: 8000.0, color: "#f59e0b".into() },
/// ]));
/// assert_eq!(chart.summary.total_co2, 12500.0);
/// assert_eq!(chart.summary.top_sector.as_deref(), Some("Energy"));
/// ```
pub fn normalize(payload: &ChartPayload) -> NormalizedChart {
    match payload {
        ChartPayload::Trend(series) => normalize_trend(payload, series),
        ChartPayload::Snapshot(items) => normalize_snapshot(payload, items),
    }
}

fn normalize_trend(payload: &ChartPayload, series: &[TrendSeries]) -> NormalizedChart {
    let years: Vec<i64> = series
        .iter()
        .flat_map(|s| s.data.iter().map(|point| point.year))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let latest_year = years.last().copied();

    let latest: Vec<Option<f64>> = series
        .iter()
        .map(|s| latest_point(s, latest_year).map(|point| point.co2))
        .collect();

    let contributions = series
        .iter()
        .zip(&latest)
        .filter_map(|(s, value)| value.map(|v| (s.sector.as_str(), v)));
    let (total_co2, top_sector) = summarize(contributions);

    let bar = BarSeries {
        labels: years.iter().map(|year| year.to_string()).collect(),
        datasets: series
            .iter()
            .map(|s| BarDataset {
                label: s.sector.clone(),
                values: years
                    .iter()
                    .map(|&year| value_for_year(s, year).unwrap_or(0.0))
                    .collect(),
                colors: vec![s.color.clone()],
            })
            .collect(),
    };

    let donut = DonutSeries {
        labels: series.iter().map(|s| s.sector.clone()).collect(),
        values: latest.iter().map(|value| value.unwrap_or(0.0)).collect(),
        colors: series.iter().map(|s| s.color.clone()).collect(),
    };

    NormalizedChart {
        is_trend: true,
        items: payload.clone(),
        bar,
        donut,
        summary: ChartSummary {
            total_co2,
            top_sector,
            label: latest_year
                .map(|year| year.to_string())
                .unwrap_or_else(|| EMPTY_TREND_LABEL.to_string()),
            entity_count: series.len(),
        },
    }
}

fn normalize_snapshot(payload: &ChartPayload, items: &[SnapshotItem]) -> NormalizedChart {
    let (total_co2, top_sector) =
        summarize(items.iter().map(|item| (item.label.as_str(), item.value)));

    let labels: Vec<String> = items.iter().map(|item| item.label.clone()).collect();
    let values: Vec<f64> = items.iter().map(|item| item.value).collect();
    let colors: Vec<String> = items.iter().map(|item| item.color.clone()).collect();

    NormalizedChart {
        is_trend: false,
        items: payload.clone(),
        bar: BarSeries {
            labels: labels.clone(),
            datasets: vec![BarDataset {
                label: SNAPSHOT_DATASET_LABEL.to_string(),
                values: values.clone(),
                colors: colors.clone(),
            }],
        },
        donut: DonutSeries {
            labels,
            values,
            colors,
        },
        summary: ChartSummary {
            total_co2,
            top_sector,
            label: SNAPSHOT_SUMMARY_LABEL.to_string(),
            entity_count: items.len(),
        },
    }
}

/// The point a sector reports for the latest year
///
/// Falls back to the sector's last point in insertion order when it has no
/// entry for that year.
fn latest_point(series: &TrendSeries, latest_year: Option<i64>) -> Option<&YearPoint> {
    latest_year
        .and_then(|year| series.data.iter().find(|point| point.year == year))
        .or_else(|| series.data.last())
}

fn value_for_year(series: &TrendSeries, year: i64) -> Option<f64> {
    series
        .data
        .iter()
        .find(|point| point.year == year)
        .map(|point| point.co2)
}

/// Total of all values and the name of the first maximal one
fn summarize<'a>(values: impl Iterator<Item = (&'a str, f64)>) -> (f64, Option<String>) {
    let mut total = 0.0;
    let mut top: Option<(&str, f64)> = None;
    for (name, value) in values {
        total += value;
        if top.map_or(true, |(_, best)| value > best) {
            top = Some((name, value));
        }
    }
    (total, top.map(|(name, _)| name.to_string()))
}
