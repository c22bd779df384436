//! Terminal dashboard
//!
//! Renders a [`NormalizedChart`] as summary cards, a comparison table and a
//! distribution table. Rendering is a pure function of the chart; the caller
//! decides when to print.

use crate::chart::NormalizedChart;
use prettytable::{format, Cell, Row, Table};

/// Width of the widest bar in the distribution table
const BAR_WIDTH: usize = 30;

/// Text shown before any chart has been produced
pub const EMPTY_DASHBOARD: &str = "Welcome\n\nYour dashboard is currently empty.\nChat to visualize emissions data.\n\nTry: \"Visualize CO2 trends for Transport and Energy\"";

/// Render the dashboard for the current chart
///
/// # Examples
///
/// ```
/// use ecoinsight::dashboard::{render_dashboard, EMPTY_DASHBOARD};
///
/// assert_eq!(render_dashboard(None), EMPTY_DASHBOARD);
/// ```
pub fn render_dashboard(chart: Option<&NormalizedChart>) -> String {
    let Some(chart) = chart else {
        return EMPTY_DASHBOARD.to_string();
    };

    let mut out = String::new();
    out.push_str(&summary_table(chart).to_string());
    out.push_str("\nData Comparison\n");
    out.push_str(&comparison_table(chart).to_string());
    out.push_str(&format!("\nDistribution ({})\n", chart.summary.label));
    out.push_str(&distribution_table(chart).to_string());
    out
}

fn summary_table(chart: &NormalizedChart) -> Table {
    let summary = &chart.summary;
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(vec![
        Cell::new(&format!("Total Emissions ({})", summary.label)),
        Cell::new("Highest Emitter"),
        Cell::new("Data Entities"),
    ]));
    table.add_row(Row::new(vec![
        Cell::new(&format_number(summary.total_co2)),
        Cell::new(summary.top_sector.as_deref().unwrap_or("N/A")),
        Cell::new(&summary.entity_count.to_string()),
    ]));
    table
}

fn comparison_table(chart: &NormalizedChart) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let mut titles = vec![Cell::new(if chart.is_trend { "Year" } else { "Label" })];
    titles.extend(chart.bar.datasets.iter().map(|d| Cell::new(&d.label)));
    table.set_titles(Row::new(titles));

    for (index, label) in chart.bar.labels.iter().enumerate() {
        let mut cells = vec![Cell::new(label)];
        cells.extend(chart.bar.datasets.iter().map(|dataset| {
            let value = dataset.values.get(index).copied().unwrap_or(0.0);
            Cell::new(&format_number(value)).style_spec("r")
        }));
        table.add_row(Row::new(cells));
    }
    table
}

fn distribution_table(chart: &NormalizedChart) -> Table {
    let donut = &chart.donut;
    let total: f64 = donut.values.iter().sum();
    let max = donut.values.iter().copied().fold(0.0_f64, f64::max);

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![
        Cell::new("Entity"),
        Cell::new("Value"),
        Cell::new("Share"),
        Cell::new(""),
    ]));

    for (index, label) in donut.labels.iter().enumerate() {
        let value = donut.values.get(index).copied().unwrap_or(0.0);
        table.add_row(Row::new(vec![
            Cell::new(label),
            Cell::new(&format_number(value)).style_spec("r"),
            Cell::new(&format_share(value, total)).style_spec("r"),
            Cell::new(&bar(value, max)),
        ]));
    }
    table
}

fn format_share(value: f64, total: f64) -> String {
    if total > 0.0 {
        format!("{:.1}%", value / total * 100.0)
    } else {
        "-".to_string()
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let width = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(width.max(1))
}

/// Format a number with thousands separators and at most two decimals
///
/// # Examples
///
/// ```
/// use ecoinsight::dashboard::format_number;
///
/// assert_eq!(format_number(12500.0), "12,500");
/// assert_eq!(format_number(-1234.5), "-1,234.5");
/// ```
pub fn format_number(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if fraction > 0 {
        let decimals = format!("{:02}", fraction);
        grouped.push('.');
        grouped.push_str(decimals.trim_end_matches('0'));
    }

    if value < 0.0 && cents > 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
