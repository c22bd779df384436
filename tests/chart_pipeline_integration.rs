//! Extraction and normalization of realistic assistant answers

use ecoinsight::chart::{extract, normalize, ChartPayload};
use ecoinsight::chat::{ChatResult, ChatSession};

#[test]
fn test_fenced_snapshot_answer() {
    let raw = "Here you go:\n```json\n{\"response_text\":\"Transport leads.\",\"chart_type\":\"snapshot\",\"chart_data\":[{\"label\":\"Transport\",\"value\":4500,\"color\":\"#ef4444\"},{\"label\":\"Energy\",\"value\":8000,\"color\":\"#f59e0b\"}]}\n```";

    let extraction = extract(raw);
    assert_eq!(extraction.text, "Transport leads.");

    let payload = extraction.payload.expect("payload");
    assert!(!payload.is_trend());
    assert_eq!(payload.len(), 2);

    let chart = normalize(&payload);
    assert!(!chart.is_trend);
    assert_eq!(chart.summary.total_co2, 12500.0);
    assert_eq!(chart.summary.top_sector.as_deref(), Some("Energy"));
    assert_eq!(chart.summary.label, "Current");
    assert_eq!(chart.summary.entity_count, 2);
    assert_eq!(chart.donut.labels, vec!["Transport", "Energy"]);
    assert_eq!(chart.donut.values, vec![4500.0, 8000.0]);
}

#[test]
fn test_unfenced_trend_answer() {
    let raw = "Emissions are diverging. {\"chart_type\":\"trend\",\"chart_data\":[{\"sector\":\"USA\",\"color\":\"#3b82f6\",\"data\":[{\"year\":2020,\"co2\":100},{\"year\":2021,\"co2\":110}]},{\"sector\":\"EU\",\"color\":\"#10b981\",\"data\":[{\"year\":2021,\"co2\":90}]}]} See above.";

    let extraction = extract(raw);
    assert_eq!(extraction.text, "Emissions are diverging.  See above.");

    let chart = normalize(&extraction.payload.expect("payload"));
    assert!(chart.is_trend);
    assert_eq!(chart.bar.labels, vec!["2020", "2021"]);
    assert_eq!(chart.bar.datasets[0].values, vec![100.0, 110.0]);
    assert_eq!(chart.bar.datasets[1].values, vec![0.0, 90.0]);
    assert_eq!(chart.summary.label, "2021");
    assert_eq!(chart.summary.total_co2, 200.0);
    assert_eq!(chart.summary.top_sector.as_deref(), Some("USA"));
}

#[test]
fn test_null_measurement_keeps_trend_chart() {
    let raw = "```json\n{\"chart_type\":\"trend\",\"chart_data\":[{\"sector\":\"USA\",\"data\":[{\"year\":2020,\"co2\":null},{\"year\":2021,\"co2\":110}]}]}\n```";

    let chart = normalize(&extract(raw).payload.expect("payload"));
    assert_eq!(chart.bar.datasets[0].values, vec![0.0, 110.0]);
    assert_eq!(chart.summary.total_co2, 110.0);
}

#[test]
fn test_trend_entity_count_matches_series() {
    let raw = "```json\n{\"chart_type\":\"trend\",\"chart_data\":[{\"sector\":\"A\",\"data\":[{\"year\":2019,\"co2\":1}]},{\"sector\":\"B\",\"data\":[{\"year\":2020,\"co2\":2}]},{\"sector\":\"C\",\"data\":[]}]}\n```";

    let payload = extract(raw).payload.expect("payload");
    let chart = normalize(&payload);
    assert_eq!(chart.summary.entity_count, 3);
    assert_eq!(chart.bar.datasets.len(), 3);
    assert_eq!(chart.donut.labels.len(), 3);
}

#[test]
fn test_invalid_json_keeps_prose_and_drops_chart() {
    let raw = "Summary first.\n```json\n{\"chart_type\": \"snapshot\", \"chart_data\": [\n```\nDone.";

    let extraction = extract(raw);
    assert!(extraction.payload.is_none());
    assert!(extraction.text.contains("Summary first."));
    assert!(extraction.text.contains("Done."));
    assert!(!extraction.text.contains("chart_type"));
}

#[test]
fn test_plain_answer_has_no_payload() {
    let extraction = extract("Transport emissions rose by 2% last year.");
    assert_eq!(extraction.text, "Transport emissions rose by 2% last year.");
    assert_eq!(extraction.payload, None);
}

#[test]
fn test_bare_array_payload_is_detected() {
    let value = serde_json::json!([
        { "sector": "Energy", "data": [ { "year": 2022, "co2": 5 } ] }
    ]);
    assert!(ChartPayload::from_value(&value).unwrap().is_trend());
}

#[test]
fn test_session_dashboard_follows_latest_chart() {
    let mut session = ChatSession::new();

    session.begin_send("Snapshot please").unwrap();
    session
        .finish_send(Ok(ChatResult {
            answer: "```json\n{\"chart_type\":\"snapshot\",\"chart_data\":[{\"label\":\"Energy\",\"value\":10}]}\n```".to_string(),
            source: "Live AI".to_string(),
        }))
        .unwrap();
    assert!(!session.chart().unwrap().is_trend);

    session.begin_send("Now a trend").unwrap();
    session
        .finish_send(Ok(ChatResult {
            answer: "```json\n{\"chart_type\":\"trend\",\"chart_data\":[{\"sector\":\"Energy\",\"data\":[{\"year\":2023,\"co2\":7}]}]}\n```".to_string(),
            source: "Live AI".to_string(),
        }))
        .unwrap();

    let chart = session.chart().unwrap();
    assert!(chart.is_trend);
    assert_eq!(chart.summary.label, "2023");
}
