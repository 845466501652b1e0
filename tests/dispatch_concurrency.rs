//! Tests for the bounded dispatcher: concurrency cap, outcome accounting and
//! failure isolation.

use std::sync::Arc;
use std::time::Duration;

use certscan::dispatch::{outcome_channel, spawn_dispatcher};
use certscan::{run_with_transport, FetchOutcome};

#[path = "helpers.rs"]
mod helpers;

use helpers::LatencyTransport;

fn urls(hosts: &[&str]) -> Vec<String> {
    hosts.iter().map(|h| format!("https://{h}/")).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_threads_never_exceed_two_in_flight() {
    let transport = Arc::new(LatencyTransport::new(Duration::from_millis(50)));
    let mut csv_out = Vec::new();
    let mut status = Vec::new();

    let report = run_with_transport(
        urls(&["a.example", "b.example", "c.example", "d.example", "e.example"]),
        2,
        Arc::clone(&transport),
        &mut csv_out,
        &mut status,
    )
    .await;

    assert_eq!(transport.max_in_flight(), 2, "cap must be reached but never exceeded");
    assert_eq!(transport.calls(), 5);
    assert_eq!(transport.in_flight(), 0);
    assert_eq!(report.total_urls, 5);
    assert_eq!(report.records_written, 5);
    assert_eq!(report.fetch_failures, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cap_holds_for_large_batches() {
    let transport = Arc::new(LatencyTransport::new(Duration::from_millis(5)));
    let hosts: Vec<String> = (0..60).map(|i| format!("empty{i}.example")).collect();
    let hosts: Vec<&str> = hosts.iter().map(String::as_str).collect();

    let (sender, mut receiver) = outcome_channel();
    let handle = spawn_dispatcher(urls(&hosts), 7, Arc::clone(&transport), sender);

    // Empty chains are silent: the channel just closes
    assert!(receiver.recv().await.is_none());
    handle.await.expect("dispatcher task");

    assert!(transport.max_in_flight() <= 7);
    assert_eq!(transport.calls(), 60);
    assert_eq!(transport.in_flight(), 0);
}

#[tokio::test]
async fn test_every_url_gets_exactly_one_outcome() {
    let transport = Arc::new(LatencyTransport::new(Duration::from_millis(1)));
    let (sender, mut receiver) = outcome_channel();
    let handle = spawn_dispatcher(
        urls(&["a.example", "timeout.example", "empty.example", "b.example"]),
        3,
        transport,
        sender,
    );

    let mut records = Vec::new();
    let mut failures = Vec::new();
    while let Some(outcome) = receiver.recv().await {
        match outcome {
            FetchOutcome::Record(record) => records.push(record.url),
            FetchOutcome::Failed { url, .. } => failures.push(url),
        }
    }
    handle.await.expect("dispatcher task");

    records.sort();
    assert_eq!(
        records,
        vec!["https://a.example/".to_string(), "https://b.example/".to_string()]
    );
    assert_eq!(failures, vec!["https://timeout.example/".to_string()]);
}

#[tokio::test]
async fn test_timeout_is_reported_and_run_continues() {
    let transport = Arc::new(LatencyTransport::new(Duration::from_millis(1)));
    let mut csv_out = Vec::new();
    let mut status = Vec::new();

    let report = run_with_transport(
        urls(&["first.example", "timeout.example", "last.example"]),
        1,
        transport,
        &mut csv_out,
        &mut status,
    )
    .await;

    assert_eq!(report.total_urls, 3);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.fetch_failures, 1);

    let status = String::from_utf8(status).expect("utf8");
    assert!(status.contains("Error processing URL https://timeout.example/: timed out after 40s"));
    assert!(status.contains("URL: https://last.example/"));
    assert!(status.ends_with("Processing complete. 3 URLs processed.\n"));

    let csv_out = String::from_utf8(csv_out).expect("utf8");
    assert!(!csv_out.contains("timeout.example"));
}

#[tokio::test]
async fn test_empty_input_processes_nothing() {
    let transport = Arc::new(LatencyTransport::new(Duration::from_millis(1)));
    let mut csv_out = Vec::new();
    let mut status = Vec::new();

    let report = run_with_transport(Vec::new(), 5, Arc::clone(&transport), &mut csv_out, &mut status).await;

    assert_eq!(report.total_urls, 0);
    assert_eq!(report.records_written, 0);
    assert_eq!(transport.calls(), 0);
    assert!(csv_out.is_empty());
    assert_eq!(
        String::from_utf8(status).expect("utf8"),
        "Processing complete. 0 URLs processed.\n"
    );
}

#[tokio::test]
async fn test_empty_certificate_counts_toward_total_without_diagnostic() {
    let transport = Arc::new(LatencyTransport::new(Duration::from_millis(1)));
    let mut csv_out = Vec::new();
    let mut status = Vec::new();

    let report = run_with_transport(
        urls(&["empty.example"]),
        5,
        transport,
        &mut csv_out,
        &mut status,
    )
    .await;

    assert_eq!(report.total_urls, 1);
    assert_eq!(report.records_written, 0);
    assert_eq!(report.fetch_failures, 0);
    let status = String::from_utf8(status).expect("utf8");
    assert!(!status.contains("Error"));
    assert!(status.contains("Processing complete. 1 URLs processed."));
}
