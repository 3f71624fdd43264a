//! Scenario tests for the poll loop, driven by scripted snapshots and a manual clock.

use crate::clock::ManualClock;
use crate::error::{WaitError, EXIT_FATAL, EXIT_USAGE};
use crate::poller::{Outcome, PollState, Poller};
use crate::selector::{Label, Selector};
use pipelinerun_client::{pipeline_run, ClientError, MockCall, MockPipelineRunClient};
use std::time::Duration;

fn by_name(name: &str) -> Selector {
    Selector::Name(name.to_string())
}

fn by_labels(labels: &[&str]) -> Selector {
    Selector::Labels(labels.iter().map(|l| l.parse::<Label>().unwrap()).collect())
}

fn poller<'a>(
    mock: &MockPipelineRunClient,
    clock: &ManualClock,
    selector: Selector,
    timeout_secs: u64,
    out: &'a mut Vec<u8>,
) -> Poller<MockPipelineRunClient, ManualClock, &'a mut Vec<u8>> {
    Poller::new(
        mock.clone(),
        clock.clone(),
        selector,
        Duration::from_secs(timeout_secs),
        out,
    )
    .unwrap()
}

#[tokio::test]
async fn test_named_run_progresses_to_success() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![pipeline_run("build-1", None)])
        .push_snapshot(vec![pipeline_run("build-1", Some("Running"))])
        .push_snapshot(vec![pipeline_run("build-1", Some("Succeeded"))]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_name("build-1"), 600, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert_eq!(report.outcome.exit_code(), 0);
    assert_eq!(report.iterations, 3);
    assert_eq!(clock.elapsed().num_seconds(), 10);
    assert_eq!(mock.calls(), vec![MockCall::Get("build-1".to_string()); 3]);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("PipelineRun build-1: no condition yet"));
    assert!(text.contains("PipelineRun build-1: running"));
    assert!(text.contains("PipelineRun build-1: succeeded"));
    assert!(text.contains("All PipelineRuns succeeded\nConditions:\nbuild-1: [{"));
}

#[tokio::test]
async fn test_labelled_runs_with_one_failure_fail() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![
        pipeline_run("build-a", Some("Running")),
        pipeline_run("build-b", Some("Running")),
    ])
    .push_snapshot(vec![
        pipeline_run("build-a", Some("Succeeded")),
        pipeline_run("build-b", Some("Failed")),
    ]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_labels(&["app=ci"]), 600, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Failed);
    assert_eq!(report.outcome.exit_code(), 21);
    assert_eq!(report.iterations, 2);
    assert_eq!(
        mock.calls()[0],
        MockCall::List(vec![("app".to_string(), "ci".to_string())])
    );

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("PipelineRun build-b: failed"));
    assert!(text.contains("At least one PipelineRun failed"));
}

#[tokio::test]
async fn test_stuck_run_times_out() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![pipeline_run("stuck-run", Some("Running"))]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_name("stuck-run"), 10, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::TimedOut);
    assert_eq!(report.outcome.exit_code(), 124);
    // Polls at 0s, 5s, 10s and 15s; only 15s is past the 10s deadline.
    assert_eq!(report.iterations, 4);
    assert_eq!(clock.elapsed().num_seconds(), 15);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Timed out after 10s waiting for PipelineRuns"));
    assert!(text.contains("Conditions:\nstuck-run: [{"));
}

#[tokio::test]
async fn test_empty_label_match_succeeds_immediately() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(Vec::new());
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_labels(&["app=nothing"]), 600, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert_eq!(report.iterations, 1);
    assert_eq!(clock.elapsed().num_seconds(), 0);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "All PipelineRuns succeeded\nConditions:\n"
    );
}

#[tokio::test]
async fn test_all_succeeded_across_iterations() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![
        pipeline_run("a", Some("ResolvingPipelineRef")),
        pipeline_run("b", Some("Succeeded")),
    ])
    .push_snapshot(vec![
        pipeline_run("a", Some("Running")),
        pipeline_run("b", Some("Succeeded")),
    ])
    .push_snapshot(vec![
        pipeline_run("a", Some("Succeeded")),
        pipeline_run("b", Some("Succeeded")),
    ]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_labels(&["app=ci", "team=infra"]), 600, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert_eq!(report.iterations, 3);
    assert_eq!(report.runs.len(), 2);
}

#[tokio::test]
async fn test_failure_latch_survives_later_success() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![
        pipeline_run("a", Some("Failed")),
        pipeline_run("b", Some("Running")),
    ])
    .push_snapshot(vec![
        pipeline_run("a", Some("Succeeded")),
        pipeline_run("b", Some("Succeeded")),
    ]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_labels(&["app=ci"]), 600, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Failed);
}

#[tokio::test]
async fn test_early_failure_waits_for_remaining_runs() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![
        pipeline_run("a", Some("Failed")),
        pipeline_run("b", Some("Running")),
    ])
    .push_snapshot(vec![
        pipeline_run("a", Some("Failed")),
        pipeline_run("b", Some("Running")),
    ])
    .push_snapshot(vec![
        pipeline_run("a", Some("Failed")),
        pipeline_run("b", Some("Succeeded")),
    ]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_labels(&["app=ci"]), 600, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Failed);
    assert_eq!(report.iterations, 3);
}

#[tokio::test]
async fn test_failed_run_with_pending_peer_still_times_out() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![
        pipeline_run("a", Some("Failed")),
        pipeline_run("b", Some("Running")),
    ]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_labels(&["app=ci"]), 10, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::TimedOut);
}

#[tokio::test]
async fn test_unknown_reason_is_not_done() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![pipeline_run("build-1", Some("Cancelled"))]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_name("build-1"), 5, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::TimedOut);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("PipelineRun build-1: unknown reason \"Cancelled\""));
}

#[tokio::test]
async fn test_completion_wins_over_expired_deadline() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![pipeline_run("build-1", Some("Succeeded"))]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_name("build-1"), 0, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Succeeded);
}

#[tokio::test]
async fn test_missing_named_run_is_fatal() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_not_found();
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let err = poller(&mock, &clock, by_name("build-1"), 600, &mut out)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, WaitError::ResourceNotFound(_)));
    assert_eq!(err.exit_code(), EXIT_FATAL);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_run_deleted_mid_poll_is_fatal() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![pipeline_run("build-1", Some("Running"))])
        .push_not_found();
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let err = poller(&mock, &clock, by_name("build-1"), 600, &mut out)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, WaitError::ResourceNotFound(_)));
    assert_eq!(mock.calls().len(), 2);
}

#[tokio::test]
async fn test_transient_fetch_error_is_retried() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_unavailable("connection refused")
        .push_snapshot(vec![pipeline_run("build-1", Some("Succeeded"))]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_name("build-1"), 600, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert_eq!(report.iterations, 2);
    assert_eq!(clock.elapsed().num_seconds(), 5);
}

#[tokio::test]
async fn test_persistent_fetch_errors_end_in_timeout() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![pipeline_run("build-1", Some("Running"))])
        .push_unavailable("apiserver returned 503");
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_name("build-1"), 5, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::TimedOut);
    // Summary falls back to the last snapshot that was fetched.
    assert_eq!(report.runs.len(), 1);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Conditions:\nbuild-1: [{"));
}

#[tokio::test]
async fn test_step_reports_polling_until_done() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![pipeline_run("build-1", Some("Running"))])
        .push_snapshot(vec![pipeline_run("build-1", Some("Succeeded"))]);
    let clock = ManualClock::new();
    let mut out = Vec::new();
    let mut poller = poller(&mock, &clock, by_name("build-1"), 600, &mut out);

    assert_eq!(poller.step().await.unwrap(), PollState::Polling);
    assert_eq!(
        poller.step().await.unwrap(),
        PollState::Finished(Outcome::Succeeded)
    );
}

#[tokio::test]
async fn test_rejected_request_is_fatal() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_snapshot(vec![pipeline_run("build-1", Some("Running"))])
        .push_api_error(403, "pipelineruns.tekton.dev is forbidden");
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let err = poller(&mock, &clock, by_labels(&["app=ci"]), 600, &mut out)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WaitError::Client(ClientError::Rejected { code: 403, .. })
    ));
    assert_eq!(err.exit_code(), EXIT_FATAL);
    assert_eq!(mock.calls().len(), 2);
    assert_eq!(clock.elapsed().num_seconds(), 5);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock = MockPipelineRunClient::new("ci");
    mock.push_api_error(503, "etcd leader changed")
        .push_api_error(429, "too many requests")
        .push_snapshot(vec![pipeline_run("build-1", Some("Succeeded"))]);
    let clock = ManualClock::new();
    let mut out = Vec::new();

    let report = poller(&mock, &clock, by_labels(&["app=ci"]), 600, &mut out)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert_eq!(report.iterations, 3);
}

#[test]
fn test_out_of_range_timeout_is_usage_error() {
    let mock = MockPipelineRunClient::new("ci");
    let result = Poller::new(
        mock,
        ManualClock::new(),
        by_name("build-1"),
        Duration::from_secs(u64::MAX),
        Vec::new(),
    );

    let Err(err) = result else {
        panic!("timeout should be out of range");
    };
    assert!(matches!(err, WaitError::InvalidTimeout(_)));
    assert_eq!(err.exit_code(), EXIT_USAGE);
}
