use chrono::{TimeZone, Utc};
use domain::{ReportRun, ReportStatus, StoreStatus, TransitionError};

#[test]
fn report_run_completes_once() {
    let created = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
    let done = Utc.with_ymd_and_hms(2024, 1, 3, 10, 5, 0).unwrap();
    let mut run = ReportRun::new("report-1", created);
    assert_eq!(run.status, ReportStatus::Running);
    assert!(run.completed_at.is_none());

    run.transition(
        ReportStatus::Completed,
        Some("reports/report_report-1.csv".to_string()),
        done,
    )
    .expect("complete");
    assert_eq!(run.status, ReportStatus::Completed);
    assert_eq!(run.completed_at, Some(done));

    let err = run
        .transition(ReportStatus::Failed, None, done)
        .expect_err("terminal");
    assert_eq!(err, TransitionError::AlreadyTerminal("completed"));
    assert_eq!(run.status, ReportStatus::Completed);
}

#[test]
fn report_run_rejects_completion_without_artifact() {
    let created = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
    let mut run = ReportRun::new("report-2", created);
    let err = run
        .transition(ReportStatus::Completed, None, created)
        .expect_err("missing artifact");
    assert_eq!(err, TransitionError::MissingArtifact);
    assert_eq!(run.status, ReportStatus::Running);
}

#[test]
fn failed_report_has_no_artifact() {
    let created = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
    let mut run = ReportRun::new("report-3", created);
    run.transition(ReportStatus::Failed, Some("ignored".to_string()), created)
        .expect("fail");
    assert_eq!(run.status, ReportStatus::Failed);
    assert!(run.artifact_location.is_none());
    assert!(run.transition(ReportStatus::Running, None, created).is_err());
}

#[test]
fn status_strings_parse() {
    assert_eq!(StoreStatus::parse(" Active "), Some(StoreStatus::Active));
    assert_eq!(StoreStatus::parse("inactive"), Some(StoreStatus::Inactive));
    assert_eq!(StoreStatus::parse("unknown"), None);
    assert_eq!(ReportStatus::parse("COMPLETED"), Some(ReportStatus::Completed));
    assert_eq!(ReportStatus::Failed.label(), "Failed");
}
