//! Integration tests for the trend engine.

use std::io::Cursor;

use chrono::{TimeZone, Utc};
use trend_engine::classify::classify;
use trend_engine::matcher::match_documents;
use trend_engine::normalize::read_documents;
use trend_engine::render::{render_issue_report, render_text};
use trend_engine::types::{Direction, IssueStatus};
use trend_engine::{
  export, Cadence, Config, Document, Engine, IssueDefinition, KeywordCategoryIndex, PeriodSnapshot,
  ReportContext,
};

fn fixture_index() -> KeywordCategoryIndex {
  let json = r#"{
    "Streaming": ["rtsp"],
    "Firmware": ["firmware update"]
  }"#;
  KeywordCategoryIndex::from_json_str("fixture", json).unwrap()
}

fn fixture_issue() -> IssueDefinition {
  let json = r#"{
    "issue_name": "CMP Not Working",
    "issue_id": "CMP-001",
    "severity_label": "HIGH",
    "keywords": {"primary": ["cmp"], "symptoms": ["not working"], "context": []},
    "exclude_keywords": ["resolved"],
    "match_criteria": {"require_primary": true, "require_symptom": true},
    "tracking_metrics": {"alert_threshold": 2, "escalation_threshold": 3}
  }"#;
  IssueDefinition::from_json_str("fixture", json).unwrap()
}

fn ctx() -> ReportContext {
  ReportContext::new(Cadence::Weekly, Utc.with_ymd_and_hms(2025, 1, 27, 9, 0, 0).unwrap())
}

#[test]
fn scenario_a_three_documents() {
  let docs = vec![
    Document::new("1", "Feed drops", "our rtsp feed keeps dropping"),
    Document::new("2", "Question", "after the firmware update it reboots"),
    Document::new("3", "Invoice", "please resend the invoice"),
  ];
  let result = classify(&docs, &fixture_index());

  assert_eq!(result.total_documents, 3);
  assert_eq!(result.categories["Streaming"].total_mentions, 1);
  assert_eq!(result.categories["Streaming"].documents_with_category, 1);
  assert_eq!(result.categories["Firmware"].total_mentions, 1);
  assert_eq!(result.categories["Firmware"].documents_with_category, 1);
}

#[test]
fn scenario_b_exact_score() {
  let docs = vec![Document::new(
    "1",
    "",
    "CMP autotracking is not working after update",
  )];
  let report = match_documents(&docs, &fixture_issue(), &Config::default());

  assert_eq!(report.matched_count, 1);
  let m = &report.matches[0];
  assert_eq!(m.matched_primary, vec!["cmp".to_string()]);
  assert_eq!(m.matched_symptoms, vec!["not working".to_string()]);
  // base 1 + high-severity symptom 2
  assert_eq!(m.severity_score, 3);
}

#[test]
fn case_insensitive_and_coverage_invariant() {
  let docs = vec![
    Document::new("1", "RTSP", "rtsp RtSp"),
    Document::new("2", "nothing", "here"),
  ];
  let result = classify(&docs, &fixture_index());
  let streaming = &result.categories["Streaming"];
  assert_eq!(streaming.total_mentions, 3);
  assert_eq!(streaming.documents_with_category, 1);
  for stats in result.categories.values() {
    assert!(stats.documents_with_category <= result.total_documents);
    if stats.total_mentions > 0 {
      assert!(stats.documents_with_category <= stats.total_mentions);
    }
  }
}

#[test]
fn identical_input_identical_output() {
  let docs = vec![
    Document::new("1", "CMP down", "cmp not working on live broadcast, urgent"),
    Document::new("2", "CMP", "cmp not working"),
    Document::new("3", "rtsp", "rtsp firmware update"),
  ];
  let engine = Engine::new(Config::default(), fixture_index(), vec![fixture_issue()]);
  let a = engine.run(&docs, None, ctx());
  let b = engine.run(&docs, None, ctx());

  assert_eq!(a.classification, b.classification);
  assert_eq!(a.issue_reports, b.issue_reports);
  assert_eq!(render_text(&a.report), render_text(&b.report));
  assert!(a.issue_reports[0]
    .matches
    .windows(2)
    .all(|w| w[0].severity_score >= w[1].severity_score));
}

#[test]
fn skipped_lines_never_reach_statistics() {
  let input = concat!(
    "{\"id\": \"a\", \"subject\": \"rtsp\", \"body\": \"dropping\"}\n",
    "not json at all\n",
    "\n",
    "{\"id\": \"b\", \"subject\": \"\", \"body\": \"  \"}\n",
    "{\"message_id\": \"c\", \"subject\": \"Hello\", \"body\": \"thanks\", \"extra\": 1}\n",
  );
  let batch = read_documents(Cursor::new(input)).unwrap();
  assert_eq!(batch.documents.len(), 2);
  assert_eq!(batch.skipped, 2);
  assert_eq!(batch.documents[1].id(), "c");

  let engine = Engine::new(Config::default(), fixture_index(), Vec::new());
  let out = engine.run(&batch.documents, None, ctx().with_skipped(batch.skipped));
  assert_eq!(out.classification.total_documents, 2);
  assert_eq!(out.classification.coverage_percent("Streaming"), 50.0);
  assert_eq!(out.report.volume.skipped_documents, 2);
}

#[test]
fn empty_batch_reports_zero_percentages() {
  let engine = Engine::new(Config::default(), fixture_index(), vec![fixture_issue()]);
  let out = engine.run(&[], None, ctx());
  assert_eq!(out.classification.total_documents, 0);
  assert_eq!(out.issue_reports[0].match_percentage, 0.0);
  assert!(out
    .report
    .top_categories
    .iter()
    .all(|c| c.coverage_percent == 0.0));
  let text = render_text(&out.report);
  assert!(text.contains("No significant trends detected this week"));
}

#[test]
fn week_over_week_run_with_saved_snapshot() {
  let dir = tempfile::tempdir().unwrap();
  let snapshot_path = dir.path().join("previous_week_data.json");
  let engine = Engine::new(Config::default(), fixture_index(), vec![fixture_issue()]);

  // First week: no snapshot on disk yet.
  let last_week = vec![
    Document::new("1", "rtsp", "feed dropping"),
    Document::new("2", "rtsp", "feed frozen"),
  ];
  let previous = PeriodSnapshot::load_optional(&snapshot_path).unwrap();
  assert!(previous.is_none());
  let first = engine.run(&last_week, previous.as_ref(), ctx());
  assert!(first.trends.is_none());
  first.snapshot.save(&snapshot_path).unwrap();

  // Second week doubles the stream complaints and adds tracked-issue reports.
  let this_week = vec![
    Document::new("3", "rtsp", "feed dropping"),
    Document::new("4", "rtsp", "feed dropping again"),
    Document::new("5", "rtsp", "no picture"),
    Document::new("6", "rtsp", "black screen"),
    Document::new("7", "CMP", "cmp not working"),
    Document::new("8", "CMP", "cmp not working since monday"),
    Document::new("9", "CMP", "cmp not working, resolved now"),
  ];
  let previous = PeriodSnapshot::load_optional(&snapshot_path).unwrap();
  let second = engine.run(&this_week, previous.as_ref(), ctx());

  let trends = second.trends.as_ref().unwrap();
  assert_eq!(trends.total_documents.direction, Direction::Up);
  assert_eq!(trends.categories["Streaming"].direction, Direction::Up);
  assert_eq!(trends.categories["Streaming"].percent_change, 100.0);
  assert_eq!(trends.categories["Firmware"].direction, Direction::New);

  let issue = &second.issue_reports[0];
  assert_eq!(issue.matched_count, 2);
  assert_eq!(issue.excluded_count, 1);
  assert_eq!(second.report.tracked_issues[0].status, IssueStatus::Alert);

  let text = render_text(&second.report);
  assert!(text.contains("Streaming spiked 100.0%"));
  assert!(text.contains("Support volume increased 250.0%"));
  assert!(text.contains("CRITICAL ISSUES TRACKED"));

  let detail = render_issue_report(
    issue,
    &engine.issues()[0],
    engine.config(),
    &second.report.generated_at,
  );
  assert!(detail.contains("CMP Not Working"));

  let csv_path = dir.path().join("CMP-001_affected.csv");
  export::export_affected_documents(&csv_path, &issue.matches).unwrap();
  let csv = std::fs::read_to_string(&csv_path).unwrap();
  assert_eq!(csv.lines().count(), 3);
}

#[test]
fn malformed_keyword_file_is_config_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("keywords.json");
  std::fs::write(&path, r#"{"Streaming": "rtsp"}"#).unwrap();
  let err = KeywordCategoryIndex::load(&path).unwrap_err();
  assert!(err.is_config());

  let missing = dir.path().join("absent.json");
  let index = KeywordCategoryIndex::load_or_default(Some(&missing)).unwrap();
  assert_eq!(index, KeywordCategoryIndex::default());
}
