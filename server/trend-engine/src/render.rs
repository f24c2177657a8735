//! Plain-text rendering of assembled reports.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::config::Config;
use crate::issue::IssueDefinition;
use crate::matcher::IssueMatchReport;
use crate::report::{IssueSummary, Report};
use crate::types::{Direction, IssueStatus, TrendDelta};

const WIDTH: usize = 70;

fn heavy_rule() -> String {
  "=".repeat(WIDTH)
}

fn light_rule() -> String {
  "─".repeat(WIDTH)
}

fn section(out: &mut String, title: &str) {
  let _ = writeln!(out, "\n{}", light_rule());
  let _ = writeln!(out, "{}", title);
  let _ = writeln!(out, "{}", light_rule());
}

/// NEW has no baseline, so no percentage.
fn trend_suffix(delta: &TrendDelta) -> String {
  match delta.direction {
    Direction::New => format!(" {}", delta.direction.arrow()),
    _ => format!(" {} ({:+.1}%)", delta.direction.arrow(), delta.percent_change),
  }
}

fn status_line(issue: &IssueSummary) -> &'static str {
  match issue.status {
    IssueStatus::Escalation => "STATUS: ESCALATION REQUIRED",
    IssueStatus::Alert => "STATUS: ALERT THRESHOLD REACHED",
    IssueStatus::Normal => "STATUS: Normal levels",
  }
}

/// Render the team report in its fixed section order.
pub fn render_text(report: &Report) -> String {
  let mut out = String::new();
  let period = report.cadence.period_word();

  let _ = writeln!(out, "{}", heavy_rule());
  let _ = writeln!(out, "{}", report.title);
  let _ = writeln!(out, "{}", heavy_rule());
  let _ = writeln!(
    out,
    "\nReport Period: {} - {}",
    report.period.start.format("%B %d, %Y"),
    report.period.end.format("%B %d, %Y")
  );
  let _ = writeln!(out, "Generated: {}", report.generated_at);
  let _ = writeln!(out, "Report ID: {}", report.report_id);

  section(&mut out, "VOLUME METRICS");
  let volume = &report.volume;
  match &volume.trend {
    Some(delta) if delta.direction != Direction::New => {
      let _ = writeln!(
        out,
        "\nTotal Support Emails: {} {} ({:+.1}% vs last {})",
        volume.total_documents,
        delta.direction.arrow(),
        delta.percent_change,
        period
      );
    }
    Some(delta) => {
      let _ = writeln!(
        out,
        "\nTotal Support Emails: {} {}",
        volume.total_documents,
        delta.direction.arrow()
      );
    }
    None => {
      let _ = writeln!(out, "\nTotal Support Emails: {}", volume.total_documents);
    }
  }
  if let Some(avg) = volume.daily_average {
    let _ = writeln!(out, "Daily Average: {:.1} emails per day", avg);
  }
  if volume.skipped_documents > 0 {
    let _ = writeln!(out, "Skipped (unreadable): {}", volume.skipped_documents);
  }

  section(&mut out, &format!("TOP ISSUES THIS {}", period.to_uppercase()));
  for cat in &report.top_categories {
    let trend = cat.trend.as_ref().map(trend_suffix).unwrap_or_default();
    let _ = writeln!(out, "\n{}. {}{}", cat.rank, cat.name, trend);
    let _ = writeln!(out, "   • {} total mentions", cat.total_mentions);
    let _ = writeln!(
      out,
      "   • {} emails affected ({:.1}% of total)",
      cat.documents_with_category, cat.coverage_percent
    );
    if !cat.top_keywords.is_empty() {
      let list: Vec<String> = cat
        .top_keywords
        .iter()
        .map(|k| format!("{} ({})", k.keyword, k.count))
        .collect();
      let _ = writeln!(out, "   • Top keywords: {}", list.join(", "));
    }
  }

  if !report.tracked_issues.is_empty() {
    section(&mut out, "CRITICAL ISSUES TRACKED");
    for issue in &report.tracked_issues {
      let _ = writeln!(out, "\n[{}] {}", issue.severity_label.as_str(), issue.issue_name);
      let _ = writeln!(out, "   • Issue ID: {}", issue.issue_id);
      let _ = writeln!(out, "   • Severity: {}", issue.severity_label.as_str());
      let _ = writeln!(
        out,
        "   • Reports this {}: {} ({:.2}% of emails)",
        period, issue.matched_count, issue.match_percentage
      );
      if issue.matched_count > 0 {
        let _ = writeln!(out, "   • Average severity: {:.1}/20", issue.avg_severity);
        let _ = writeln!(out, "   • High severity cases (10+): {}", issue.high_severity_count);
        let _ = writeln!(out, "   • Critical cases (15+): {}", issue.critical_severity_count);
      }
      let _ = writeln!(out, "   • {}", status_line(issue));
    }
  }

  section(&mut out, "KEY INSIGHTS");
  for insight in &report.insights {
    let _ = writeln!(out, "\n• {}", insight);
  }

  section(&mut out, "RECOMMENDED ACTIONS");
  for action in &report.action_items {
    let _ = writeln!(out, "\n• {}", action);
  }

  if !report.attachments.is_empty() {
    section(&mut out, "ATTACHMENTS");
    let _ = writeln!(out);
    for name in &report.attachments {
      let _ = writeln!(out, "• {}", name);
    }
  }

  let _ = writeln!(out, "\n{}", heavy_rule());
  let _ = writeln!(out, "End of {} Report", capitalize(report.cadence.label()));
  let _ = write!(out, "{}", heavy_rule());
  out
}

fn capitalize(label: &str) -> String {
  let lower = label.to_lowercase();
  let mut chars = lower.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

fn breakdown(out: &mut String, title: &str, hits: &IndexMap<String, u64>) {
  if hits.is_empty() {
    return;
  }
  let mut sorted: Vec<(&String, &u64)> = hits.iter().collect();
  sorted.sort_by(|a, b| b.1.cmp(a.1));
  section(out, title);
  for (keyword, count) in sorted {
    let _ = writeln!(out, "  • {}: {} mentions", keyword, count);
  }
}

/// Detailed report for one tracked issue: summary, severity analysis, keyword
/// breakdowns and the highest-severity documents.
pub fn render_issue_report(
  report: &IssueMatchReport,
  definition: &IssueDefinition,
  config: &Config,
  generated_at: &str,
) -> String {
  let mut out = String::new();
  let summary = IssueSummary::from_match(report, definition);

  let _ = writeln!(out, "{}", heavy_rule());
  let _ = writeln!(out, "CRITICAL ISSUE TRACKER REPORT");
  let _ = writeln!(out, "{}", heavy_rule());
  let _ = writeln!(out, "Generated: {}", generated_at);
  let _ = writeln!(out, "Issue: {}", definition.issue_name);
  let _ = writeln!(out, "Issue ID: {}", definition.issue_id);
  let _ = writeln!(out, "Severity Level: {}", definition.severity_label.as_str());

  section(&mut out, "SUMMARY");
  let _ = writeln!(out, "Total Emails Analyzed: {}", report.total_documents);
  let _ = writeln!(out, "Emails Matching Issue: {}", report.matched_count);
  let _ = writeln!(out, "Match Percentage: {:.2}%", report.match_percentage);
  if report.excluded_count > 0 {
    let _ = writeln!(out, "Excluded (resolved/filtered): {}", report.excluded_count);
  }

  if report.matched_count > 0 {
    let _ = writeln!(out, "\nSEVERITY ANALYSIS:");
    let _ = writeln!(out, "  Average Severity: {:.1}/20", report.avg_severity);
    let _ = writeln!(
      out,
      "  High Severity Cases ({}+): {}",
      config.high_severity_score, report.high_severity_count
    );
    let _ = writeln!(
      out,
      "  Critical Cases ({}+): {}",
      config.critical_severity_score, report.critical_severity_count
    );
  }
  let threshold_note = match summary.status {
    IssueStatus::Escalation => format!(">= {} cases", summary.escalation_threshold),
    IssueStatus::Alert => format!(">= {} cases", summary.alert_threshold),
    IssueStatus::Normal => format!("< {} cases", summary.alert_threshold),
  };
  let _ = writeln!(out, "  {} ({})", status_line(&summary), threshold_note);

  breakdown(&mut out, "PRIMARY KEYWORD MATCHES", &report.primary_hits);
  breakdown(&mut out, "SYMPTOM KEYWORD MATCHES", &report.symptom_hits);
  breakdown(&mut out, "CONTEXT KEYWORD MATCHES", &report.context_hits);
  breakdown(&mut out, "AFFECTED PRODUCTS", &report.product_mentions);

  if !report.matches.is_empty() {
    let limit = config.detail_document_limit;
    let _ = writeln!(out, "\n{}", heavy_rule());
    let _ = writeln!(out, "HIGH SEVERITY EMAIL DETAILS (Top {})", limit);
    let _ = writeln!(out, "{}", heavy_rule());

    for (i, m) in report.matches.iter().take(limit).enumerate() {
      let _ = writeln!(out, "\n--- Email #{} (Severity: {}/20) ---", i + 1, m.severity_score);
      if !m.subject.is_empty() {
        let _ = writeln!(out, "Subject: {}", m.subject);
      }
      if let Some(from) = &m.from {
        let _ = writeln!(out, "From: {}", from);
      }
      if let Some(date) = &m.date {
        let _ = writeln!(out, "Date: {}", date);
      }
      if !m.matched_primary.is_empty() {
        let _ = writeln!(out, "Matched Keywords: {}", m.matched_primary.join(", "));
      }
      if !m.matched_symptoms.is_empty() {
        let _ = writeln!(out, "Matched Symptoms: {}", m.matched_symptoms.join(", "));
      }
      if !m.mentioned_products.is_empty() {
        let _ = writeln!(out, "Products: {}", m.mentioned_products.join(", "));
      }
      let _ = writeln!(out, "\nPreview:\n{}", m.preview);
    }

    if report.matches.len() > limit {
      let _ = writeln!(out, "\n... and {} more emails", report.matches.len() - limit);
    }
  }

  let _ = writeln!(out, "\n{}", heavy_rule());
  let _ = writeln!(out, "END OF REPORT");
  let _ = write!(out, "{}", heavy_rule());
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::classify::classify;
  use crate::config::Cadence;
  use crate::issue::IssueDefinition;
  use crate::keywords::KeywordCategoryIndex;
  use crate::matcher::match_documents;
  use crate::report::{assemble, ReportContext};
  use crate::types::Document;
  use chrono::{TimeZone, Utc};

  fn docs() -> Vec<Document> {
    vec![
      Document::new("1", "RTSP stream drops", "since the firmware update"),
      Document::new("2", "CMP autotracking not working", "after update on PT20X"),
      Document::new("3", "Thanks", "all good"),
    ]
  }

  fn ctx(cadence: Cadence) -> ReportContext {
    ReportContext::new(cadence, Utc.with_ymd_and_hms(2025, 1, 27, 9, 0, 0).unwrap())
  }

  #[test]
  fn sections_appear_in_fixed_order() {
    let docs = docs();
    let def = IssueDefinition::template();
    let cfg = Config::default();
    let classification = classify(&docs, &KeywordCategoryIndex::default());
    let matched = match_documents(&docs, &def, &cfg);
    let issues = vec![IssueSummary::from_match(&matched, &def)];
    let report = assemble(
      &classification,
      &issues,
      None,
      &cfg,
      &ctx(Cadence::Weekly).with_artifacts(vec!["weekly_team_report.txt".into()]),
    );
    let text = render_text(&report);

    let order = [
      "SUPPORT - WEEKLY SUMMARY REPORT",
      "VOLUME METRICS",
      "TOP ISSUES THIS WEEK",
      "CRITICAL ISSUES TRACKED",
      "KEY INSIGHTS",
      "RECOMMENDED ACTIONS",
      "ATTACHMENTS",
      "End of Weekly Report",
    ];
    let positions: Vec<usize> = order.iter().map(|s| text.find(s).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", text);
    assert!(text.contains("Report Period: January 20, 2025 - January 27, 2025"));
  }

  #[test]
  fn new_trends_render_without_percentage() {
    use crate::trend::compare_snapshot;
    use crate::types::PeriodSnapshot;

    let docs = docs();
    let classification = classify(&docs, &KeywordCategoryIndex::default());
    let empty = PeriodSnapshot::default();
    let trends = compare_snapshot(&classification, Some(&empty), 5.0);
    let report = assemble(&classification, &[], Some(&trends), &Config::default(), &ctx(Cadence::Weekly));
    let text = render_text(&report);

    assert!(text.contains("Total Support Emails: 3 NEW\n"), "{}", text);
    assert!(text.contains("Firmware NEW\n"), "{}", text);
    assert!(!text.contains("NEW ("), "{}", text);
  }

  #[test]
  fn issue_and_attachment_sections_omitted_when_empty() {
    let docs = docs();
    let classification = classify(&docs, &KeywordCategoryIndex::default());
    let report = assemble(&classification, &[], None, &Config::default(), &ctx(Cadence::Monthly));
    let text = render_text(&report);
    assert!(!text.contains("CRITICAL ISSUES TRACKED"));
    assert!(!text.contains("ATTACHMENTS"));
    assert!(text.contains("Daily Average:"));
    assert!(text.contains("End of Monthly Report"));
  }

  #[test]
  fn issue_report_lists_breakdowns_and_details() {
    let docs = docs();
    let def = IssueDefinition::template();
    let cfg = Config::default();
    let matched = match_documents(&docs, &def, &cfg);
    let text = render_issue_report(&matched, &def, &cfg, "2025-01-27 09:00:00");

    assert!(text.contains("Issue ID: CMP-AT-2025-001"));
    assert!(text.contains("Emails Matching Issue: 1"));
    assert!(text.contains("PRIMARY KEYWORD MATCHES"));
    assert!(text.contains("  • cmp: 1 mentions"));
    assert!(text.contains("AFFECTED PRODUCTS"));
    assert!(text.contains("--- Email #1"));
    assert!(text.contains("STATUS: Normal levels (< 5 cases)"));
  }
}
