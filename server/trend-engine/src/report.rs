//! Report assembly: ranked categories, issue status blocks, insights and actions.
//!
//! Pure: everything time-dependent arrives through `ReportContext`, and no I/O
//! happens here. Rendering to text lives in `render`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::classify::{percent, Classification};
use crate::config::{Cadence, Config};
use crate::fingerprint;
use crate::issue::{IssueDefinition, SeverityLabel};
use crate::matcher::IssueMatchReport;
use crate::trend::TrendReport;
use crate::types::{IssueStatus, TrendDelta};

/// Approximate weeks per month for the monthly per-week average.
const WEEKS_PER_MONTH: f64 = 4.3;

/// Per-issue figures the report needs, detached from the matched documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueSummary {
  pub issue_id: String,
  pub issue_name: String,
  pub severity_label: SeverityLabel,
  pub matched_count: usize,
  pub match_percentage: f64,
  pub avg_severity: f64,
  pub high_severity_count: usize,
  pub critical_severity_count: usize,
  pub alert_threshold: u32,
  pub escalation_threshold: u32,
  pub status: IssueStatus,
}

impl IssueSummary {
  pub fn from_match(report: &IssueMatchReport, definition: &IssueDefinition) -> Self {
    let metrics = &definition.tracking_metrics;
    Self {
      issue_id: definition.issue_id.clone(),
      issue_name: definition.issue_name.clone(),
      severity_label: definition.severity_label,
      matched_count: report.matched_count,
      match_percentage: report.match_percentage,
      avg_severity: report.avg_severity,
      high_severity_count: report.high_severity_count,
      critical_severity_count: report.critical_severity_count,
      alert_threshold: metrics.alert_threshold,
      escalation_threshold: metrics.escalation_threshold,
      status: report.status(definition),
    }
  }
}

/// Caller-chosen parameters of one report.
#[derive(Debug, Clone)]
pub struct ReportContext {
  pub cadence: Cadence,
  /// Ranked categories shown; `None` uses the cadence default.
  pub top_n: Option<usize>,
  pub period_end: DateTime<Utc>,
  pub generated_at: DateTime<Utc>,
  pub report_id: String,
  /// Documents dropped at ingestion, shown next to the volume.
  pub skipped_documents: usize,
  /// Names of the files generated alongside this report.
  pub artifacts: Vec<String>,
}

impl ReportContext {
  pub fn new(cadence: Cadence, now: DateTime<Utc>) -> Self {
    let period = now.format("%Y-%m-%d").to_string();
    Self {
      cadence,
      top_n: None,
      period_end: now,
      generated_at: now,
      report_id: fingerprint::report_id(cadence.label(), &period, std::iter::empty()),
      skipped_documents: 0,
      artifacts: Vec::new(),
    }
  }

  pub fn with_top_n(mut self, top_n: Option<usize>) -> Self {
    self.top_n = top_n;
    self
  }

  pub fn with_report_id(mut self, report_id: String) -> Self {
    self.report_id = report_id;
    self
  }

  pub fn with_skipped(mut self, skipped: usize) -> Self {
    self.skipped_documents = skipped;
    self
  }

  pub fn with_artifacts(mut self, artifacts: Vec<String>) -> Self {
    self.artifacts = artifacts;
    self
  }

  fn effective_top_n(&self) -> usize {
    self.top_n.unwrap_or_else(|| self.cadence.default_top_n())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPeriod {
  pub start: NaiveDate,
  pub end: NaiveDate,
  pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeMetrics {
  pub total_documents: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub trend: Option<TrendDelta>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub daily_average: Option<f64>,
  pub skipped_documents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
  pub keyword: String,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCategory {
  pub rank: usize,
  pub name: String,
  pub total_mentions: u64,
  pub documents_with_category: u64,
  pub coverage_percent: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub trend: Option<TrendDelta>,
  pub top_keywords: Vec<KeywordCount>,
}

/// Structured team report. Section order is fixed; empty optional sections
/// (no tracked issues, no artifacts) are left empty and skipped by renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  pub report_id: String,
  pub title: String,
  pub cadence: Cadence,
  pub period: ReportPeriod,
  pub generated_at: String,
  pub volume: VolumeMetrics,
  pub top_categories: Vec<RankedCategory>,
  pub tracked_issues: Vec<IssueSummary>,
  pub insights: Vec<String>,
  pub action_items: Vec<String>,
  pub attachments: Vec<String>,
}

/// Assemble the team report.
///
/// `trends` is `None` when no previous snapshot was available; trend arrows
/// and trend-driven insights/actions are then left out.
pub fn assemble(
  classification: &Classification,
  issues: &[IssueSummary],
  trends: Option<&TrendReport>,
  config: &Config,
  ctx: &ReportContext,
) -> Report {
  let cadence = ctx.cadence;
  let days = cadence.period_days();
  let end = ctx.period_end.date_naive();
  let start = (ctx.period_end - Duration::days(days)).date_naive();

  let total = classification.total_documents;
  let volume = VolumeMetrics {
    total_documents: total,
    trend: trends.map(|t| t.total_documents),
    daily_average: match cadence {
      Cadence::Monthly => Some(total as f64 / days as f64),
      Cadence::Weekly => None,
    },
    skipped_documents: ctx.skipped_documents,
  };

  let top_categories = classification
    .ranked()
    .into_iter()
    .take(ctx.effective_top_n())
    .enumerate()
    .map(|(i, (name, stats))| RankedCategory {
      rank: i + 1,
      name: name.to_string(),
      total_mentions: stats.total_mentions,
      documents_with_category: stats.documents_with_category,
      coverage_percent: percent(stats.documents_with_category, total),
      trend: trends.and_then(|t| t.categories.get(name).copied()),
      top_keywords: stats
        .top_keywords(config.top_keywords_per_category)
        .into_iter()
        .map(|(keyword, count)| KeywordCount {
          keyword: keyword.to_string(),
          count,
        })
        .collect(),
    })
    .collect();

  let insights = insights(classification, issues, trends, config, ctx);
  let action_items = action_items(classification, issues, trends, config, cadence);

  Report {
    report_id: ctx.report_id.clone(),
    title: format!("SUPPORT - {} SUMMARY REPORT", cadence.label()),
    cadence,
    period: ReportPeriod { start, end, days },
    generated_at: ctx.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    volume,
    top_categories,
    tracked_issues: issues.to_vec(),
    insights,
    action_items,
    attachments: ctx.artifacts.clone(),
  }
}

fn mentions(classification: &Classification, category: &str) -> u64 {
  classification
    .categories
    .get(category)
    .map_or(0, |stats| stats.total_mentions)
}

fn insights(
  classification: &Classification,
  issues: &[IssueSummary],
  trends: Option<&TrendReport>,
  config: &Config,
  ctx: &ReportContext,
) -> Vec<String> {
  let period = ctx.cadence.period_word();
  let total = classification.total_documents;
  let mut out = Vec::new();

  if let Some((name, stats)) = classification.ranked().first() {
    if stats.total_mentions > 0 {
      out.push(format!(
        "{} is the dominant issue this {}, affecting {:.1}% of support emails",
        name,
        period,
        percent(stats.documents_with_category, total)
      ));
    }
  }

  if let Some(trends) = trends {
    let change = trends.total_documents.percent_change;
    if TrendReport::exceeds(total, trends.previous_total, config.volume_increase_ratio) {
      out.push(format!(
        "Support volume increased {:.1}% compared to last {} - monitor for capacity needs",
        change, period
      ));
    } else if TrendReport::falls_below(total, trends.previous_total, config.volume_decrease_ratio) {
      out.push(format!(
        "Support volume decreased {:.1}% compared to last {}",
        -change, period
      ));
    }

    for (name, delta) in &trends.categories {
      let previous = trends.previous_mentions.get(name).copied();
      if TrendReport::exceeds(mentions(classification, name), previous, config.spike_ratio) {
        out.push(format!(
          "{} spiked {:.1}% - investigate for new issues or trends",
          name, delta.percent_change
        ));
      }
    }
  }

  for issue in issues {
    if issue.severity_label == SeverityLabel::Critical && issue.matched_count > 0 {
      out.push(format!(
        "CRITICAL: {} affecting {} customers - escalate to engineering",
        issue.issue_name, issue.matched_count
      ));
    }
  }

  if out.is_empty() {
    out.push(format!("No significant trends detected this {}", period));
  }

  if ctx.cadence == Cadence::Monthly {
    let mut monthly = Vec::new();
    if total > 0 {
      monthly.push(format!(
        "Monthly volume of {} emails averages {:.1} emails per week",
        total,
        total as f64 / WEEKS_PER_MONTH
      ));
    }
    monthly.push(format!(
      "{} support patterns show the trends above - monitor for seasonal variations",
      ctx.period_end.format("%B")
    ));
    monthly.extend(out);
    out = monthly;
  }

  out
}

fn action_items(
  classification: &Classification,
  issues: &[IssueSummary],
  trends: Option<&TrendReport>,
  config: &Config,
  cadence: Cadence,
) -> Vec<String> {
  let total = classification.total_documents;
  let mut out = Vec::new();

  if cadence == Cadence::Monthly
    && issues
      .iter()
      .any(|i| i.severity_label == SeverityLabel::Critical)
  {
    out.push("Review all critical issues for potential product/documentation improvements".into());
  }

  for (name, stats) in classification.ranked() {
    if percent(stats.documents_with_category, total) > config.coverage_action_ratio * 100.0 {
      out.push(format!(
        "Create/update knowledge base article for {} (high volume)",
        name
      ));
    }
  }

  for issue in issues {
    let critical = issue.severity_label == SeverityLabel::Critical && issue.matched_count > 0;
    if critical || issue.status == IssueStatus::Escalation {
      out.push(format!(
        "Escalate {} to engineering team immediately",
        issue.issue_id
      ));
      out.push(format!(
        "Prepare customer communication for {} ({} affected)",
        issue.issue_name, issue.matched_count
      ));
    } else if issue.severity_label == SeverityLabel::High
      && issue.matched_count > config.high_label_monitor_count
    {
      out.push(format!(
        "Monitor {} - consider hotfix if reports continue",
        issue.issue_id
      ));
    }
  }

  if let Some(trends) = trends {
    for name in trends.categories.keys() {
      let previous = trends.previous_mentions.get(name).copied();
      if TrendReport::exceeds(mentions(classification, name), previous, config.doubling_ratio) {
        out.push(format!(
          "Investigate root cause of {} spike (doubled from last {})",
          name,
          cadence.period_word()
        ));
      }
    }
  }

  if out.is_empty() {
    out.push("Continue monitoring support trends".into());
  }
  out
}
