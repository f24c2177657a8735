//! Core engine: holds configuration and runs one batch through every pass.

use tracing::info;

use crate::classify::{self, Classification};
use crate::config::Config;
use crate::fingerprint;
use crate::issue::IssueDefinition;
use crate::keywords::KeywordCategoryIndex;
use crate::matcher::{self, IssueMatchReport};
use crate::report::{self, IssueSummary, Report, ReportContext};
use crate::trend::{self, TrendReport};
use crate::types::{Document, PeriodSnapshot};

/// Everything one run produces. The caller decides what to persist.
#[derive(Debug, Clone)]
pub struct RunOutput {
  pub classification: Classification,
  pub issue_reports: Vec<IssueMatchReport>,
  /// `None` when no previous snapshot was supplied.
  pub trends: Option<TrendReport>,
  pub report: Report,
  /// Baseline for the next period.
  pub snapshot: PeriodSnapshot,
}

/// The trend engine. Immutable once built; `run` has no side effects.
pub struct Engine {
  config: Config,
  index: KeywordCategoryIndex,
  issues: Vec<IssueDefinition>,
}

impl Engine {
  pub fn new(config: Config, index: KeywordCategoryIndex, issues: Vec<IssueDefinition>) -> Self {
    Self {
      config,
      index,
      issues,
    }
  }

  /// Default config and categories, no tracked issues.
  pub fn with_defaults() -> Self {
    Self::new(Config::default(), KeywordCategoryIndex::default(), Vec::new())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn index(&self) -> &KeywordCategoryIndex {
    &self.index
  }

  pub fn issues(&self) -> &[IssueDefinition] {
    &self.issues
  }

  /// Run a batch: classify, match every issue, compare against `previous`, assemble.
  ///
  /// One pass for classification plus one pass per issue definition.
  pub fn run(
    &self,
    documents: &[Document],
    previous: Option<&PeriodSnapshot>,
    ctx: ReportContext,
  ) -> RunOutput {
    let classification = classify::classify(documents, &self.index);

    let issue_reports: Vec<IssueMatchReport> = self
      .issues
      .iter()
      .map(|def| matcher::match_documents(documents, def, &self.config))
      .collect();

    let summaries: Vec<IssueSummary> = issue_reports
      .iter()
      .zip(&self.issues)
      .map(|(r, def)| IssueSummary::from_match(r, def))
      .collect();

    let trends = previous
      .map(|prev| trend::compare_snapshot(&classification, Some(prev), self.config.trend_flat_band));

    // Stable id: same cadence, period end and batch give the same report id.
    let period_end = ctx.period_end.format("%Y-%m-%d").to_string();
    let report_id = fingerprint::report_id(
      ctx.cadence.label(),
      &period_end,
      documents.iter().map(|d| d.id()),
    );
    let ctx = ctx.with_report_id(report_id);

    let report = report::assemble(
      &classification,
      &summaries,
      trends.as_ref(),
      &self.config,
      &ctx,
    );
    let snapshot = PeriodSnapshot::from_classification(&classification, Some(period_end));

    info!(
      report_id = %report.report_id,
      documents = classification.total_documents,
      categories = classification.categories.len(),
      issues = issue_reports.len(),
      compared = trends.is_some(),
      "run complete"
    );

    RunOutput {
      classification,
      issue_reports,
      trends,
      report,
      snapshot,
    }
  }
}
