//! Issue matching: scan a batch against one issue definition.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::classify::percent;
use crate::config::Config;
use crate::issue::IssueDefinition;
use crate::severity;
use crate::types::{Document, IssueStatus, MatchResult};

/// Matched subset plus per-field statistics for one issue over one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueMatchReport {
  pub issue_id: String,
  pub issue_name: String,
  pub total_documents: u64,
  pub matched_count: usize,
  pub match_percentage: f64,
  /// Keyword -> documents containing it (every non-excluded scanned document).
  pub primary_hits: IndexMap<String, u64>,
  pub symptom_hits: IndexMap<String, u64>,
  pub context_hits: IndexMap<String, u64>,
  pub product_mentions: IndexMap<String, u64>,
  pub excluded_count: u64,
  pub avg_severity: f64,
  pub high_severity_count: usize,
  pub critical_severity_count: usize,
  /// Severity descending; batch order on ties.
  pub matches: Vec<MatchResult>,
}

impl IssueMatchReport {
  pub fn status(&self, definition: &IssueDefinition) -> IssueStatus {
    let metrics = &definition.tracking_metrics;
    IssueStatus::classify(
      self.matched_count,
      metrics.alert_threshold,
      metrics.escalation_threshold,
    )
  }
}

/// Lower-cased needle list keeping the configured spelling for reporting.
/// Duplicate entries collapse to their first occurrence.
struct Terms<'a> {
  terms: Vec<(&'a str, String)>,
}

impl<'a> Terms<'a> {
  fn new(list: &'a [String]) -> Self {
    let mut terms: Vec<(&'a str, String)> = Vec::with_capacity(list.len());
    for original in list {
      let needle = original.to_lowercase();
      if !terms.iter().any(|(_, n)| *n == needle) {
        terms.push((original.as_str(), needle));
      }
    }
    Self { terms }
  }

  /// Configured terms present in `text`, in configured order.
  fn found_in(&self, text: &str) -> Vec<String> {
    self
      .terms
      .iter()
      .filter(|(_, needle)| text.contains(needle.as_str()))
      .map(|(original, _)| original.to_string())
      .collect()
  }

  fn any_in(&self, text: &str) -> bool {
    self.terms.iter().any(|(_, needle)| text.contains(needle.as_str()))
  }
}

fn tally(hits: &mut IndexMap<String, u64>, found: &[String]) {
  for term in found {
    *hits.entry(term.clone()).or_insert(0) += 1;
  }
}

/// Match every document of a batch against `definition`.
///
/// Exclusion wins over everything: an excluded document contributes to no
/// statistic except `excluded_count`. Non-required fields are recorded but
/// never gate inclusion. The result is a pure function of its inputs.
pub fn match_documents<'a, I>(
  documents: I,
  definition: &IssueDefinition,
  config: &Config,
) -> IssueMatchReport
where
  I: IntoIterator<Item = &'a Document>,
{
  let exclude = Terms::new(&definition.exclude_keywords);
  let primary = Terms::new(&definition.keywords.primary);
  let symptoms = Terms::new(&definition.keywords.symptoms);
  let context = Terms::new(&definition.keywords.context);
  let products = Terms::new(&definition.affected_products);
  let criteria = &definition.match_criteria;
  let priority = &definition.tracking_metrics.priority_keywords;

  let mut primary_hits = IndexMap::new();
  let mut symptom_hits = IndexMap::new();
  let mut context_hits = IndexMap::new();
  let mut product_mentions = IndexMap::new();
  let mut excluded_count = 0u64;
  let mut total_documents = 0u64;
  let mut matches: Vec<MatchResult> = Vec::new();

  for doc in documents {
    total_documents += 1;
    let text = doc.lowered();

    if exclude.any_in(&text) {
      excluded_count += 1;
      continue;
    }

    let matched_primary = primary.found_in(&text);
    let matched_symptoms = symptoms.found_in(&text);
    let matched_context = context.found_in(&text);
    let mentioned_products = products.found_in(&text);

    tally(&mut primary_hits, &matched_primary);
    tally(&mut symptom_hits, &matched_symptoms);
    tally(&mut context_hits, &matched_context);
    tally(&mut product_mentions, &mentioned_products);

    let is_match = (!criteria.require_primary || !matched_primary.is_empty())
      && (!criteria.require_symptom || !matched_symptoms.is_empty())
      && (!criteria.require_context || !matched_context.is_empty());
    if !is_match {
      continue;
    }

    let severity_score = severity::score(
      doc.combined_text(),
      &matched_primary,
      &matched_symptoms,
      priority,
    );

    matches.push(MatchResult {
      document_id: doc.id().to_string(),
      subject: doc.subject().to_string(),
      from: doc.from().map(str::to_string),
      date: doc.date().map(str::to_string),
      matched_primary,
      matched_symptoms,
      matched_context,
      mentioned_products,
      severity_score,
      preview: doc.preview(config.preview_chars),
    });
  }

  // Stable: equal scores keep batch order.
  matches.sort_by(|a, b| b.severity_score.cmp(&a.severity_score));

  let matched_count = matches.len();
  let score_sum: u64 = matches.iter().map(|m| m.severity_score as u64).sum();
  let avg_severity = if matched_count == 0 {
    0.0
  } else {
    score_sum as f64 / matched_count as f64
  };
  let high_severity_count = matches
    .iter()
    .filter(|m| m.severity_score >= config.high_severity_score)
    .count();
  let critical_severity_count = matches
    .iter()
    .filter(|m| m.severity_score >= config.critical_severity_score)
    .count();

  debug!(
    issue_id = %definition.issue_id,
    documents = total_documents,
    matched = matched_count,
    excluded = excluded_count,
    "issue match pass complete"
  );

  IssueMatchReport {
    issue_id: definition.issue_id.clone(),
    issue_name: definition.issue_name.clone(),
    total_documents,
    matched_count,
    match_percentage: percent(matched_count as u64, total_documents),
    primary_hits,
    symptom_hits,
    context_hits,
    product_mentions,
    excluded_count,
    avg_severity,
    high_severity_count,
    critical_severity_count,
    matches,
  }
}
