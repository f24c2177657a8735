//! Core types for the trend engine (JSON contracts + internal models).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: what the ingestion side sends)
// ---------------------------------------------------------------------------

/// One inbound document line. Unknown fields are silently ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundDocument {
  #[serde(default, alias = "message_id")]
  pub id: Option<String>,
  #[serde(default)]
  pub subject: String,
  #[serde(default)]
  pub body: String,
  #[serde(default)]
  pub from: Option<String>,
  #[serde(default)]
  pub date: Option<String>,
}

// ---------------------------------------------------------------------------
// Document (normalized, immutable)
// ---------------------------------------------------------------------------

/// A support message ready for classification.
///
/// `combined_text` is always `subject + " " + body` with case preserved; matching
/// runs on a lower-cased copy, the original casing only feeds previews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
  id: String,
  subject: String,
  body: String,
  combined_text: String,
  from: Option<String>,
  date: Option<String>,
}

impl Document {
  pub fn new(id: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
    let subject = subject.into();
    let body = body.into();
    let combined_text = format!("{} {}", subject, body);
    Self {
      id: id.into(),
      subject,
      body,
      combined_text,
      from: None,
      date: None,
    }
  }

  pub fn with_sender(mut self, from: Option<String>) -> Self {
    self.from = from;
    self
  }

  pub fn with_date(mut self, date: Option<String>) -> Self {
    self.date = date;
    self
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn subject(&self) -> &str {
    &self.subject
  }

  pub fn body(&self) -> &str {
    &self.body
  }

  pub fn combined_text(&self) -> &str {
    &self.combined_text
  }

  pub fn from(&self) -> Option<&str> {
    self.from.as_deref()
  }

  pub fn date(&self) -> Option<&str> {
    self.date.as_deref()
  }

  /// Lower-cased copy of the combined text; the only form keyword matching sees.
  pub fn lowered(&self) -> String {
    self.combined_text.to_lowercase()
  }

  /// First `max_chars` characters of the combined text (char-boundary safe).
  pub fn preview(&self, max_chars: usize) -> String {
    self.combined_text.chars().take(max_chars).collect()
  }
}

// ---------------------------------------------------------------------------
// Category statistics
// ---------------------------------------------------------------------------

/// Mention/coverage statistics for one keyword category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
  pub total_mentions: u64,
  pub documents_with_category: u64,
  /// Keyword -> mentions, in configured keyword order, hits only.
  pub per_keyword_counts: IndexMap<String, u64>,
}

impl CategoryStats {
  /// Keywords by mention count descending (config order on ties), capped at `n`.
  pub fn top_keywords(&self, n: usize) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = self
      .per_keyword_counts
      .iter()
      .map(|(k, v)| (k.as_str(), *v))
      .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
  }
}

// ---------------------------------------------------------------------------
// Issue matching
// ---------------------------------------------------------------------------

/// One matched document for a tracked issue. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
  pub document_id: String,
  pub subject: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub from: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  pub matched_primary: Vec<String>,
  pub matched_symptoms: Vec<String>,
  pub matched_context: Vec<String>,
  pub mentioned_products: Vec<String>,
  /// Heuristic severity in [0, 20].
  pub severity_score: u8,
  /// Leading characters of the combined text, original casing.
  pub preview: String,
}

/// Alert status of a tracked issue for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
  Normal,
  Alert,
  Escalation,
}

impl IssueStatus {
  /// ESCALATION at or above the escalation threshold, ALERT at or above the alert threshold.
  pub fn classify(matched_count: usize, alert_threshold: u32, escalation_threshold: u32) -> Self {
    let count = matched_count as u64;
    if count >= escalation_threshold as u64 {
      Self::Escalation
    } else if count >= alert_threshold as u64 {
      Self::Alert
    } else {
      Self::Normal
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Normal => "NORMAL",
      Self::Alert => "ALERT",
      Self::Escalation => "ESCALATION",
    }
  }
}

// ---------------------------------------------------------------------------
// Trend types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
  Up,
  Down,
  Flat,
  New,
}

impl Direction {
  /// Indicator used in rendered reports.
  pub fn arrow(self) -> &'static str {
    match self {
      Self::Up => "↑",
      Self::Down => "↓",
      Self::Flat => "→",
      Self::New => "NEW",
    }
  }
}

/// Direction and magnitude of change against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendDelta {
  pub direction: Direction,
  pub percent_change: f64,
}

impl TrendDelta {
  pub fn new_baseline() -> Self {
    Self {
      direction: Direction::New,
      percent_change: 0.0,
    }
  }
}

// ---------------------------------------------------------------------------
// Period snapshot (persisted between runs by the caller)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCategory {
  pub total_mentions: u64,
  #[serde(alias = "emails_with_category")]
  pub documents_with_category: u64,
}

/// Aggregate statistics of one period, used as the next period's baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  #[serde(alias = "total_emails")]
  pub total_documents: u64,
  #[serde(default)]
  pub categories: IndexMap<String, SnapshotCategory>,
}
