//! Engine configuration with sane defaults.

use serde::{Deserialize, Serialize};

/// Report cadence. Chooses default top-N, period length and wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
  Weekly,
  Monthly,
}

impl Cadence {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.to_ascii_lowercase().as_str() {
      "weekly" | "week" | "w" => Some(Self::Weekly),
      "monthly" | "month" | "m" => Some(Self::Monthly),
      _ => None,
    }
  }

  /// Categories shown in the ranked section when the caller does not override N.
  pub fn default_top_n(self) -> usize {
    match self {
      Self::Weekly => 5,
      Self::Monthly => 8,
    }
  }

  pub fn period_days(self) -> i64 {
    match self {
      Self::Weekly => 7,
      Self::Monthly => 30,
    }
  }

  /// "week" / "month", used in insight and status wording.
  pub fn period_word(self) -> &'static str {
    match self {
      Self::Weekly => "week",
      Self::Monthly => "month",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Weekly => "WEEKLY",
      Self::Monthly => "MONTHLY",
    }
  }
}

/// Tunable thresholds for trend detection, severity bucketing and report assembly.
#[derive(Debug, Clone)]
pub struct Config {
  /// |percent_change| at or below this is FLAT.
  pub trend_flat_band: f64,
  /// current / previous mentions above this ratio is reported as a spike insight.
  pub spike_ratio: f64,
  /// current / previous mentions above this ratio produces a root-cause action.
  pub doubling_ratio: f64,
  /// Volume above previous * this ratio produces an "increased" insight.
  pub volume_increase_ratio: f64,
  /// Volume below previous * this ratio produces a "decreased" insight.
  pub volume_decrease_ratio: f64,
  /// Document coverage (0..1) above which a category gets a knowledge-base action.
  pub coverage_action_ratio: f64,
  /// Severity score at or above which a match counts as high severity.
  pub high_severity_score: u8,
  /// Severity score at or above which a match counts as critical.
  pub critical_severity_score: u8,
  /// HIGH-labelled issues with more matches than this get a monitoring action.
  pub high_label_monitor_count: usize,
  /// Characters of combined text kept as a preview in exports.
  pub preview_chars: usize,
  /// Matched documents listed in the detailed issue report.
  pub detail_document_limit: usize,
  /// Keywords shown per ranked category.
  pub top_keywords_per_category: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      trend_flat_band: 5.0,
      spike_ratio: 1.5,
      doubling_ratio: 2.0,
      volume_increase_ratio: 1.2,
      volume_decrease_ratio: 0.8,
      coverage_action_ratio: 0.15,
      high_severity_score: 10,
      critical_severity_score: 15,
      high_label_monitor_count: 5,
      preview_chars: 200,
      detail_document_limit: 10,
      top_keywords_per_category: 3,
    }
  }
}
