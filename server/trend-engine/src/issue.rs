//! Issue definitions: multi-field keyword specs for tracking one named defect.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EngineError;

/// Severity label an operator assigns to a tracked issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SeverityLabel {
  Critical,
  High,
  Medium,
  Low,
  Unknown,
}

impl SeverityLabel {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_uppercase().as_str() {
      "CRITICAL" | "CRIT" => Some(Self::Critical),
      "HIGH" => Some(Self::High),
      "MEDIUM" | "MED" => Some(Self::Medium),
      "LOW" => Some(Self::Low),
      "UNKNOWN" => Some(Self::Unknown),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Critical => "CRITICAL",
      Self::High => "HIGH",
      Self::Medium => "MEDIUM",
      Self::Low => "LOW",
      Self::Unknown => "UNKNOWN",
    }
  }
}

impl Default for SeverityLabel {
  fn default() -> Self {
    Self::Unknown
  }
}

/// Labels are validated at load: a typo must not silently become UNKNOWN.
impl TryFrom<String> for SeverityLabel {
  type Error = String;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    Self::from_str_loose(&s).ok_or_else(|| {
      format!(
        "unknown severity label {:?} (CRITICAL|HIGH|MEDIUM|LOW|UNKNOWN)",
        s
      )
    })
  }
}

impl From<SeverityLabel> for String {
  fn from(label: SeverityLabel) -> Self {
    label.as_str().to_string()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueKeywords {
  #[serde(default)]
  pub primary: Vec<String>,
  #[serde(default)]
  pub symptoms: Vec<String>,
  #[serde(default)]
  pub context: Vec<String>,
}

/// Which keyword fields must hit for a document to count as a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriteria {
  #[serde(default)]
  pub require_primary: bool,
  #[serde(default)]
  pub require_symptom: bool,
  #[serde(default)]
  pub require_context: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingMetrics {
  #[serde(default = "default_alert_threshold")]
  pub alert_threshold: u32,
  #[serde(default = "default_escalation_threshold")]
  pub escalation_threshold: u32,
  #[serde(default)]
  pub priority_keywords: Vec<String>,
}

fn default_alert_threshold() -> u32 {
  5
}

fn default_escalation_threshold() -> u32 {
  10
}

impl Default for TrackingMetrics {
  fn default() -> Self {
    Self {
      alert_threshold: default_alert_threshold(),
      escalation_threshold: default_escalation_threshold(),
      priority_keywords: Vec::new(),
    }
  }
}

/// Typed issue configuration. Every list may be empty; a required field with an
/// empty list can never be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDefinition {
  pub issue_name: String,
  pub issue_id: String,
  #[serde(default, alias = "severity")]
  pub severity_label: SeverityLabel,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date_reported: Option<String>,
  #[serde(default)]
  pub keywords: IssueKeywords,
  #[serde(default)]
  pub exclude_keywords: Vec<String>,
  #[serde(default)]
  pub affected_products: Vec<String>,
  #[serde(default)]
  pub match_criteria: MatchCriteria,
  #[serde(default)]
  pub tracking_metrics: TrackingMetrics,
}

impl IssueDefinition {
  /// Parse and validate the JSON form.
  pub fn from_json_str(source_name: &str, json: &str) -> Result<Self, EngineError> {
    let def: Self = serde_json::from_str(json)
      .map_err(|e| EngineError::config(source_name, format!("invalid issue definition: {}", e)))?;
    def.validate(source_name)?;
    Ok(def)
  }

  pub fn load(path: &Path) -> Result<Self, EngineError> {
    let name = path.display().to_string();
    let raw = fs::read_to_string(path)
      .map_err(|e| EngineError::config(&name, format!("cannot read: {}", e)))?;
    let def = Self::from_json_str(&name, &raw)?;
    info!(path = %name, issue_id = %def.issue_id, "loaded issue definition");
    Ok(def)
  }

  pub fn save(&self, path: &Path) -> Result<(), EngineError> {
    fs::write(path, serde_json::to_string_pretty(self)?)?;
    info!(path = %path.display(), issue_id = %self.issue_id, "saved issue definition");
    Ok(())
  }

  /// Eager validation so matching never meets a half-formed definition.
  pub fn validate(&self, source_name: &str) -> Result<(), EngineError> {
    if self.issue_name.trim().is_empty() {
      return Err(EngineError::config(source_name, "issue_name must not be blank"));
    }
    if self.issue_id.trim().is_empty() {
      return Err(EngineError::config(source_name, "issue_id must not be blank"));
    }
    // The id names the per-issue output files.
    if self.issue_id.contains(['/', '\\']) || self.issue_id.contains("..") {
      return Err(EngineError::config(
        source_name,
        format!("issue_id {:?} must not contain path separators or '..'", self.issue_id),
      ));
    }

    let lists: [(&str, &[String]); 6] = [
      ("keywords.primary", &self.keywords.primary),
      ("keywords.symptoms", &self.keywords.symptoms),
      ("keywords.context", &self.keywords.context),
      ("exclude_keywords", &self.exclude_keywords),
      ("affected_products", &self.affected_products),
      (
        "tracking_metrics.priority_keywords",
        &self.tracking_metrics.priority_keywords,
      ),
    ];
    for (field, list) in lists {
      if list.iter().any(|k| k.trim().is_empty()) {
        return Err(EngineError::config(
          source_name,
          format!("{} contains a blank keyword", field),
        ));
      }
    }

    let metrics = &self.tracking_metrics;
    if metrics.alert_threshold > metrics.escalation_threshold {
      return Err(EngineError::config(
        source_name,
        format!(
          "alert_threshold ({}) exceeds escalation_threshold ({})",
          metrics.alert_threshold, metrics.escalation_threshold
        ),
      ));
    }

    let criteria = &self.match_criteria;
    let unsatisfiable = [
      (criteria.require_primary, self.keywords.primary.is_empty(), "primary"),
      (criteria.require_symptom, self.keywords.symptoms.is_empty(), "symptoms"),
      (criteria.require_context, self.keywords.context.is_empty(), "context"),
    ];
    for (required, empty, field) in unsatisfiable {
      if required && empty {
        warn!(
          issue_id = %self.issue_id,
          field,
          "required keyword list is empty; this issue can never match"
        );
      }
    }
    Ok(())
  }

  /// Sample definition written by the `template` command.
  pub fn template() -> Self {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Self {
      issue_name: "CMP Autotracking Failure After Update".into(),
      issue_id: "CMP-AT-2025-001".into(),
      severity_label: SeverityLabel::Critical,
      description: Some(
        "Camera Management Platform autotracking feature stopped working after firmware update"
          .into(),
      ),
      date_reported: Some("2025-01-27".into()),
      keywords: IssueKeywords {
        primary: strings(&[
          "cmp",
          "camera management platform",
          "autotracking",
          "auto tracking",
          "auto-tracking",
        ]),
        symptoms: strings(&[
          "autotracking not working",
          "autotracking stopped",
          "autotracking failed",
          "tracking not working",
          "won't track",
          "can't track",
          "tracking broken",
        ]),
        context: strings(&[
          "after update",
          "firmware update",
          "software update",
          "new version",
          "upgraded",
        ]),
      },
      exclude_keywords: strings(&["resolved", "fixed", "working now", "solved"]),
      affected_products: strings(&["cmp", "camera management platform", "pt20x", "pt30x", "pt12x"]),
      match_criteria: MatchCriteria {
        require_primary: true,
        require_symptom: true,
        require_context: false,
      },
      tracking_metrics: TrackingMetrics {
        alert_threshold: 5,
        escalation_threshold: 10,
        priority_keywords: strings(&["autotracking", "not working", "failed"]),
      },
    }
  }
}
