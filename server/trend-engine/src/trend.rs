//! Period-over-period trend comparison and snapshot persistence.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::classify::Classification;
use crate::error::EngineError;
use crate::types::{Direction, PeriodSnapshot, SnapshotCategory, TrendDelta};

/// Band (in percent) inside which a change counts as FLAT.
pub const FLAT_BAND: f64 = 5.0;

/// Compare a current value with its previous-period baseline.
///
/// Absent or zero baseline is NEW with a 0% change; otherwise FLAT when the
/// change is within ±5% inclusive.
pub fn compare(current: f64, previous: Option<f64>) -> TrendDelta {
  compare_with_band(current, previous, FLAT_BAND)
}

pub fn compare_with_band(current: f64, previous: Option<f64>, flat_band: f64) -> TrendDelta {
  let previous = match previous {
    Some(p) if p != 0.0 => p,
    _ => return TrendDelta::new_baseline(),
  };

  // Multiply before dividing so whole-number boundaries stay exact (105 vs 100 is 5.0).
  let percent_change = (current - previous) * 100.0 / previous;
  let direction = if percent_change > flat_band {
    Direction::Up
  } else if percent_change < -flat_band {
    Direction::Down
  } else {
    Direction::Flat
  };

  TrendDelta {
    direction,
    percent_change,
  }
}

/// Deltas for total volume and every current category's mention count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
  pub total_documents: TrendDelta,
  pub categories: IndexMap<String, TrendDelta>,
  /// Baseline figures the deltas were computed against; ratio thresholds
  /// compare raw counts, not rounded percentages.
  pub previous_total: Option<u64>,
  pub previous_mentions: IndexMap<String, u64>,
}

impl TrendReport {
  /// `current > previous * ratio`, false without a non-zero baseline.
  pub fn exceeds(current: u64, previous: Option<u64>, ratio: f64) -> bool {
    matches!(previous, Some(p) if p > 0 && current as f64 > p as f64 * ratio)
  }

  /// `current < previous * ratio`, false without a non-zero baseline.
  pub fn falls_below(current: u64, previous: Option<u64>, ratio: f64) -> bool {
    matches!(previous, Some(p) if p > 0 && (current as f64) < p as f64 * ratio)
  }
}

/// Compare a classification against an optional previous snapshot.
///
/// With no snapshot every delta is NEW. Categories absent from the snapshot
/// are NEW as well.
pub fn compare_snapshot(
  current: &Classification,
  previous: Option<&PeriodSnapshot>,
  flat_band: f64,
) -> TrendReport {
  let total_documents = compare_with_band(
    current.total_documents as f64,
    previous.map(|p| p.total_documents as f64),
    flat_band,
  );

  let mut categories = IndexMap::new();
  let mut previous_mentions = IndexMap::new();
  for (name, stats) in &current.categories {
    let prev = previous
      .and_then(|p| p.categories.get(name))
      .map(|c| c.total_mentions);
    if let Some(p) = prev {
      previous_mentions.insert(name.clone(), p);
    }
    categories.insert(
      name.clone(),
      compare_with_band(stats.total_mentions as f64, prev.map(|p| p as f64), flat_band),
    );
  }

  TrendReport {
    total_documents,
    categories,
    previous_total: previous.map(|p| p.total_documents),
    previous_mentions,
  }
}

impl PeriodSnapshot {
  /// Capture the aggregate part of a classification for the next period.
  pub fn from_classification(classification: &Classification, date: Option<String>) -> Self {
    let categories = classification
      .categories
      .iter()
      .map(|(name, stats)| {
        (
          name.clone(),
          SnapshotCategory {
            total_mentions: stats.total_mentions,
            documents_with_category: stats.documents_with_category,
          },
        )
      })
      .collect();

    Self {
      date,
      total_documents: classification.total_documents,
      categories,
    }
  }

  pub fn from_json_str(source_name: &str, json: &str) -> Result<Self, EngineError> {
    serde_json::from_str(json)
      .map_err(|e| EngineError::config(source_name, format!("invalid snapshot: {}", e)))
  }

  /// Load a previous snapshot. A missing file is not an error: it yields `None`.
  pub fn load_optional(path: &Path) -> Result<Option<Self>, EngineError> {
    if !path.exists() {
      info!(path = %path.display(), "no previous snapshot; all trends are NEW");
      return Ok(None);
    }
    let name = path.display().to_string();
    let raw = fs::read_to_string(path)
      .map_err(|e| EngineError::config(&name, format!("cannot read: {}", e)))?;
    let snapshot = Self::from_json_str(&name, &raw)?;
    info!(path = %name, total_documents = snapshot.total_documents, "loaded previous snapshot");
    Ok(Some(snapshot))
  }

  pub fn save(&self, path: &Path) -> Result<(), EngineError> {
    fs::write(path, serde_json::to_string_pretty(self)?)?;
    info!(path = %path.display(), "saved period snapshot");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::CategoryStats;

  #[test]
  fn five_percent_is_flat_boundary() {
    assert_eq!(compare(105.0, Some(100.0)).direction, Direction::Flat);
    assert_eq!(compare(105.0, Some(100.0)).percent_change, 5.0);
    assert_eq!(compare(106.0, Some(100.0)).direction, Direction::Up);
    assert_eq!(compare(95.0, Some(100.0)).direction, Direction::Flat);
    assert_eq!(compare(94.0, Some(100.0)).direction, Direction::Down);
  }

  #[test]
  fn zero_or_absent_baseline_is_new() {
    let delta = compare(10.0, Some(0.0));
    assert_eq!(delta.direction, Direction::New);
    assert_eq!(delta.percent_change, 0.0);
    assert_eq!(compare(10.0, None).direction, Direction::New);
  }

  #[test]
  fn drop_to_zero_is_down() {
    let delta = compare(0.0, Some(8.0));
    assert_eq!(delta.direction, Direction::Down);
    assert_eq!(delta.percent_change, -100.0);
  }

  fn classification(total: u64, cats: &[(&str, u64, u64)]) -> Classification {
    Classification {
      total_documents: total,
      categories: cats
        .iter()
        .map(|(n, m, d)| {
          (
            n.to_string(),
            CategoryStats {
              total_mentions: *m,
              documents_with_category: *d,
              per_keyword_counts: IndexMap::new(),
            },
          )
        })
        .collect(),
    }
  }

  #[test]
  fn snapshot_comparison_covers_every_category() {
    let previous = PeriodSnapshot::from_classification(
      &classification(100, &[("Firmware", 10, 8), ("Streaming", 20, 12)]),
      Some("2025-01-20".into()),
    );
    let current = classification(150, &[("Firmware", 30, 20), ("Streaming", 20, 11), ("Audio", 4, 4)]);

    let report = compare_snapshot(&current, Some(&previous), FLAT_BAND);
    assert_eq!(report.total_documents.direction, Direction::Up);
    assert_eq!(report.total_documents.percent_change, 50.0);
    assert_eq!(report.categories["Firmware"].percent_change, 200.0);
    assert_eq!(report.categories["Streaming"].direction, Direction::Flat);
    assert_eq!(report.categories["Audio"].direction, Direction::New);
    assert_eq!(report.previous_total, Some(100));
    assert_eq!(report.previous_mentions.get("Firmware"), Some(&10));
    assert_eq!(report.previous_mentions.get("Audio"), None);
  }

  #[test]
  fn ratio_checks_need_a_baseline() {
    assert!(!TrendReport::exceeds(120, Some(100), 1.2));
    assert!(TrendReport::exceeds(121, Some(100), 1.2));
    assert!(!TrendReport::falls_below(80, Some(100), 0.8));
    assert!(TrendReport::falls_below(79, Some(100), 0.8));
    assert!(!TrendReport::exceeds(5, Some(0), 1.2));
    assert!(!TrendReport::exceeds(5, None, 1.2));
  }

  #[test]
  fn no_snapshot_means_all_new() {
    let current = classification(3, &[("Firmware", 1, 1)]);
    let report = compare_snapshot(&current, None, FLAT_BAND);
    assert_eq!(report.total_documents.direction, Direction::New);
    assert!(report.categories.values().all(|d| d.direction == Direction::New));
  }

  #[test]
  fn snapshot_file_round_trip_and_absent_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("previous_week_data.json");
    assert_eq!(PeriodSnapshot::load_optional(&path).unwrap(), None);

    let snap = PeriodSnapshot::from_classification(
      &classification(12, &[("Firmware", 5, 3)]),
      Some("2025-01-27".into()),
    );
    snap.save(&path).unwrap();
    assert_eq!(PeriodSnapshot::load_optional(&path).unwrap(), Some(snap));
  }

  #[test]
  fn malformed_snapshot_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prev.json");
    std::fs::write(&path, "{\"categories\": []}").unwrap();
    let err = PeriodSnapshot::load_optional(&path).unwrap_err();
    assert!(err.is_config());
  }
}
