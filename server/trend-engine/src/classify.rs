//! Category classification: per-category mention and coverage statistics.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::keywords::KeywordCategoryIndex;
use crate::types::{CategoryStats, Document};

/// Result of one classification pass over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
  pub total_documents: u64,
  /// Category -> stats, in index order.
  pub categories: IndexMap<String, CategoryStats>,
}

impl Classification {
  /// Categories by total mentions descending; index order on ties.
  pub fn ranked(&self) -> Vec<(&str, &CategoryStats)> {
    let mut ranked: Vec<(&str, &CategoryStats)> = self
      .categories
      .iter()
      .map(|(name, stats)| (name.as_str(), stats))
      .collect();
    ranked.sort_by(|a, b| b.1.total_mentions.cmp(&a.1.total_mentions));
    ranked
  }

  /// Share of documents (0..=100) carrying the category; 0 for an empty batch.
  pub fn coverage_percent(&self, category: &str) -> f64 {
    match self.categories.get(category) {
      Some(stats) => percent(stats.documents_with_category, self.total_documents),
      None => 0.0,
    }
  }
}

pub(crate) fn percent(part: u64, whole: u64) -> f64 {
  if whole == 0 {
    0.0
  } else {
    part as f64 / whole as f64 * 100.0
  }
}

/// Non-overlapping, left-to-right occurrence count of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> u64 {
  if needle.is_empty() {
    return 0;
  }
  haystack.matches(needle).count() as u64
}

/// Classify a batch against a keyword index in a single forward scan.
///
/// Every keyword of every category is counted on the lower-cased combined
/// text; a document counts once toward a category's coverage when any of its
/// keywords hit.
pub fn classify<'a, I>(documents: I, index: &KeywordCategoryIndex) -> Classification
where
  I: IntoIterator<Item = &'a Document>,
{
  // Keywords lower-cased once, stats seeded in index order. Keywords equal
  // after lower-casing collapse to the first spelling so one occurrence
  // counts once.
  let lowered: Vec<(&str, Vec<(&str, String)>)> = index
    .iter()
    .map(|(name, keywords)| {
      let mut needles: Vec<(&str, String)> = Vec::with_capacity(keywords.len());
      for k in keywords {
        let needle = k.to_lowercase();
        if !needles.iter().any(|(_, n)| *n == needle) {
          needles.push((k.as_str(), needle));
        }
      }
      (name, needles)
    })
    .collect();

  let mut categories: IndexMap<String, CategoryStats> = lowered
    .iter()
    .map(|(name, keywords)| {
      let per_keyword_counts = keywords.iter().map(|(k, _)| (k.to_string(), 0)).collect();
      (
        name.to_string(),
        CategoryStats {
          per_keyword_counts,
          ..Default::default()
        },
      )
    })
    .collect();

  let mut total_documents = 0u64;
  for doc in documents {
    total_documents += 1;
    let text = doc.lowered();

    for (name, keywords) in &lowered {
      let Some(stats) = categories.get_mut(*name) else {
        continue;
      };
      let mut hit = false;
      for (original, needle) in keywords {
        let count = count_occurrences(&text, needle);
        if count > 0 {
          hit = true;
          stats.total_mentions += count;
          *stats.per_keyword_counts.entry(original.to_string()).or_insert(0) += count;
        }
      }
      if hit {
        stats.documents_with_category += 1;
      }
    }
  }

  for stats in categories.values_mut() {
    stats.per_keyword_counts.retain(|_, count| *count > 0);
  }

  debug!(
    documents = total_documents,
    categories = categories.len(),
    "classification pass complete"
  );

  Classification {
    total_documents,
    categories,
  }
}
