//! Severity heuristic for a single matched document: additive, order-independent, 0-20.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_SEVERITY: u8 = 20;

/// Symptom phrases that signal a device is effectively down.
pub const HIGH_SEVERITY_SYMPTOMS: [&str; 6] = [
  "freezing",
  "frozen",
  "unresponsive",
  "reboot required",
  "locked up",
  "not working",
];

pub const URGENCY_WORDS: [&str; 7] = [
  "urgent", "critical", "broken", "failed", "error", "issue", "problem",
];

pub const IMPACT_WORDS: [&str; 6] = [
  "production",
  "live",
  "customer",
  "client",
  "broadcast",
  "streaming",
];

pub const QUANTITY_WORDS: [&str; 3] = ["multiple", "several", "many"];

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Score one matched document.
///
/// `text` is the raw combined text (case preserved). Each distinct configured
/// term adds at most once regardless of how often it repeats.
///
/// - +1 base
/// - +3 per distinct priority keyword present
/// - +2 when primary + symptom matches reach 3
/// - +3 for 3+ symptoms, else +1 for exactly 2
/// - +2 per matched symptom naming a high-severity condition
/// - +1 per urgency word, +2 per impact word, +1 for any quantity word
/// - +1 when the raw text contains a digit sequence
pub fn score(
  text: &str,
  matched_primary: &[String],
  matched_symptoms: &[String],
  priority_keywords: &[String],
) -> u8 {
  let lowered = text.to_lowercase();
  let mut total: u32 = 1;

  let mut seen = HashSet::new();
  for keyword in priority_keywords {
    let needle = keyword.to_lowercase();
    if !needle.is_empty() && seen.insert(needle.clone()) && lowered.contains(&needle) {
      total += 3;
    }
  }

  if matched_primary.len() + matched_symptoms.len() >= 3 {
    total += 2;
  }

  if matched_symptoms.len() >= 3 {
    total += 3;
  } else if matched_symptoms.len() == 2 {
    total += 1;
  }

  for symptom in matched_symptoms {
    let symptom = symptom.to_lowercase();
    if HIGH_SEVERITY_SYMPTOMS.iter().any(|s| symptom.contains(s)) {
      total += 2;
    }
  }

  total += URGENCY_WORDS.iter().filter(|w| lowered.contains(*w)).count() as u32;
  total += 2 * IMPACT_WORDS.iter().filter(|w| lowered.contains(*w)).count() as u32;

  if QUANTITY_WORDS.iter().any(|w| lowered.contains(w)) {
    total += 1;
  }

  if DIGITS.is_match(text) {
    total += 1;
  }

  total.min(MAX_SEVERITY as u32) as u8
}
