//! Affected-document CSV export and report file output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::EngineError;
use crate::types::MatchResult;

pub const EXPORT_HEADER: [&str; 8] = [
  "Subject",
  "From",
  "Date",
  "Severity Score",
  "Matched Keywords",
  "Matched Symptoms",
  "Products",
  "Preview",
];

/// Write one row per match, in the order given (severity-descending from the matcher).
pub fn write_affected_csv<W: Write>(writer: W, matches: &[MatchResult]) -> Result<(), EngineError> {
  let mut csv = csv::Writer::from_writer(writer);
  csv.write_record(EXPORT_HEADER)?;
  for m in matches {
    let score = m.severity_score.to_string();
    let keywords = m.matched_primary.join(", ");
    let symptoms = m.matched_symptoms.join(", ");
    let products = m.mentioned_products.join(", ");
    csv.write_record([
      m.subject.as_str(),
      m.from.as_deref().unwrap_or_default(),
      m.date.as_deref().unwrap_or_default(),
      score.as_str(),
      keywords.as_str(),
      symptoms.as_str(),
      products.as_str(),
      m.preview.as_str(),
    ])?;
  }
  csv.flush()?;
  Ok(())
}

pub fn export_affected_documents(path: &Path, matches: &[MatchResult]) -> Result<(), EngineError> {
  let file = File::create(path)?;
  write_affected_csv(file, matches)?;
  info!(path = %path.display(), rows = matches.len(), "exported affected documents");
  Ok(())
}

pub fn write_report(path: &Path, text: &str) -> Result<(), EngineError> {
  std::fs::write(path, text)?;
  info!(path = %path.display(), "report written");
  Ok(())
}
