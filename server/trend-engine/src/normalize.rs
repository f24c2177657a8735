//! Normalize inbound documents into canonical `Document`s and read JSON-lines batches.

use std::io::BufRead;

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::fingerprint;
use crate::types::{Document, InboundDocument};

/// Documents that made it into the batch, plus how many lines were dropped.
///
/// Skipped lines never reach any statistic: they are absent from both
/// numerator and denominator.
#[derive(Debug, Clone, Default)]
pub struct Batch {
  pub documents: Vec<Document>,
  pub skipped: usize,
}

/// Validate an inbound document and build its canonical form.
pub fn normalize(raw: &InboundDocument) -> Result<Document, EngineError> {
  if raw.subject.trim().is_empty() && raw.body.trim().is_empty() {
    return Err(EngineError::validation(
      "subject/body",
      "document has no text to classify",
    ));
  }

  let from = non_blank(raw.from.as_deref());
  let date = non_blank(raw.date.as_deref());

  let id = match non_blank(raw.id.as_deref()) {
    Some(id) => id,
    None => fingerprint::document_id(&raw.subject, &raw.body, from.as_deref(), date.as_deref()),
  };

  Ok(
    Document::new(id, raw.subject.as_str(), raw.body.as_str())
      .with_sender(from)
      .with_date(date),
  )
}

fn non_blank(value: Option<&str>) -> Option<String> {
  value
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}

/// Read one `InboundDocument` per line. Blank lines are ignored; lines that fail
/// to parse or validate are logged and skipped without aborting the batch.
pub fn read_documents<R: BufRead>(reader: R) -> Result<Batch, EngineError> {
  let mut batch = Batch::default();

  for (idx, line) in reader.lines().enumerate() {
    let line_no = idx + 1;
    let line = match line {
      Ok(l) => l,
      Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
        warn!(line = line_no, error = %e, "skipping document with invalid encoding");
        batch.skipped += 1;
        continue;
      }
      Err(e) => return Err(e.into()),
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let raw: InboundDocument = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        warn!(line = line_no, error = %e, "skipping undecodable document");
        batch.skipped += 1;
        continue;
      }
    };

    match normalize(&raw) {
      Ok(doc) => batch.documents.push(doc),
      Err(e) => {
        warn!(line = line_no, error = %e, "skipping invalid document");
        batch.skipped += 1;
      }
    }
  }

  debug!(
    documents = batch.documents.len(),
    skipped = batch.skipped,
    "document batch read"
  );
  Ok(batch)
}
