//! Stable identifiers for documents that arrive without one, and for reports.

/// Derive a stable document id from its content and metadata.
///
/// Key components: subject + body + sender + date. Uses blake3 so identical
/// messages always map to the same `doc-` id across runs.
pub fn document_id(subject: &str, body: &str, from: Option<&str>, date: Option<&str>) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(subject.as_bytes());
  hasher.update(b"|");
  hasher.update(body.as_bytes());
  hasher.update(b"|");
  hasher.update(from.unwrap_or_default().as_bytes());
  hasher.update(b"|");
  hasher.update(date.unwrap_or_default().as_bytes());
  let hex = hasher.finalize().to_hex();
  format!("doc-{}", &hex[..16])
}

/// Stable report id: cadence + period end + document ids in batch order.
pub fn report_id<'a>(cadence: &str, period_end: &str, document_ids: impl IntoIterator<Item = &'a str>) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(cadence.as_bytes());
  hasher.update(b"|");
  hasher.update(period_end.as_bytes());
  for id in document_ids {
    hasher.update(b"|");
    hasher.update(id.as_bytes());
  }
  let hex = hasher.finalize().to_hex();
  format!("rpt-{}", &hex[..16])
}
