//! Category -> keyword mappings used for general trend classification.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::info;

use crate::error::EngineError;

/// Ordered category -> keyword-list index. Category order is the tie-break
/// order for every ranking built on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCategoryIndex {
  categories: IndexMap<String, Vec<String>>,
}

impl KeywordCategoryIndex {
  /// Build an index from an explicit mapping, rejecting blank names/keywords.
  pub fn new(categories: IndexMap<String, Vec<String>>) -> Result<Self, EngineError> {
    let index = Self { categories };
    index.validate("keywords")?;
    Ok(index)
  }

  /// Parse the JSON object form `{ "<Category>": ["keyword", ...] }`.
  ///
  /// Duplicate category keys resolve last-write-wins.
  pub fn from_json_str(source_name: &str, json: &str) -> Result<Self, EngineError> {
    let categories: IndexMap<String, Vec<String>> = serde_json::from_str(json).map_err(|e| {
      EngineError::config(
        source_name,
        format!("expected an object of category -> [keyword]: {}", e),
      )
    })?;
    let index = Self { categories };
    index.validate(source_name)?;
    Ok(index)
  }

  /// Load from a JSON file. Unreadable or malformed files are config errors.
  pub fn load(path: &Path) -> Result<Self, EngineError> {
    let name = path.display().to_string();
    let raw = fs::read_to_string(path)
      .map_err(|e| EngineError::config(&name, format!("cannot read: {}", e)))?;
    let index = Self::from_json_str(&name, &raw)?;
    info!(path = %name, categories = index.len(), "loaded keyword categories");
    Ok(index)
  }

  /// Load from `path` when given and present; otherwise the built-in defaults.
  pub fn load_or_default(path: Option<&Path>) -> Result<Self, EngineError> {
    match path {
      Some(p) if p.exists() => Self::load(p),
      Some(p) => {
        info!(path = %p.display(), "keyword file not found, using default categories");
        Ok(Self::default())
      }
      None => Ok(Self::default()),
    }
  }

  /// Canonical serialized form (pretty JSON, category order preserved).
  pub fn to_json_string(&self) -> Result<String, EngineError> {
    Ok(serde_json::to_string_pretty(&self.categories)?)
  }

  pub fn save(&self, path: &Path) -> Result<(), EngineError> {
    fs::write(path, self.to_json_string()?)?;
    info!(path = %path.display(), "saved keyword categories");
    Ok(())
  }

  /// Insert or replace a category. Replacing keeps the original position.
  pub fn add_category(
    &mut self,
    name: impl Into<String>,
    keywords: Vec<String>,
  ) -> Result<(), EngineError> {
    let name = name.into();
    check_entry("keywords", &name, &keywords)?;
    self.categories.insert(name, keywords);
    Ok(())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
    self
      .categories
      .iter()
      .map(|(name, keywords)| (name.as_str(), keywords.as_slice()))
  }

  pub fn get(&self, category: &str) -> Option<&[String]> {
    self.categories.get(category).map(Vec::as_slice)
  }

  pub fn len(&self) -> usize {
    self.categories.len()
  }

  pub fn is_empty(&self) -> bool {
    self.categories.is_empty()
  }

  fn validate(&self, source_name: &str) -> Result<(), EngineError> {
    for (name, keywords) in &self.categories {
      check_entry(source_name, name, keywords)?;
    }
    Ok(())
  }
}

fn check_entry(source_name: &str, name: &str, keywords: &[String]) -> Result<(), EngineError> {
  if name.trim().is_empty() {
    return Err(EngineError::config(source_name, "category name must not be blank"));
  }
  if keywords.iter().any(|k| k.trim().is_empty()) {
    return Err(EngineError::config(
      source_name,
      format!("category {:?} contains a blank keyword", name),
    ));
  }
  Ok(())
}

impl Default for KeywordCategoryIndex {
  fn default() -> Self {
    let defaults: [(&str, &[&str]); 6] = [
      (
        "Connection Issues",
        &[
          "won't connect",
          "can't connect",
          "connection failed",
          "not connecting",
          "connection error",
          "network issue",
        ],
      ),
      (
        "Firmware",
        &["firmware", "update", "upgrade", "version", "flash", "software update"],
      ),
      (
        "PTZ Control",
        &["pan", "tilt", "zoom", "movement", "control", "preset"],
      ),
      (
        "Streaming",
        &[
          "stream",
          "streaming",
          "rtmp",
          "rtsp",
          "srt",
          "video quality",
          "latency",
          "buffering",
        ],
      ),
      (
        "Camera Models",
        &[
          "move 4k",
          "move se",
          "g2",
          "studio pro",
          "studio se",
          "studio 4k",
          "simpltrack",
          "simpletrack",
        ],
      ),
      (
        "Software",
        &[
          "ptzoptics app",
          "ip camera tool",
          "companion",
          "software",
          "cmp",
          "camera management platform",
          "1.4.1 app",
        ],
      ),
    ];

    let categories = defaults
      .iter()
      .map(|(name, keywords)| {
        (
          name.to_string(),
          keywords.iter().map(|k| k.to_string()).collect(),
        )
      })
      .collect();
    Self { categories }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_cover_six_categories_in_order() {
    let index = KeywordCategoryIndex::default();
    let names: Vec<&str> = index.iter().map(|(n, _)| n).collect();
    assert_eq!(
      names,
      vec![
        "Connection Issues",
        "Firmware",
        "PTZ Control",
        "Streaming",
        "Camera Models",
        "Software"
      ]
    );
    assert!(index.get("Streaming").unwrap().contains(&"rtsp".to_string()));
  }

  #[test]
  fn rejects_non_list_values() {
    let err = KeywordCategoryIndex::from_json_str("k.json", r#"{"Firmware": "firmware"}"#)
      .unwrap_err();
    assert!(err.is_config());
  }

  #[test]
  fn rejects_nested_or_non_string_keywords() {
    assert!(KeywordCategoryIndex::from_json_str("k.json", r#"{"A": [1, 2]}"#).is_err());
    assert!(KeywordCategoryIndex::from_json_str("k.json", r#"["a", "b"]"#).is_err());
    assert!(KeywordCategoryIndex::from_json_str("k.json", r#"{"A": [["x"]]}"#).is_err());
  }

  #[test]
  fn rejects_blank_keyword() {
    let err = KeywordCategoryIndex::from_json_str("k.json", r#"{"A": ["ok", "  "]}"#)
      .unwrap_err();
    assert!(err.to_string().contains("blank keyword"));
  }

  #[test]
  fn duplicate_category_keys_last_write_wins() {
    let index =
      KeywordCategoryIndex::from_json_str("k.json", r#"{"A": ["x"], "B": ["y"], "A": ["z"]}"#)
        .unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("A").unwrap(), &["z".to_string()]);
  }

  #[test]
  fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keywords.json");

    let mut index = KeywordCategoryIndex::default();
    index
      .add_category("Audio", vec!["no audio".into(), "audio delay".into()])
      .unwrap();
    index.save(&path).unwrap();

    let loaded = KeywordCategoryIndex::load(&path).unwrap();
    assert_eq!(loaded, index);
    let names: Vec<&str> = loaded.iter().map(|(n, _)| n).collect();
    assert_eq!(names.last(), Some(&"Audio"));
  }

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let index = KeywordCategoryIndex::load_or_default(Some(&path)).unwrap();
    assert_eq!(index, KeywordCategoryIndex::default());
  }

  #[test]
  fn unreadable_explicit_load_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = KeywordCategoryIndex::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(err.is_config());
  }
}
