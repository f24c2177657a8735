//! Support Trend Engine: deterministic, keyword-based (MVP).
//!
//! Classifies a batch of support documents into keyword categories, tracks
//! named issues with multi-field match criteria, scores the severity of each
//! matched document, compares aggregates with the previous period snapshot
//! and assembles a sectioned team report.
//!
//! No NLP, no DB, no network; pure computation over one finite batch. File
//! and stdin handling lives in the binary and the `export` helpers.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod issue;
pub mod keywords;
pub mod matcher;
pub mod normalize;
pub mod render;
pub mod report;
pub mod severity;
pub mod trend;
pub mod types;

pub use classify::Classification;
pub use config::{Cadence, Config};
pub use engine::{Engine, RunOutput};
pub use error::EngineError;
pub use issue::IssueDefinition;
pub use keywords::KeywordCategoryIndex;
pub use matcher::IssueMatchReport;
pub use report::{Report, ReportContext};
pub use trend::TrendReport;
pub use types::{Document, InboundDocument, PeriodSnapshot};
