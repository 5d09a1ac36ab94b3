//! LedgerLens Core Library
//!
//! Shared functionality for the LedgerLens financial analysis tool:
//! - Database access and migrations (datasets, records, analyses, audit log)
//! - CSV import of financial records
//! - Pure aggregation: summaries, category breakdowns, daily trends, scores
//! - Context assembly and prompt rendering for narrative analysis
//! - Pluggable narrative backends (Ollama, OpenAI-compatible, mock)
//! - Analysis engine tying the above together

pub mod ai;
pub mod analysis;
pub mod analytics;
pub mod context;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod prompts;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIClient, MockBackend, NarrativeBackend, OllamaBackend, OpenAICompatibleBackend};
pub use analysis::{
    AnalysisEngine, AnalysisKind, AnalysisMetrics, AnalysisOutcome, AnalysisRequest,
    AnalysisResult, NarrativeStatus, StoredAnalysis,
};
pub use context::{build_analysis_context, AnalysisContext, ContextRecord};
pub use db::{AuditEntry, Database, RecordQuery};
pub use error::{Error, Result};
