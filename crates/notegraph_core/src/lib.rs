//! Core domain logic for NoteGraph.
//! This crate is the single source of truth for note storage and
//! note-to-plan analysis invariants.

pub mod config;
pub mod db;
pub mod extraction;
pub mod logging;
pub mod model;
pub mod plan;
pub mod repo;
pub mod service;

pub use config::{resolve_db_path, ExtractionConfig};
pub use extraction::{
    ChatCompletionsService, ChatMessage, ChatRole, ExtractionError, ExtractionRequest,
    ExtractionService,
};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::note::{note_id_text, parse_note_id, Note, NoteDraft, NoteId, NoteValidationError};
pub use model::plan::{AnalysisResult, Goal, Plan, Task};
pub use plan::analyze::{AnalyzeError, ExtractionOutcome, PlanExtractor};
pub use plan::diagram::render_diagram;
pub use plan::ident::{DiagramAllocators, IdAllocator};
pub use plan::normalize::{normalize_plan, NormalizeError};
pub use repo::note_repo::{NoteListQuery, NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::chat_service::reply as chat_reply;
pub use service::note_service::{NoteService, NoteServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Analyzes one note with the environment-configured extraction service.
///
/// Never fails: client construction errors produce the degraded result too.
pub fn analyze(title: &str, content: &str) -> AnalysisResult {
    match ChatCompletionsService::from_env() {
        Ok(service) => PlanExtractor::new(service).analyze(title, content),
        Err(err) => plan::analyze::failure_result(&err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
