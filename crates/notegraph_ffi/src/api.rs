//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Note ids cross the boundary as 32-char hex strings.
//! - `analyze_note` always returns a well-formed analysis.

use log::warn;
use notegraph_core::db::open_db;
use notegraph_core::{
    analyze, chat_reply as chat_reply_inner, core_version as core_version_inner,
    init_logging as init_logging_inner, note_id_text, parse_note_id, ping as ping_inner,
    resolve_db_path, AnalysisResult, Note, NoteDraft, NoteService, SqliteNoteRepository,
};
use std::path::PathBuf;
use std::sync::OnceLock;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Note projection returned to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        Self {
            id: note_id_text(note.id),
            title: note.title,
            content: note.content,
            tags: note.tags,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Single-note action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// `true` when the failure was a missing note (maps to HTTP 404 style).
    pub not_found: bool,
    pub note: Option<NoteItem>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>) -> Self {
        Self {
            ok: true,
            not_found: false,
            note,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>, not_found: bool) -> Self {
        Self {
            ok: false,
            not_found,
            note: None,
            message: message.into(),
        }
    }
}

/// List envelope for notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Sorted by `updated_at DESC`.
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// List envelope for tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsListResponse {
    pub ok: bool,
    /// Sorted by name.
    pub items: Vec<String>,
    pub message: String,
}

/// Goal projection for Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalItem {
    pub id: String,
    pub title: String,
    pub rationale: String,
    pub tasks: Vec<TaskItem>,
}

/// Task projection for Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub details: String,
    pub depends_on: Vec<String>,
    pub estimate_hours: Option<f64>,
}

/// Analysis envelope; failures are encoded in `summary`/`diagram`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeResponse {
    pub summary: String,
    pub goals: Vec<GoalItem>,
    pub diagram: String,
}

impl From<AnalysisResult> for AnalyzeResponse {
    fn from(result: AnalysisResult) -> Self {
        let goals = result
            .goals
            .into_iter()
            .map(|goal| GoalItem {
                id: goal.id,
                title: goal.title,
                rationale: goal.rationale,
                tasks: goal
                    .tasks
                    .into_iter()
                    .map(|task| TaskItem {
                        id: task.id,
                        title: task.title,
                        details: task.details,
                        depends_on: task.depends_on,
                        estimate_hours: task.estimate_hours,
                    })
                    .collect(),
            })
            .collect();
        Self {
            summary: result.summary,
            goals,
            diagram: result.diagram,
        }
    }
}

/// Creates one note.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Empty/over-long titles are rejected with a message; blank tags are
///   dropped.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: String, content: String, tags: Vec<String>) -> NoteActionResponse {
    let draft = NoteDraft {
        title,
        content,
        tags,
    };
    match with_note_service(|service| service.create_note(draft)) {
        Ok(note) => NoteActionResponse::success("Note created.", Some(note.into())),
        Err(err) => NoteActionResponse::failure(
            format!("note_create failed: {}", err.message),
            err.not_found,
        ),
    }
}

/// Gets one note by id.
#[flutter_rust_bridge::frb(sync)]
pub fn note_get(note_id: String) -> NoteActionResponse {
    let Some(id) = parse_note_id(&note_id) else {
        return NoteActionResponse::failure(format!("note not found: {note_id}"), true);
    };
    match with_note_service(|service| service.get_note(id)) {
        Ok(note) => NoteActionResponse::success("Note loaded.", Some(note.into())),
        Err(err) => NoteActionResponse::failure(
            format!("note_get failed: {}", err.message),
            err.not_found,
        ),
    }
}

/// Replaces title, content and tags of one note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(
    note_id: String,
    title: String,
    content: String,
    tags: Vec<String>,
) -> NoteActionResponse {
    let Some(id) = parse_note_id(&note_id) else {
        return NoteActionResponse::failure(format!("note not found: {note_id}"), true);
    };
    let draft = NoteDraft {
        title,
        content,
        tags,
    };
    match with_note_service(|service| service.update_note(id, draft)) {
        Ok(note) => NoteActionResponse::success("Note updated.", Some(note.into())),
        Err(err) => NoteActionResponse::failure(
            format!("note_update failed: {}", err.message),
            err.not_found,
        ),
    }
}

/// Deletes one note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(note_id: String) -> NoteActionResponse {
    let Some(id) = parse_note_id(&note_id) else {
        return NoteActionResponse::failure(format!("note not found: {note_id}"), true);
    };
    match with_note_service(|service| service.delete_note(id)) {
        Ok(()) => NoteActionResponse::success("Note deleted.", None),
        Err(err) => NoteActionResponse::failure(
            format!("note_delete failed: {}", err.message),
            err.not_found,
        ),
    }
}

/// Lists notes with optional substring query and tag filter.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(query: Option<String>, tag: Option<String>) -> NotesListResponse {
    match with_note_service(|service| service.list_notes(query, tag)) {
        Ok(notes) => {
            let items: Vec<NoteItem> = notes.into_iter().map(NoteItem::from).collect();
            let message = if items.is_empty() {
                "No notes.".to_string()
            } else {
                format!("Found {} note(s).", items.len())
            };
            NotesListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => NotesListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notes_list failed: {}", err.message),
        },
    }
}

/// Lists tags currently attached to notes.
#[flutter_rust_bridge::frb(sync)]
pub fn tags_list() -> TagsListResponse {
    tags_list_response(with_note_service(|service| service.list_tags()))
}

fn tags_list_response(result: Result<Vec<String>, ServiceFailure>) -> TagsListResponse {
    match result {
        Ok(items) => TagsListResponse {
            ok: true,
            message: format!("Found {} tag(s).", items.len()),
            items,
        },
        Err(err) => TagsListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("tags_list failed: {}", err.message),
        },
    }
}

/// Canned chat reply.
#[flutter_rust_bridge::frb(sync)]
pub fn chat_reply(message: String) -> String {
    chat_reply_inner(&message)
}

/// Analyzes a note into summary, goals and diagram.
///
/// # FFI contract
/// - Performs one blocking network call; do not run on the UI thread.
/// - Never fails; failures come back as the degraded analysis.
pub fn analyze_note(title: String, content: String) -> AnalyzeResponse {
    analyze(&title, &content).into()
}

struct ServiceFailure {
    message: String,
    not_found: bool,
}

impl From<notegraph_core::NoteServiceError> for ServiceFailure {
    fn from(err: notegraph_core::NoteServiceError) -> Self {
        let not_found = matches!(err, notegraph_core::NoteServiceError::NoteNotFound(_));
        Self {
            message: err.to_string(),
            not_found,
        }
    }
}

fn resolve_ffi_db_path() -> PathBuf {
    DB_PATH.get_or_init(resolve_db_path).clone()
}

fn with_note_service<T>(
    f: impl FnOnce(
        &mut NoteService<SqliteNoteRepository<'_>>,
    ) -> Result<T, notegraph_core::NoteServiceError>,
) -> Result<T, ServiceFailure> {
    let failure = |message: String| {
        warn!("event=ffi_note_store module=ffi status=error message={message}");
        ServiceFailure {
            message,
            not_found: false,
        }
    };
    let mut conn =
        open_db(resolve_ffi_db_path()).map_err(|err| failure(format!("DB open failed: {err}")))?;
    let repo = SqliteNoteRepository::try_new(&mut conn)
        .map_err(|err| failure(format!("note repo init failed: {err}")))?;
    let mut service = NoteService::new(repo);
    f(&mut service).map_err(ServiceFailure::from)
}

#[cfg(test)]
mod tests {
    use super::{
        chat_reply, core_version, init_logging, note_create, note_delete, note_get,
        note_update, notes_list, ping, tags_list, tags_list_response, AnalyzeResponse,
        ServiceFailure,
    };
    use notegraph_core::{AnalysisResult, Goal, Task};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn note_lifecycle_round_trips_through_ffi() {
        let token = unique_token("ffi-note");
        let created = note_create(
            format!("Title {token}"),
            "body".to_string(),
            vec!["FFI".to_string(), " ".to_string()],
        );
        assert!(created.ok, "{}", created.message);
        let note = created.note.expect("created note should be returned");
        assert_eq!(note.id.len(), 32);
        assert_eq!(note.tags, vec!["FFI".to_string()]);

        let listed = notes_list(Some(token.to_uppercase()), None);
        assert!(listed.ok, "{}", listed.message);
        assert!(listed.items.iter().any(|item| item.id == note.id));
        let tags = tags_list();
        assert!(tags.ok, "{}", tags.message);
        assert!(tags.items.contains(&"FFI".to_string()));

        let updated = note_update(
            note.id.clone(),
            "Renamed".to_string(),
            "new body".to_string(),
            Vec::new(),
        );
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.note.expect("updated note").title, "Renamed");

        let deleted = note_delete(note.id.clone());
        assert!(deleted.ok, "{}", deleted.message);

        let missing = note_get(note.id);
        assert!(!missing.ok);
        assert!(missing.not_found);
    }

    #[test]
    fn note_create_rejects_blank_title() {
        let response = note_create("   ".to_string(), String::new(), Vec::new());
        assert!(!response.ok);
        assert!(!response.not_found);
        assert!(response.message.contains("title"));
    }

    #[test]
    fn malformed_note_id_reports_not_found() {
        let response = note_delete("definitely-not-an-id".to_string());
        assert!(!response.ok);
        assert!(response.not_found);
    }

    #[test]
    fn tags_list_reports_store_failure_instead_of_empty_success() {
        let response = tags_list_response(Err(ServiceFailure {
            message: "DB open failed: unable to open database file".to_string(),
            not_found: false,
        }));
        assert!(!response.ok);
        assert!(response.items.is_empty());
        assert!(response.message.starts_with("tags_list failed: DB open failed"));
    }

    #[test]
    fn chat_reply_echoes_message() {
        assert!(chat_reply("hello".to_string()).contains("hello"));
    }

    #[test]
    fn analyze_response_projects_core_result() {
        let result = AnalysisResult {
            summary: "s".to_string(),
            goals: vec![Goal {
                id: "G1".to_string(),
                title: "Goal".to_string(),
                rationale: String::new(),
                tasks: vec![Task {
                    id: "T1".to_string(),
                    title: "Task".to_string(),
                    estimate_hours: Some(2.0),
                    ..Task::default()
                }],
            }],
            diagram: "graph TD".to_string(),
        };
        let response = AnalyzeResponse::from(result);
        assert_eq!(response.goals[0].tasks[0].estimate_hours, Some(2.0));
        assert_eq!(response.diagram, "graph TD");
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
