//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/update/get/delete/list APIs.
//! - Validate titles and tidy tag input before persistence.
//! - Stamp `created_at` / `updated_at`.
//!
//! # Invariants
//! - `update_note` uses full replacement semantics (last write wins).
//! - Note list is always sorted by `updated_at DESC, id ASC`.
//! - Tag names keep their case; they are trimmed, blanks are dropped and
//!   exact duplicates collapse to the first occurrence.
//! - The tag filter is exact and case-sensitive.

use crate::model::note::{new_note_id, Note, NoteDraft, NoteId, NoteValidationError};
use crate::repo::note_repo::{NoteListQuery, NoteRepository, RepoError};
use log::info;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Draft failed title validation.
    Validation(NoteValidationError),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {}", id.simple()),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one note and returns the stored record.
    pub fn create_note(&mut self, draft: NoteDraft) -> Result<Note, NoteServiceError> {
        let (title, content, tags) = prepare_draft(draft)?;
        let now = now_epoch_ms();
        let note = Note {
            id: new_note_id(),
            title,
            content,
            tags,
            created_at: now,
            updated_at: now,
        };

        let id = self.repo.create_note(&note)?;
        info!(
            "event=note_create module=note_service status=ok note_id={} tags={}",
            id.simple(),
            note.tags.len()
        );
        self.read_back(id, "created note not found in read-back")
    }

    /// Replaces title, content and tags of an existing note.
    pub fn update_note(
        &mut self,
        id: NoteId,
        draft: NoteDraft,
    ) -> Result<Note, NoteServiceError> {
        let (title, content, tags) = prepare_draft(draft)?;
        let existing = self
            .repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        let note = Note {
            id,
            title,
            content,
            tags,
            created_at: existing.created_at,
            updated_at: now_epoch_ms().max(existing.created_at),
        };

        self.repo.update_note(&note)?;
        info!(
            "event=note_update module=note_service status=ok note_id={}",
            id.simple()
        );
        self.read_back(id, "updated note not found in read-back")
    }

    /// Gets one note by id.
    ///
    /// # Errors
    /// - `NoteNotFound` when no note has this id.
    pub fn get_note(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))
    }

    /// Hard-deletes one note.
    pub fn delete_note(&mut self, id: NoteId) -> Result<(), NoteServiceError> {
        self.repo.delete_note(id)?;
        info!(
            "event=note_delete module=note_service status=ok note_id={}",
            id.simple()
        );
        Ok(())
    }

    /// Lists notes with optional substring query and exact tag filter.
    ///
    /// Blank query/tag values are treated as absent. `tag` is trimmed, then
    /// compared case-sensitively.
    pub fn list_notes(
        &self,
        query: Option<String>,
        tag: Option<String>,
    ) -> Result<Vec<Note>, NoteServiceError> {
        let text = query
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let tag = tag.and_then(|value| normalize_tag(value.as_str()));
        let notes = self.repo.list_notes(&NoteListQuery { text, tag })?;
        Ok(notes)
    }

    /// Lists tags currently attached to notes.
    pub fn list_tags(&self) -> Result<Vec<String>, NoteServiceError> {
        Ok(self.repo.list_tags()?)
    }

    fn read_back(&self, id: NoteId, details: &'static str) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(details))
    }
}

fn prepare_draft(draft: NoteDraft) -> Result<(String, String, Vec<String>), NoteServiceError> {
    draft.validate()?;
    let tags = normalize_tags(&draft.tags);
    Ok((draft.title.trim().to_string(), draft.content, tags))
}

/// Trims one tag value; blank values yield `None`. Case is preserved.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims tags, drops blanks and removes exact duplicates, keeping the
/// first occurrence in input order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .filter_map(|tag| normalize_tag(tag))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, normalize_tags};

    #[test]
    fn normalize_tag_trims_and_keeps_case() {
        assert_eq!(normalize_tag("  Work "), Some("Work".to_string()));
        assert_eq!(normalize_tag("   "), None);
    }

    #[test]
    fn normalize_tags_keeps_case_variants_and_input_order() {
        let tags = vec![
            "Work".to_string(),
            "IMPORTANT".to_string(),
            " ".to_string(),
            "work".to_string(),
            "Work ".to_string(),
        ];
        assert_eq!(
            normalize_tags(&tags),
            vec![
                "Work".to_string(),
                "IMPORTANT".to_string(),
                "work".to_string()
            ]
        );
    }
}
