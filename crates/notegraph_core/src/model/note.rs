//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record stored by the note store.
//! - Validate caller input before it reaches persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `title` is non-blank and at most [`NOTE_TITLE_MAX_CHARS`] characters.
//! - `updated_at` is never earlier than `created_at`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum title length in characters (not bytes).
pub const NOTE_TITLE_MAX_CHARS: usize = 200;

/// Stable identifier for every stored note.
///
/// Rendered externally as 32-char lowercase hex without hyphens.
pub type NoteId = Uuid;

/// Validation failures for note input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Title exceeds the character limit.
    TitleTooLong { chars: usize, max: usize },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::TitleTooLong { chars, max } => {
                write!(f, "note title has {chars} characters; maximum is {max}")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// Caller-supplied note fields for create and full-replace update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    /// Builder-style tag assignment.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Checks title constraints.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank.
    /// - `TitleTooLong` when the title exceeds [`NOTE_TITLE_MAX_CHARS`].
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        let chars = self.title.chars().count();
        if chars > NOTE_TITLE_MAX_CHARS {
            return Err(NoteValidationError::TitleTooLong {
                chars,
                max: NOTE_TITLE_MAX_CHARS,
            });
        }
        Ok(())
    }
}

/// Stored note as returned by the note store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(with = "simple_uuid")]
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Normalized (trimmed, lowercase, deduplicated) tags sorted by name.
    pub tags: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Generates a fresh note id.
pub fn new_note_id() -> NoteId {
    Uuid::new_v4()
}

/// Parses either hex-only or hyphenated uuid text.
pub fn parse_note_id(value: &str) -> Option<NoteId> {
    Uuid::parse_str(value.trim()).ok()
}

/// Renders a note id in its external 32-char form.
pub fn note_id_text(id: NoteId) -> String {
    id.simple().to_string()
}

mod simple_uuid {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.simple().to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Uuid::parse_str(&raw).map_err(serde::de::Error::custom)
    }
}
