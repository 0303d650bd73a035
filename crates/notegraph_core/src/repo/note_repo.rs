//! Note/tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide note CRUD persistence on top of the `notes` table.
//! - Own tag-link replacement with atomic semantics.
//!
//! # Invariants
//! - Note writes and their tag links commit in one transaction.
//! - Tag names are persisted exactly as the service normalized them.
//! - A note's tags load in the order they were supplied.
//! - List order is `updated_at DESC, id ASC`.

use crate::db::DbError;
use crate::model::note::{note_id_text, parse_note_id, Note, NoteId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    created_at,
    updated_at
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {}", note_id_text(*id)),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "note store is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "note store table `{table}` is missing column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage-level list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    /// Case-insensitive substring matched against title or content.
    pub text: Option<String>,
    /// Exact, case-sensitive tag match.
    pub tag: Option<String>,
}

/// Repository interface for note operations.
pub trait NoteRepository {
    /// Inserts one note with its tags and returns its id.
    fn create_note(&mut self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces title, content, tags and `updated_at` of an existing note.
    fn update_note(&mut self, note: &Note) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Hard-deletes one note; tag links cascade.
    fn delete_note(&mut self, id: NoteId) -> RepoResult<()>;
    /// Returns all tags still attached to at least one note, sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when migrations
    ///   have not been applied to `conn`.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&mut self, note: &Note) -> RepoResult<NoteId> {
        let id_text = note_id_text(note.id);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id_text.as_str(),
                note.title.as_str(),
                note.content.as_str(),
                note.created_at,
                note.updated_at,
            ],
        )?;
        replace_tags_in_tx(&tx, id_text.as_str(), &note.tags)?;
        tx.commit()?;
        Ok(note.id)
    }

    fn update_note(&mut self, note: &Note) -> RepoResult<()> {
        let id_text = note_id_text(note.id);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3,
                updated_at = max(?4, created_at)
             WHERE id = ?1;",
            params![
                id_text.as_str(),
                note.title.as_str(),
                note.content.as_str(),
                note.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }
        replace_tags_in_tx(&tx, id_text.as_str(), &note.tags)?;
        tx.commit()?;
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([note_id_text(id)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(tag) = query.tag.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM note_tags nt
                    INNER JOIN tags t ON t.id = nt.tag_id
                    WHERE nt.note_id = notes.id
                      AND t.name = ?
                )",
            );
            bind_values.push(Value::Text(tag.clone()));
        }
        sql.push_str(" ORDER BY updated_at DESC, id ASC;");

        // SQLite `lower()` only folds ASCII; substring matching happens here.
        let needle = query
            .text
            .as_deref()
            .map(str::to_lowercase)
            .filter(|value| !value.is_empty());

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let note = parse_note_row(self.conn, row)?;
            if let Some(needle) = needle.as_deref() {
                if !matches_text(&note, needle) {
                    continue;
                }
            }
            notes.push(note);
        }

        Ok(notes)
    }

    fn delete_note(&mut self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [note_id_text(id)])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_tags(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT t.name
             FROM tags t
             INNER JOIN note_tags nt ON nt.tag_id = t.id
             ORDER BY t.name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get::<_, String>(0)?);
        }
        Ok(tags)
    }
}

fn matches_text(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
}

fn parse_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let id = parse_note_id(&id_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid id value `{id_text}` in notes.id")))?;
    let tags = load_tags_for_note(conn, &id_text)?;
    Ok(Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        tags,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_tags_for_note(conn: &Connection, note_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM note_tags nt
         INNER JOIN tags t ON t.id = nt.tag_id
         WHERE nt.note_id = ?1
         ORDER BY nt.position ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get::<_, String>(0)?);
    }
    Ok(tags)
}

fn replace_tags_in_tx(tx: &Transaction<'_>, note_id: &str, tags: &[String]) -> RepoResult<()> {
    tx.execute("DELETE FROM note_tags WHERE note_id = ?1;", [note_id])?;
    for (position, tag) in tags.iter().enumerate() {
        tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [tag.as_str()])?;
        tx.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, tag_id, position)
             SELECT ?1, id, ?3
             FROM tags
             WHERE name = ?2;",
            params![note_id, tag.as_str(), position as i64],
        )?;
    }
    Ok(())
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let required: [(&'static str, &[&'static str]); 3] = [
        ("notes", &["id", "title", "content", "created_at", "updated_at"]),
        ("tags", &["id", "name"]),
        ("note_tags", &["note_id", "tag_id", "position"]),
    ];

    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
