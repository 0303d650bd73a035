//! Flutter-facing FFI surface for NoteGraph.

pub mod api;
