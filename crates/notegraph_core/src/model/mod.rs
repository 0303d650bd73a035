//! Domain model for notes and analysis plans.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep storage records (`note`) apart from derived, never-persisted
//!   analysis output (`plan`).
//!
//! # Invariants
//! - Every stored note is identified by a stable `NoteId`.
//! - Plans are rebuilt per request and never mutated after construction.

pub mod note;
pub mod plan;
