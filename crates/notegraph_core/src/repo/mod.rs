//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Repositories never validate user input; services do.

pub mod note_repo;
