//! Note-to-plan extraction and graph rendering pipeline.
//!
//! # Responsibility
//! - Allocate display ids (`ident`).
//! - Normalize weakly typed extraction payloads (`normalize`).
//! - Serialize plans into diagram text (`diagram`).
//! - Orchestrate one extraction round trip (`analyze`).
//!
//! # Invariants
//! - Every stage is synchronous and stateless across requests.
//! - Dependency edges reference semantic ids; node declarations use display
//!   ids. A disambiguated node can therefore leave an edge pointing at an id
//!   no node declares.

pub mod analyze;
pub mod diagram;
pub mod ident;
pub mod normalize;
