//! Plan domain model produced by note analysis.
//!
//! # Responsibility
//! - Define the strongly typed goal/task graph used after normalization.
//! - Define the response envelope returned by `analyze`.
//!
//! # Invariants
//! - `Plan::summary` never exceeds [`SUMMARY_MAX_CHARS`] characters.
//! - Goal and task order is meaningful and never reordered.
//! - `Task::depends_on` entries are semantic ids and are not validated
//!   against existing tasks.

use serde::{Deserialize, Serialize};

/// Hard cap applied to the normalized summary.
pub const SUMMARY_MAX_CHARS: usize = 120;

/// One actionable step under a goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Semantic id supplied by extraction (may be empty).
    pub id: String,
    pub title: String,
    pub details: String,
    pub depends_on: Vec<String>,
    /// Effort estimate in hours.
    pub estimate_hours: Option<f64>,
}

/// One goal with its ordered tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Semantic id supplied by extraction (may be empty).
    pub id: String,
    pub title: String,
    pub rationale: String,
    pub tasks: Vec<Task>,
}

/// Normalized extraction result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub summary: String,
    pub goals: Vec<Goal>,
}

impl Plan {
    /// Total number of tasks across all goals.
    pub fn task_count(&self) -> usize {
        self.goals.iter().map(|goal| goal.tasks.len()).sum()
    }
}

/// Caller-visible result of one `analyze` round trip.
///
/// Serialized with exactly the keys `summary`, `goals` and `diagram`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub goals: Vec<Goal>,
    pub diagram: String,
}
