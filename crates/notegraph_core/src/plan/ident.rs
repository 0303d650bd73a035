//! Display identifier allocation for diagram nodes.
//!
//! # Responsibility
//! - Turn semantic goal/task ids into display ids unique within one
//!   rendering pass.
//!
//! # Invariants
//! - Empty candidates become `{prefix}{count + 1}`.
//! - A used candidate becomes `{candidate}_{count + 1}`.
//! - If that suffixed form is itself taken, the suffix number keeps
//!   increasing until an unused id is found.
//! - State never outlives one [`DiagramAllocators`] value.

use std::collections::HashSet;

pub const GOAL_PREFIX: &str = "G";
pub const TASK_PREFIX: &str = "T";

/// Per-namespace allocator.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    prefix: &'static str,
    used: HashSet<String>,
    count: usize,
}

impl IdAllocator {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            used: HashSet::new(),
            count: 0,
        }
    }

    /// Allocates a display id for `candidate`.
    pub fn allocate(&mut self, candidate: &str) -> String {
        let ordinal = self.count + 1;
        let base = if candidate.is_empty() {
            format!("{}{ordinal}", self.prefix)
        } else {
            candidate.to_string()
        };

        let allocated = if self.used.contains(&base) {
            let mut suffix = ordinal;
            let mut disambiguated = format!("{base}_{suffix}");
            while self.used.contains(&disambiguated) {
                suffix += 1;
                disambiguated = format!("{base}_{suffix}");
            }
            disambiguated
        } else {
            base
        };

        self.used.insert(allocated.clone());
        self.count += 1;
        allocated
    }
}

/// Goal and task allocators for one serialization pass.
#[derive(Debug, Clone)]
pub struct DiagramAllocators {
    pub goals: IdAllocator,
    pub tasks: IdAllocator,
}

impl DiagramAllocators {
    pub fn new() -> Self {
        Self {
            goals: IdAllocator::new(GOAL_PREFIX),
            tasks: IdAllocator::new(TASK_PREFIX),
        }
    }
}

impl Default for DiagramAllocators {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagramAllocators, IdAllocator, GOAL_PREFIX, TASK_PREFIX};

    #[test]
    fn empty_candidates_use_positional_prefix() {
        let mut goals = IdAllocator::new(GOAL_PREFIX);
        assert_eq!(goals.allocate(""), "G1");
        assert_eq!(goals.allocate(""), "G2");
        assert_eq!(goals.count, 2);
    }

    #[test]
    fn supplied_ids_are_kept_when_unused() {
        let mut tasks = IdAllocator::new(TASK_PREFIX);
        assert_eq!(tasks.allocate("setup"), "setup");
        assert_eq!(tasks.allocate("T9"), "T9");
    }

    #[test]
    fn repeated_candidate_gets_count_suffix() {
        let mut goals = IdAllocator::new(GOAL_PREFIX);
        assert_eq!(goals.allocate("G1"), "G1");
        assert_eq!(goals.allocate("G1"), "G1_2");
        assert_eq!(goals.allocate("G1"), "G1_3");
    }

    #[test]
    fn synthesized_id_colliding_with_supplied_one_is_disambiguated() {
        let mut goals = IdAllocator::new(GOAL_PREFIX);
        assert_eq!(goals.allocate("G2"), "G2");
        assert_eq!(goals.allocate(""), "G2_2");
    }

    #[test]
    fn taken_suffixed_form_advances_suffix() {
        let mut tasks = IdAllocator::new(TASK_PREFIX);
        assert_eq!(tasks.allocate("A"), "A");
        assert_eq!(tasks.allocate("A_3"), "A_3");
        assert_eq!(tasks.allocate("A"), "A_4");
        assert!(tasks.used.contains("A_4"));
    }

    #[test]
    fn namespaces_are_independent() {
        let mut allocators = DiagramAllocators::new();
        assert_eq!(allocators.goals.allocate("X"), "X");
        assert_eq!(allocators.tasks.allocate("X"), "X");
    }
}
