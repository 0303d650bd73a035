//! Mermaid-style diagram serialization for plans.
//!
//! # Responsibility
//! - Render a [`Plan`] into line-oriented, top-down directed graph text.
//!
//! # Invariants
//! - Output is a pure function of the plan: same plan, same bytes.
//! - Exactly one root node and exactly three `classDef` lines.
//! - Node labels never contain `"`; titles have them replaced with `'`.
//! - Node labels never contain line breaks; each becomes one space, so every
//!   node declaration stays on one line.
//! - Dependency edges use the raw semantic id, never a display id.

use crate::model::plan::Plan;
use crate::plan::ident::DiagramAllocators;

pub const DIAGRAM_HEADER: &str = "graph TD";
pub const ROOT_NODE_ID: &str = "ROOT";
pub const ROOT_LABEL: &str = "Note Analysis";

/// Fixed style declarations appended after all nodes and edges.
pub const STYLE_DECLARATIONS: [&str; 3] = [
    "classDef root fill:#1f2937,stroke:#111827,color:#ffffff",
    "classDef goal fill:#dbeafe,stroke:#2563eb,color:#1e3a8a",
    "classDef task fill:#ecfdf5,stroke:#059669,color:#064e3b",
];

/// Diagram returned when analysis fails.
pub const ERROR_DIAGRAM: &str = "graph TD\n ROOT[Error]\n";

/// Renders `plan`; display ids come from allocators owned by this call.
pub fn render_diagram(plan: &Plan) -> String {
    let mut allocators = DiagramAllocators::new();
    let mut lines = vec![
        DIAGRAM_HEADER.to_string(),
        node(ROOT_NODE_ID, ROOT_LABEL, "root"),
    ];

    for goal in &plan.goals {
        let goal_id = allocators.goals.allocate(&goal.id);
        lines.push(edge(ROOT_NODE_ID, &node(&goal_id, &goal.title, "goal")));

        for task in &goal.tasks {
            let task_id = allocators.tasks.allocate(&task.id);
            lines.push(edge(&goal_id, &node(&task_id, &task.title, "task")));

            for dependency in &task.depends_on {
                lines.push(edge(dependency, &task_id));
            }
        }
    }

    lines.extend(STYLE_DECLARATIONS.iter().map(|line| line.to_string()));
    lines.join("\n")
}

/// Replaces label delimiters and line breaks so titles cannot break out of
/// `["…"]` or split a node across lines.
pub fn sanitize_label(title: &str) -> String {
    title
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .replace('"', "'")
}

fn node(id: &str, title: &str, class: &str) -> String {
    format!("{id}[\"{}\"]:::{class}", sanitize_label(title))
}

fn edge(from: &str, to: &str) -> String {
    format!("{from} --> {to}")
}

#[cfg(test)]
mod tests {
    use super::{render_diagram, sanitize_label, STYLE_DECLARATIONS};
    use crate::model::plan::{Goal, Plan, Task};

    fn task(id: &str, title: &str, depends_on: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            depends_on: depends_on.iter().map(|dep| dep.to_string()).collect(),
            ..Task::default()
        }
    }

    #[test]
    fn empty_plan_renders_root_and_styles_only() {
        let diagram = render_diagram(&Plan::default());
        let mut expected = vec![
            "graph TD".to_string(),
            "ROOT[\"Note Analysis\"]:::root".to_string(),
        ];
        expected.extend(STYLE_DECLARATIONS.iter().map(|line| line.to_string()));
        assert_eq!(diagram, expected.join("\n"));
    }

    #[test]
    fn goals_and_tasks_render_in_plan_order() {
        let plan = Plan {
            summary: String::new(),
            goals: vec![Goal {
                id: "G1".to_string(),
                title: "Ship".to_string(),
                tasks: vec![task("T1", "Build", &[]), task("T2", "Release", &["T1"])],
                ..Goal::default()
            }],
        };

        let lines: Vec<String> = render_diagram(&plan).lines().map(str::to_string).collect();
        assert_eq!(lines[2], "ROOT --> G1[\"Ship\"]:::goal");
        assert_eq!(lines[3], "G1 --> T1[\"Build\"]:::task");
        assert_eq!(lines[4], "G1 --> T2[\"Release\"]:::task");
        assert_eq!(lines[5], "T1 --> T2");
        assert_eq!(lines[6], STYLE_DECLARATIONS[0]);
    }

    #[test]
    fn sanitize_label_swaps_double_quotes() {
        assert_eq!(sanitize_label(r#"say "hi""#), "say 'hi'");
    }

    #[test]
    fn sanitize_label_flattens_line_breaks() {
        assert_eq!(sanitize_label("one\ntwo\r\nthree\rfour"), "one two three four");
    }

    #[test]
    fn multi_line_task_title_stays_on_its_node_line() {
        let plan = Plan {
            summary: String::new(),
            goals: vec![Goal {
                id: "G1".to_string(),
                title: "Goal".to_string(),
                tasks: vec![task("T1", "first line\nsecond line", &[])],
                ..Goal::default()
            }],
        };
        let diagram = render_diagram(&plan);
        assert!(diagram
            .lines()
            .any(|line| line == "G1 --> T1[\"first line second line\"]:::task"));
        assert_eq!(diagram.lines().count(), 7);
    }
}
