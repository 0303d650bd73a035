use notegraph_core::{normalize_plan, render_diagram, Goal, Plan, Task};
use serde_json::json;
use std::collections::HashSet;

fn task(id: &str, title: &str, depends_on: &[&str]) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        depends_on: depends_on.iter().map(|dep| dep.to_string()).collect(),
        ..Task::default()
    }
}

fn goal(id: &str, title: &str, tasks: Vec<Task>) -> Goal {
    Goal {
        id: id.to_string(),
        title: title.to_string(),
        tasks,
        ..Goal::default()
    }
}

fn sample_plan() -> Plan {
    Plan {
        summary: "Prepare the release".to_string(),
        goals: vec![
            goal(
                "G1",
                "Ship \"v2\"",
                vec![task("T1", "Freeze API", &[]), task("T2", "Tag build", &["T1"])],
            ),
            goal("", "Announce", vec![task("", "Write post", &["T2"])]),
        ],
    }
}

#[test]
fn rendering_is_deterministic() {
    let plan = sample_plan();
    assert_eq!(render_diagram(&plan), render_diagram(&plan));
}

#[test]
fn diagram_has_one_root_and_three_style_lines_at_the_end() {
    let diagram = render_diagram(&sample_plan());
    let lines: Vec<&str> = diagram.lines().collect();

    assert_eq!(lines[0], "graph TD");
    assert_eq!(
        lines
            .iter()
            .filter(|line| line.starts_with("ROOT[\""))
            .count(),
        1
    );
    assert_eq!(lines[1], "ROOT[\"Note Analysis\"]:::root");
    let class_defs: Vec<_> = lines
        .iter()
        .filter(|line| line.starts_with("classDef "))
        .collect();
    assert_eq!(class_defs.len(), 3);
    assert!(lines[lines.len() - 3..]
        .iter()
        .all(|line| line.starts_with("classDef ")));
    assert!(!diagram.ends_with('\n'));
}

#[test]
fn node_labels_never_contain_double_quotes() {
    let diagram = render_diagram(&sample_plan());
    assert!(diagram.contains("G1[\"Ship 'v2'\"]:::goal"));
    for line in diagram.lines() {
        if let Some(start) = line.find("[\"") {
            let rest = &line[start + 2..];
            let end = rest.find("\"]").expect("label must be closed");
            assert!(!rest[..end].contains('"'), "quote leaked in `{line}`");
        }
    }
}

#[test]
fn display_ids_are_unique_within_a_diagram() {
    let plan = Plan {
        summary: String::new(),
        goals: vec![
            goal("", "first", vec![task("T1", "a", &[]), task("T1", "b", &[])]),
            goal("", "second", vec![task("", "c", &[]), task("T1_2", "d", &[])]),
        ],
    };
    let diagram = render_diagram(&plan);

    let mut seen = HashSet::new();
    for line in diagram.lines() {
        if let Some((_, node)) = line.split_once(" --> ") {
            if let Some((id, _)) = node.split_once("[\"") {
                assert!(seen.insert(id.to_string()), "duplicate display id {id}");
            }
        }
    }
    assert!(seen.contains("G1"));
    assert!(seen.contains("G2"));
    assert!(seen.contains("T1"));
    assert!(seen.contains("T1_2"));
    assert!(seen.contains("T3"));
    assert!(seen.contains("T1_2_4"));
}

#[test]
fn dependency_edges_use_raw_ids_verbatim() {
    let plan = Plan {
        summary: String::new(),
        goals: vec![goal(
            "G1",
            "g",
            vec![
                task("T1", "a", &[]),
                task("T1", "b", &["T1", "external-step"]),
            ],
        )],
    };
    let diagram = render_diagram(&plan);

    assert!(diagram.contains("G1 --> T1_2[\"b\"]:::task"));
    assert!(diagram.contains("\nT1 --> T1_2\n"));
    assert!(diagram.contains("\nexternal-step --> T1_2\n"));
}

#[test]
fn end_to_end_payload_renders_goal_task_lines() {
    let payload = json!({
        "summary": "s".repeat(200),
        "goals": [{
            "id": "G1",
            "title": "Learn Rust",
            "tasks": [{ "id": "T1", "title": "Read book", "depends_on": [] }]
        }]
    });
    let plan = normalize_plan(&payload).unwrap();
    assert_eq!(plan.summary.chars().count(), 120);

    let diagram = render_diagram(&plan);
    assert!(diagram.contains("ROOT --> G1[\"Learn Rust\"]:::goal"));
    assert!(diagram.contains("G1 --> T1[\"Read book\"]:::task"));
}

#[test]
fn missing_goal_ids_are_assigned_in_order() {
    let payload = json!({
        "goals": [
            { "title": "one" },
            { "title": "two" }
        ]
    });
    let plan = normalize_plan(&payload).unwrap();
    let diagram = render_diagram(&plan);

    assert!(diagram.contains("ROOT --> G1[\"one\"]:::goal"));
    assert!(diagram.contains("ROOT --> G2[\"two\"]:::goal"));
}

#[test]
fn blank_ids_are_synthesized_and_task_follows_its_goal() {
    let payload = json!({
        "summary": "Learn X",
        "goals": [{
            "id": "",
            "title": "Learn X",
            "tasks": [{ "id": "", "title": "Read docs" }]
        }]
    });
    let plan = normalize_plan(&payload).unwrap();
    let diagram = render_diagram(&plan);
    let lines: Vec<&str> = diagram.lines().collect();

    let goal_line = lines
        .iter()
        .position(|line| *line == "ROOT --> G1[\"Learn X\"]:::goal")
        .expect("goal line present");
    assert_eq!(lines[goal_line + 1], "G1 --> T1[\"Read docs\"]:::task");
}

#[test]
fn task_titles_with_double_quotes_are_sanitized() {
    let plan = Plan {
        summary: String::new(),
        goals: vec![goal(
            "G1",
            "g",
            vec![task("T1", "Read \"The Book\"", &[])],
        )],
    };
    let diagram = render_diagram(&plan);

    assert!(diagram.contains("G1 --> T1[\"Read 'The Book'\"]:::task"));
    assert!(!diagram.contains("\"The Book\""));
}
