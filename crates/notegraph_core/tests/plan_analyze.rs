use notegraph_core::{
    ChatRole, ExtractionError, ExtractionOutcome, ExtractionRequest, ExtractionService,
    PlanExtractor,
};
use std::cell::RefCell;

const ERROR_DIAGRAM: &str = "graph TD\n ROOT[Error]\n";

enum Reply {
    Text(&'static str),
    Unavailable,
}

struct FakeExtraction {
    reply: Reply,
    seen: RefCell<Vec<ExtractionRequest>>,
}

impl FakeExtraction {
    fn answering(text: &'static str) -> Self {
        Self {
            reply: Reply::Text(text),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn unavailable() -> Self {
        Self {
            reply: Reply::Unavailable,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl ExtractionService for FakeExtraction {
    fn complete(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        self.seen.borrow_mut().push(request.clone());
        match self.reply {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Unavailable => Err(ExtractionError::Status {
                code: 503,
                body: "x".repeat(180),
            }),
        }
    }
}

#[test]
fn successful_extraction_returns_plan_and_diagram() {
    let service = FakeExtraction::answering(
        r#"{"summary":"Learn Rust","goals":[{"id":"G1","title":"Learn Rust","rationale":"career","tasks":[{"id":"T1","title":"Read book","details":"ch 1-3","depends_on":[],"estimate_hours":4}]}]}"#,
    );
    let extractor = PlanExtractor::new(&service);

    let result = extractor.analyze("Study", "I want to learn Rust");

    assert_eq!(result.summary, "Learn Rust");
    assert_eq!(result.goals.len(), 1);
    assert_eq!(result.goals[0].tasks[0].estimate_hours, Some(4.0));
    assert!(result.diagram.starts_with("graph TD\n"));
    assert!(result.diagram.contains("G1 --> T1[\"Read book\"]:::task"));

    let seen = service.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].messages[0].role, ChatRole::System);
    assert!(seen[0].messages[1].content.contains("I want to learn Rust"));
}

#[test]
fn fenced_json_output_is_accepted() {
    let service = FakeExtraction::answering("```json\n{\"summary\":\"ok\",\"goals\":[]}\n```");
    let result = PlanExtractor::new(&service).analyze("t", "c");

    assert_eq!(result.summary, "ok");
    assert!(result.goals.is_empty());
    assert_ne!(result.diagram, ERROR_DIAGRAM);
}

#[test]
fn unavailable_service_degrades_to_failure_result() {
    let service = FakeExtraction::unavailable();
    let result = PlanExtractor::new(&service).analyze("X", "Y");

    assert!(result.summary.starts_with("Analysis failed: "));
    let detail = &result.summary["Analysis failed: ".len()..];
    assert_eq!(detail.chars().count(), 100);
    assert!(result.goals.is_empty());
    assert_eq!(result.diagram, ERROR_DIAGRAM);
}

#[test]
fn invalid_json_degrades_to_failure_result() {
    let service = FakeExtraction::answering("Sure! Here is your plan: goals...");
    let result = PlanExtractor::new(&service).analyze("X", "Y");

    assert!(result.summary.starts_with("Analysis failed: "));
    assert!(result.summary.contains("not valid JSON"));
    assert!(result.goals.is_empty());
    assert_eq!(result.diagram, ERROR_DIAGRAM);
}

#[test]
fn non_object_payload_is_reported_as_failed_outcome() {
    let service = FakeExtraction::answering("[1, 2, 3]");
    let outcome = PlanExtractor::new(&service).extract_plan("X", "Y");

    match outcome {
        ExtractionOutcome::Failed(reason) => assert!(reason.contains("JSON object")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn empty_object_payload_yields_empty_plan_not_failure() {
    let service = FakeExtraction::answering("{}");
    let result = PlanExtractor::new(&service).analyze("X", "Y");

    assert_eq!(result.summary, "");
    assert!(result.goals.is_empty());
    assert!(result.diagram.contains("ROOT[\"Note Analysis\"]:::root"));
}
