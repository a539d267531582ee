use std::path::Path;

use learner_grades::input::load_gradebook;
use learner_grades::models::Course;
use learner_grades::report::build_report;
use learner_grades::{aggregate, AggregateError};

fn fixture() -> learner_grades::input::Gradebook {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_gradebook.json");
    load_gradebook(&path).expect("Failed to load fixture gradebook")
}

#[test]
fn test_sample_gradebook() {
    let gradebook = fixture();
    assert_eq!(gradebook.submissions.len(), 5);
    assert_eq!(gradebook.rejected, 0);

    let aggregation = aggregate(
        &gradebook.course,
        &gradebook.assignment_group,
        &gradebook.submissions,
    )
    .expect("group belongs to course");

    let json = serde_json::to_value(&aggregation.learners).unwrap();
    assert_eq!(json[0]["id"], 125);
    assert_eq!(json[0]["avg"], 0.94);
    assert_eq!(json[0]["assignments"].as_object().unwrap().len(), 1);
    assert_eq!(json[1]["id"], 132);
    assert_eq!(json[1]["avg"], 0.83);
    assert!(json[1]["assignments"]["1"].is_null());

    let report = build_report(
        &gradebook.course,
        &gradebook.assignment_group,
        &aggregation,
        gradebook.rejected,
    );
    assert!(report.contains("- not yet due: 3"));
    assert!(report.contains("| 132 | 0.83 | Write a Function (2) 83.3% |"));
}

#[test]
fn test_mismatched_course_fails() {
    let gradebook = fixture();
    let other = Course {
        id: 452,
        name: "Advanced JavaScript".to_string(),
    };

    let err = aggregate(&other, &gradebook.assignment_group, &gradebook.submissions).unwrap_err();
    assert!(matches!(err, AggregateError::InvalidGroup { course_id: 452, .. }));
}
