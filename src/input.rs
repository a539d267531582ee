use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};

use crate::models::{AssignmentGroup, Course, Submission, SubmissionRecord};

/// Course, group and the submissions that decoded cleanly.
#[derive(Debug, Clone)]
pub struct Gradebook {
    pub course: Course,
    pub assignment_group: AssignmentGroup,
    pub submissions: Vec<SubmissionRecord>,
    /// Entries dropped before aggregation because they could not be decoded.
    pub rejected: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseFile {
    pub course: Course,
    pub assignment_group: AssignmentGroup,
}

pub fn load_gradebook(path: &Path) -> anyhow::Result<Gradebook> {
    #[derive(Deserialize)]
    struct RawGradebook {
        course: Course,
        assignment_group: AssignmentGroup,
        #[serde(default)]
        submissions: Vec<serde_json::Value>,
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw: RawGradebook = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid gradebook document", path.display()))?;

    let mut submissions = Vec::with_capacity(raw.submissions.len());
    let mut rejected = 0usize;

    for (index, value) in raw.submissions.into_iter().enumerate() {
        match serde_json::from_value::<SubmissionRecord>(value) {
            Ok(record) => submissions.push(record),
            Err(err) => {
                warn!(index, "Problem processing submission: {err}");
                rejected += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        submissions = submissions.len(),
        rejected,
        "Gradebook loaded"
    );

    Ok(Gradebook {
        course: raw.course,
        assignment_group: raw.assignment_group,
        submissions,
        rejected,
    })
}

pub fn load_course_file(path: &Path) -> anyhow::Result<CourseFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid course document", path.display()))
}

/// Reads `learner_id,assignment_id,submitted_at,score` rows. Returns the
/// decoded records and the number of rows that had to be dropped.
pub fn load_submissions_csv(path: &Path) -> anyhow::Result<(Vec<SubmissionRecord>, usize)> {
    #[derive(Deserialize)]
    struct CsvRow {
        learner_id: u64,
        assignment_id: u64,
        submitted_at: String,
        score: f64,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = Vec::new();
    let mut rejected = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result {
            Ok(row) => records.push(SubmissionRecord {
                learner_id: row.learner_id,
                assignment_id: row.assignment_id,
                submission: Submission {
                    submitted_at: row.submitted_at,
                    score: row.score,
                },
            }),
            Err(err) => {
                warn!(row = index + 1, "Problem processing submission: {err}");
                rejected += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        submissions = records.len(),
        rejected,
        "Submissions imported"
    );

    Ok((records, rejected))
}

/// Combines a course document with a CSV export of submissions.
pub fn load_with_csv(course_path: &Path, csv_path: &Path) -> anyhow::Result<Gradebook> {
    let course_file = load_course_file(course_path)?;
    let (submissions, rejected) = load_submissions_csv(csv_path)?;

    Ok(Gradebook {
        course: course_file.course,
        assignment_group: course_file.assignment_group,
        submissions,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("learner_grades_{}_{name}", std::process::id()))
    }

    const COURSE_JSON: &str = r#"{
        "course": { "id": 451, "name": "Introduction to JavaScript" },
        "assignment_group": {
            "id": 12345,
            "name": "Fundamentals of JavaScript",
            "course_id": 451,
            "group_weight": 25,
            "assignments": [
                { "id": 1, "name": "Declare a Variable", "due_at": "2023-01-25", "points_possible": 50 }
            ]
        }
    }"#;

    #[test]
    fn gradebook_drops_undecodable_submissions() {
        let path = temp_path("gradebook.json");
        let document = r#"{
            "course": { "id": 451, "name": "Introduction to JavaScript" },
            "assignment_group": {
                "id": 12345,
                "name": "Fundamentals of JavaScript",
                "course_id": 451,
                "group_weight": 25,
                "assignments": []
            },
            "submissions": [
                { "learner_id": 125, "assignment_id": 1,
                  "submission": { "submitted_at": "2023-01-25", "score": 47 } },
                { "learner_id": 126, "assignment_id": 1 },
                { "learner_id": "abc", "assignment_id": 1,
                  "submission": { "submitted_at": "2023-01-25", "score": 10 } }
            ]
        }"#;
        fs::write(&path, document).unwrap();

        let gradebook = load_gradebook(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(gradebook.course.id, 451);
        assert_eq!(gradebook.assignment_group.id, 12345);
        assert_eq!(gradebook.submissions.len(), 1);
        assert_eq!(gradebook.submissions[0].learner_id, 125);
        assert_eq!(gradebook.rejected, 2);
    }

    #[test]
    fn gradebook_without_course_is_an_error() {
        let path = temp_path("no_course.json");
        fs::write(&path, r#"{ "submissions": [] }"#).unwrap();

        let result = load_gradebook(&path);
        fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn csv_rows_become_submission_records() {
        let course_path = temp_path("course.json");
        let csv_path = temp_path("submissions.csv");
        fs::write(&course_path, COURSE_JSON).unwrap();
        fs::write(
            &csv_path,
            "learner_id,assignment_id,submitted_at,score\n\
             125,1,2023-01-25,47\n\
             132,1,2023-01-24,not-a-number\n\
             132,1,2023-01-26,39.5\n",
        )
        .unwrap();

        let gradebook = load_with_csv(&course_path, &csv_path).unwrap();
        fs::remove_file(&course_path).ok();
        fs::remove_file(&csv_path).ok();

        assert_eq!(gradebook.assignment_group.assignments.len(), 1);
        assert_eq!(gradebook.submissions.len(), 2);
        assert_eq!(gradebook.rejected, 1);
        assert_eq!(gradebook.submissions[1].learner_id, 132);
        assert_eq!(gradebook.submissions[1].submission.score, 39.5);
        assert_eq!(gradebook.submissions[1].submission.submitted_at, "2023-01-26");
    }

    #[test]
    fn missing_csv_is_an_error() {
        assert!(load_submissions_csv(&temp_path("does_not_exist.csv")).is_err());
    }
}
