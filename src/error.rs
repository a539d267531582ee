use thiserror::Error as ThisError;

use crate::models::{AssignmentGroupId, AssignmentId, CourseId};

///
/// AggregateError
///
/// Structural failure; the whole aggregation is abandoned.
///

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum AggregateError {
    #[error(
        "assignment group {group_id} belongs to course {group_course_id}, not course {course_id}"
    )]
    InvalidGroup {
        group_id: AssignmentGroupId,
        group_course_id: CourseId,
        course_id: CourseId,
    },
}

///
/// SkipReason
///
/// Why a single submission was left out of the totals.
///

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum SkipReason {
    #[error("assignment with id {assignment_id} not found")]
    UnknownAssignment { assignment_id: AssignmentId },

    #[error("invalid {field} date {value:?}")]
    InvalidDate { field: DateField, value: String },

    #[error("score {score} is not a finite number")]
    InvalidScore { score: f64 },

    #[error("assignment {assignment_id} has invalid points possible {points_possible}")]
    InvalidPointsPossible {
        assignment_id: AssignmentId,
        points_possible: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    DueAt,
    SubmittedAt,
}

impl std::fmt::Display for DateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DueAt => f.write_str("due_at"),
            Self::SubmittedAt => f.write_str("submitted_at"),
        }
    }
}
