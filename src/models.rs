use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type CourseId = u64;
pub type AssignmentGroupId = u64;
pub type AssignmentId = u64;
pub type LearnerId = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentGroup {
    pub id: AssignmentGroupId,
    pub name: String,
    pub course_id: CourseId,
    /// Carried for completeness; aggregation does not weight by it.
    #[serde(default)]
    pub group_weight: f64,
    pub assignments: Vec<Assignment>,
}

impl AssignmentGroup {
    pub fn assignment(&self, id: AssignmentId) -> Option<&Assignment> {
        self.assignments.iter().find(|assignment| assignment.id == id)
    }
}

/// Reference data for one assignment. `due_at` is kept as supplied and parsed
/// per submission so a bad date only affects the records that touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub name: String,
    pub due_at: String,
    pub points_possible: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub learner_id: LearnerId,
    pub assignment_id: AssignmentId,
    pub submission: Submission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub submitted_at: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerSummary {
    pub id: LearnerId,
    pub avg: Average,
    pub assignments: BTreeMap<AssignmentId, f64>,
}

/// Ratio of earned to possible points, rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Average(f64);

impl Average {
    /// Rounds on the exact decimal value of `ratio`, ties away from zero, so a
    /// double stored just below a `.xx5` tie (33/40) rounds down.
    pub fn from_ratio(ratio: f64) -> Self {
        Self(round_to_cents(ratio))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    // 1074 fractional digits spell out any f64 exactly.
    let exact = format!("{:.1074}", value.abs());
    let Some((whole, fraction)) = exact.split_once('.') else {
        return value;
    };
    let digits = fraction.as_bytes();
    let (Some(&tenths), Some(&hundredths), Some(&thousandths)) =
        (digits.first(), digits.get(1), digits.get(2))
    else {
        return value;
    };

    let Ok(whole) = whole.parse::<f64>() else {
        return value;
    };
    let mut cents = whole * 100.0 + f64::from((tenths - b'0') * 10 + (hundredths - b'0'));
    if thousandths >= b'5' {
        cents += 1.0;
    }

    (cents / 100.0).copysign(value)
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
