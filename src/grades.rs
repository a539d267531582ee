use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::error::{AggregateError, DateField, SkipReason};
use crate::models::{
    Assignment, AssignmentGroup, AssignmentId, Average, Course, LearnerId, LearnerSummary,
    SubmissionRecord,
};

/// Share of an assignment's points deducted from a late submission.
pub const LATE_PENALTY_RATE: f64 = 0.1;

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub learners: Vec<LearnerSummary>,
    pub outcomes: Vec<SubmissionOutcome>,
}

impl Aggregation {
    pub fn counted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.disposition, Disposition::Counted { .. }))
            .count()
    }

    pub fn not_yet_due_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.disposition == Disposition::NotYetDue)
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&SubmissionOutcome, &SkipReason)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.disposition {
            Disposition::Skipped(reason) => Some((outcome, reason)),
            _ => None,
        })
    }
}

/// What happened to the submission at `index` in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub index: usize,
    pub learner_id: LearnerId,
    pub assignment_id: AssignmentId,
    pub disposition: Disposition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Counted {
        score: f64,
        percentage: f64,
        late: bool,
    },
    /// Submitted before the due date; not counted and not an error.
    NotYetDue,
    Skipped(SkipReason),
}

#[derive(Debug, Default)]
struct LearnerTotals {
    weighted_points: f64,
    total_points: f64,
    assignments: BTreeMap<AssignmentId, f64>,
}

struct Scored {
    score: f64,
    points_possible: f64,
    percentage: f64,
    late: bool,
}

pub fn aggregate(
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[SubmissionRecord],
) -> Result<Aggregation, AggregateError> {
    if group.course_id != course.id {
        return Err(AggregateError::InvalidGroup {
            group_id: group.id,
            group_course_id: group.course_id,
            course_id: course.id,
        });
    }

    let mut order: Vec<LearnerId> = Vec::new();
    let mut totals: HashMap<LearnerId, LearnerTotals> = HashMap::new();
    let mut outcomes = Vec::with_capacity(submissions.len());

    for (index, record) in submissions.iter().enumerate() {
        let disposition = match score_submission(group, record) {
            Ok(Some(scored)) => {
                let entry = totals.entry(record.learner_id).or_insert_with(|| {
                    order.push(record.learner_id);
                    LearnerTotals::default()
                });

                entry.weighted_points += scored.score;
                entry.total_points += scored.points_possible;
                entry
                    .assignments
                    .insert(record.assignment_id, scored.percentage);

                Disposition::Counted {
                    score: scored.score,
                    percentage: scored.percentage,
                    late: scored.late,
                }
            }
            Ok(None) => {
                debug!(
                    index,
                    learner_id = record.learner_id,
                    assignment_id = record.assignment_id,
                    "Submission not yet due"
                );
                Disposition::NotYetDue
            }
            Err(reason) => {
                warn!(
                    index,
                    learner_id = record.learner_id,
                    assignment_id = record.assignment_id,
                    "Problem processing submission: {reason}"
                );
                Disposition::Skipped(reason)
            }
        };

        outcomes.push(SubmissionOutcome {
            index,
            learner_id: record.learner_id,
            assignment_id: record.assignment_id,
            disposition,
        });
    }

    let mut learners = Vec::with_capacity(order.len());
    for learner_id in order {
        let Some(entry) = totals.remove(&learner_id) else {
            continue;
        };

        if entry.total_points <= 0.0 {
            warn!(learner_id, "Omitting learner with no points possible");
            continue;
        }

        learners.push(LearnerSummary {
            id: learner_id,
            avg: Average::from_ratio(entry.weighted_points / entry.total_points),
            assignments: entry.assignments,
        });
    }

    Ok(Aggregation { learners, outcomes })
}

/// `Ok(None)` means the submission predates the due date and is not counted.
fn score_submission(
    group: &AssignmentGroup,
    record: &SubmissionRecord,
) -> Result<Option<Scored>, SkipReason> {
    let assignment = group
        .assignment(record.assignment_id)
        .ok_or(SkipReason::UnknownAssignment {
            assignment_id: record.assignment_id,
        })?;

    let points_possible = checked_points_possible(assignment)?;
    let due_at = parse_date(&assignment.due_at, DateField::DueAt)?;
    let submitted_at = parse_date(&record.submission.submitted_at, DateField::SubmittedAt)?;

    if submitted_at < due_at {
        return Ok(None);
    }

    let raw_score = record.submission.score;
    if !raw_score.is_finite() {
        return Err(SkipReason::InvalidScore { score: raw_score });
    }

    let late = submitted_at > due_at;
    let score = if late {
        late_score(raw_score, points_possible)
    } else {
        raw_score
    };

    Ok(Some(Scored {
        score,
        points_possible,
        percentage: score / points_possible,
        late,
    }))
}

fn checked_points_possible(assignment: &Assignment) -> Result<f64, SkipReason> {
    let points = assignment.points_possible;
    if points.is_finite() && points > 0.0 {
        Ok(points)
    } else {
        Err(SkipReason::InvalidPointsPossible {
            assignment_id: assignment.id,
            points_possible: points,
        })
    }
}

/// Flat deduction of [`LATE_PENALTY_RATE`] of the available points, floored at zero.
pub fn late_score(score: f64, points_possible: f64) -> f64 {
    (score - points_possible * LATE_PENALTY_RATE).max(0.0)
}

/// Accepts a bare `YYYY-MM-DD` date (midnight UTC), a timestamp without an
/// offset (read as UTC) or an RFC 3339 timestamp.
pub fn parse_date(value: &str, field: DateField) -> Result<DateTime<Utc>, SkipReason> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| SkipReason::InvalidDate {
            field,
            value: value.to_string(),
        })
}
