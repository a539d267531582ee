use std::fmt::Write;

use crate::grades::Aggregation;
use crate::models::{AssignmentGroup, Course, LearnerSummary};

pub fn build_report(
    course: &Course,
    group: &AssignmentGroup,
    aggregation: &Aggregation,
    rejected: usize,
) -> String {
    let mut output = String::new();
    let skipped: Vec<_> = aggregation.skipped().collect();

    let _ = writeln!(output, "# Learner Grade Report");
    let _ = writeln!(
        output,
        "Generated for {} ({}) in course {} ({})",
        group.name, group.id, course.name, course.id
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Submissions");
    let _ = writeln!(output, "- counted: {}", aggregation.counted_count());
    let _ = writeln!(output, "- not yet due: {}", aggregation.not_yet_due_count());
    let _ = writeln!(output, "- skipped: {}", skipped.len());
    if rejected > 0 {
        let _ = writeln!(output, "- rejected at load: {rejected}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Learner Averages");

    if aggregation.learners.is_empty() {
        let _ = writeln!(output, "No learners with counted submissions.");
    } else {
        let _ = writeln!(output, "| Learner | Average | Assignments |");
        let _ = writeln!(output, "|---|---|---|");
        for learner in aggregation.learners.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {} |",
                learner.id,
                learner.avg,
                assignment_cells(group, learner)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Skipped Submissions");

    if skipped.is_empty() {
        let _ = writeln!(output, "No submissions were skipped.");
    } else {
        for (outcome, reason) in skipped {
            let _ = writeln!(
                output,
                "- #{} learner {} assignment {}: {}",
                outcome.index, outcome.learner_id, outcome.assignment_id, reason
            );
        }
    }

    output
}

/// Fixed-width summary for terminal output.
pub fn render_table(group: &AssignmentGroup, learners: &[LearnerSummary]) -> String {
    let mut output = String::new();

    if learners.is_empty() {
        let _ = writeln!(output, "No learners with counted submissions.");
        return output;
    }

    let _ = writeln!(output, "{:<12} {:>7}  assignments", "learner", "avg");
    for learner in learners {
        let _ = writeln!(
            output,
            "{:<12} {:>7}  {}",
            learner.id,
            learner.avg.to_string(),
            assignment_cells(group, learner)
        );
    }

    output
}

fn assignment_cells(group: &AssignmentGroup, learner: &LearnerSummary) -> String {
    learner
        .assignments
        .iter()
        .map(|(id, percentage)| {
            let label = group
                .assignment(*id)
                .map(|assignment| assignment.name.as_str())
                .unwrap_or("unknown");
            format!("{label} ({id}) {:.1}%", percentage * 100.0)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
