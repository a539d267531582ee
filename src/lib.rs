//! Per-learner grade aggregation for a single assignment group.

pub mod error;
pub mod grades;
pub mod input;
pub mod models;
pub mod report;

pub use error::{AggregateError, SkipReason};
pub use grades::{aggregate, Aggregation, Disposition, SubmissionOutcome};
