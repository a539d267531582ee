use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use learner_grades::input::{load_gradebook, load_with_csv, Gradebook};
use learner_grades::{aggregate, report};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "learner-grades")]
#[command(about = "Weighted learner grades for a single assignment group", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a JSON gradebook (course, assignment group, submissions)
    Aggregate {
        #[arg(long, env = "GRADES_INPUT")]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Aggregate submissions exported as CSV against a course document
    Import {
        #[arg(long)]
        course: PathBuf,
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, env = "GRADES_INPUT")]
        input: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate { input, format } => {
            let gradebook = load_gradebook(&input)?;
            print_summaries(&gradebook, format)?;
        }
        Commands::Import { course, csv, format } => {
            let gradebook = load_with_csv(&course, &csv)?;
            print_summaries(&gradebook, format)?;
        }
        Commands::Report { input, out } => {
            let gradebook = load_gradebook(&input)?;
            let aggregation = aggregate(
                &gradebook.course,
                &gradebook.assignment_group,
                &gradebook.submissions,
            )?;
            let report = report::build_report(
                &gradebook.course,
                &gradebook.assignment_group,
                &aggregation,
                gradebook.rejected,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn print_summaries(gradebook: &Gradebook, format: Format) -> anyhow::Result<()> {
    let aggregation = aggregate(
        &gradebook.course,
        &gradebook.assignment_group,
        &gradebook.submissions,
    )?;

    info!(
        learners = aggregation.learners.len(),
        counted = aggregation.counted_count(),
        not_yet_due = aggregation.not_yet_due_count(),
        skipped = aggregation.skipped().count(),
        "Aggregation complete"
    );

    match format {
        Format::Table => print!(
            "{}",
            report::render_table(&gradebook.assignment_group, &aggregation.learners)
        ),
        Format::Json => println!("{}", serde_json::to_string_pretty(&aggregation.learners)?),
    }

    Ok(())
}
