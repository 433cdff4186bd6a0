//! Terminal rendering for jobs, progress and evaluations

use assay_core::domain::evaluation::Evaluation;
use assay_core::domain::job::{Job, JobStatus, Progress};
use assay_core::domain::stage::StageId;
use colored::*;

const BAR_WIDTH: usize = 30;

/// Label for a stage name; names the CLI does not know are shown verbatim
pub fn stage_label(stage: &str) -> String {
    stage
        .parse::<StageId>()
        .map(|id| id.label().to_string())
        .unwrap_or_else(|_| stage.to_string())
}

/// Fixed-width progress bar such as `[#######-------]`
pub fn render_bar(percent: u8, width: usize) -> String {
    let percent = usize::from(percent.min(100));
    let filled = (percent * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// One progress line
pub fn progress_line(progress: &Progress) -> String {
    format!(
        "{} {:>3}%  {}",
        render_bar(progress.percent, BAR_WIDTH).cyan(),
        progress.percent,
        stage_label(&progress.stage)
    )
}

/// Colorize job status for display
pub fn colorize_status(status: JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Created => status_str.yellow(),
        JobStatus::Processing => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}

pub fn print_job_summary(job: &Job) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Status:   {}", colorize_status(job.status));
    println!(
        "    Progress: {}% ({})",
        job.progress.percent,
        stage_label(&job.progress.stage)
    );
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

pub fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.to_string().cyan());
    println!("  Status:    {}", colorize_status(job.status));
    println!("  Locale:    {}", job.locale);
    println!("  Progress:  {}", progress_line(&job.progress));
    println!("  Created:   {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated:   {}", job.updated_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }

    if let Some(evaluation) = &job.result {
        println!();
        print_evaluation(evaluation);
    }
}

/// Print an evaluation, one section per stage
pub fn print_evaluation(evaluation: &Evaluation) {
    println!("{}", "Evaluation:".bold());
    println!(
        "  Guidelines: {}   Locale: {}   Evaluated: {}",
        evaluation.guideline_version,
        evaluation.locale,
        evaluation.evaluated_at.format("%Y-%m-%d %H:%M:%S")
    );

    for entry in &evaluation.outputs {
        println!("\n  {} {}", "▸".cyan(), entry.stage.label().bold());
        match serde_json::to_string_pretty(&entry.output) {
            Ok(pretty) => {
                for line in pretty.lines() {
                    println!("    {}", line);
                }
            }
            Err(_) => println!("    {:?}", entry.output),
        }
    }
}
