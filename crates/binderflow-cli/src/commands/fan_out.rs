use super::load_input;
use crate::cli::FanOutArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use binderflow::engine::config::WorkflowConfig;
use binderflow::engine::context::WorkflowContext;
use binderflow::engine::error::EngineError;
use binderflow::engine::loader;
use binderflow::engine::progress::ProgressReporter;
use binderflow::workflows::generate::{self, FanOutReport};
use std::fmt::Write;
use tracing::{error, info};

pub async fn run(args: FanOutArgs, config: &WorkflowConfig) -> Result<()> {
    let document = load_input(&args.input)?;
    let target = loader::load(&document.target).map_err(EngineError::from)?;
    info!("Target '{}' has {} residues", target.name(), target.length());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let ctx = WorkflowContext::new(config, &reporter);

    let report = generate::fan_out(&ctx, &args.generation_job, &target, args.force).await?;
    print!("{}", summarize(&report));
    verdict(&report)
}

fn summarize(report: &FanOutReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Generation job '{}' (scheduler job {}): {}",
        report.generation_job.job_name,
        report.generation_job.scheduler_job_id,
        report.generation_status
    );
    if !report.structures.is_empty() {
        let _ = writeln!(out, "  {} generated structure(s)", report.structures.len());
    }
    for handle in &report.submitted {
        let _ = writeln!(
            out,
            "  + {} -> scheduler job {}",
            handle.job_name, handle.scheduler_job_id
        );
    }
    for failure in &report.failures {
        let _ = writeln!(
            out,
            "  x {} ({}): {}",
            failure.job_name,
            failure.structure.display(),
            failure.error
        );
    }
    for diagnostic in &report.diagnostics {
        let _ = writeln!(out, "  ! {}", diagnostic);
    }
    if let Some(path) = &report.binders_fasta {
        let _ = writeln!(out, "  Binder sequences written to {}", path.display());
    }
    out
}

fn verdict(report: &FanOutReport) -> Result<()> {
    if report.is_empty() {
        error!("Generation job '{}' produced no binders", report.generation_job.job_name);
        return Err(CliError::FanOut(format!(
            "generation job '{}' produced no binders",
            report.generation_job.job_name
        )));
    }
    if report.has_failures() {
        return Err(CliError::FanOut(format!(
            "{} of {} evaluation(s) could not be submitted",
            report.failures.len(),
            report.structures.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::recorded_handle;
    use binderflow::core::models::job::{JobName, JobStatus};
    use binderflow::workflows::generate::FanOutFailure;
    use std::path::PathBuf;

    fn report(status: JobStatus, structures: usize) -> FanOutReport {
        FanOutReport {
            generation_job: recorded_handle(),
            generation_status: status,
            structures: (0..structures)
                .map(|i| PathBuf::from(format!("out/binders_t1_{i}.pdb")))
                .collect(),
            submitted: Vec::new(),
            failures: Vec::new(),
            diagnostics: Vec::new(),
            binders_fasta: None,
        }
    }

    #[test]
    fn completed_generation_without_binders_exits_with_fan_out_code() {
        let err = verdict(&report(JobStatus::Completed, 0)).unwrap_err();
        assert!(matches!(err, CliError::FanOut(_)));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn unfinished_generation_is_not_a_failure() {
        assert!(verdict(&report(JobStatus::Running, 0)).is_ok());
    }

    #[test]
    fn partial_failures_still_list_successes() {
        let mut report = report(JobStatus::Completed, 2);
        report.submitted.push(recorded_handle());
        report.failures.push(FanOutFailure {
            structure: PathBuf::from("out/binders_t1_1.pdb"),
            job_name: JobName::new("t1_eval_1").unwrap(),
            error: "chain A not found".to_string(),
        });

        let text = summarize(&report);
        assert!(text.contains("+ t1 -> scheduler job 12345"));
        assert!(text.contains("x t1_eval_1 (out/binders_t1_1.pdb): chain A not found"));

        let err = verdict(&report).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Fan-out incomplete: 1 of 2 evaluation(s) could not be submitted"
        );
    }
}
