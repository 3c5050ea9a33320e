use super::collect::summarize;
use crate::cli::StatusArgs;
use crate::error::Result;
use binderflow::core::models::job::{JobHandle, JobKind, JobStatus};
use binderflow::engine::collector::collect_generated_structures;
use binderflow::engine::config::WorkflowConfig;
use binderflow::engine::context::WorkflowContext;
use binderflow::engine::progress::ProgressReporter;
use binderflow::workflows::evaluate;

pub async fn run(args: StatusArgs, config: &WorkflowConfig) -> Result<()> {
    let reporter = ProgressReporter::new();
    let ctx = WorkflowContext::new(config, &reporter);

    let handle = ctx.ledger.get(&args.job_name)?;
    match handle.kind {
        JobKind::Prediction => {
            let report = evaluate::check(&ctx, &args.job_name).await?;
            println!("{}", status_line(&report.handle, report.status));
            if report.status == JobStatus::Completed && !report.verified {
                println!("  Warning: the job left the queue without a confidence document.");
            }
            if let Some(result) = &report.result {
                print!("{}", summarize(result));
            }
        }
        JobKind::Generation => {
            let (handle, status) = ctx.poll_recorded(&args.job_name).await?;
            println!("{}", status_line(&handle, status));
            if status == JobStatus::Completed {
                let structures = collect_generated_structures(
                    &config.generation.output_dir,
                    handle.job_name.as_str(),
                );
                println!(
                    "  {} generated structure(s) in {}",
                    structures.len(),
                    config.generation.output_dir.display()
                );
            }
        }
    }
    Ok(())
}

fn status_line(handle: &JobHandle, status: JobStatus) -> String {
    format!(
        "{} job '{}' (scheduler job {}, submitted {}): {}",
        handle.kind,
        handle.job_name,
        handle.scheduler_job_id,
        handle.submitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
        status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::recorded_handle;

    #[test]
    fn status_line_names_job_and_scheduler_id() {
        assert_eq!(
            status_line(&recorded_handle(), JobStatus::Running),
            "prediction job 't1' (scheduler job 12345, submitted 2025-10-17 09:30:00 UTC): running"
        );
    }
}
