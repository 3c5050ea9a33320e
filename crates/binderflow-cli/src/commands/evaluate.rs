use super::collect::summarize;
use super::{describe_outcome, load_input};
use crate::cli::EvaluateArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use binderflow::core::models::job::{JobHandle, JobStatus};
use binderflow::engine::collector;
use binderflow::engine::config::WorkflowConfig;
use binderflow::engine::context::WorkflowContext;
use binderflow::engine::progress::ProgressReporter;
use binderflow::workflows::evaluate;
use tracing::{info, warn};

pub async fn run(args: EvaluateArgs, config: &WorkflowConfig) -> Result<()> {
    let document = load_input(&args.input)?;
    let mut request = evaluate::prepare(&document)?;
    if args.options.unique {
        request.job_name = request.job_name.with_timestamp_suffix();
        info!("Using unique job name '{}'", request.job_name);
    }

    println!(
        "Target: {} ({} aa)  Binder: {} ({} aa)",
        request.target.name(),
        request.target.length(),
        request.binder.name(),
        request.binder.length()
    );

    if args.options.dry_run {
        println!("Dry run: prediction input for job '{}'", request.job_name);
        println!("{}", request.render_document()?);
        return Ok(());
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let ctx = WorkflowContext::new(config, &reporter);

    let outcome = evaluate::submit(&ctx, &request, args.options.force).await?;
    println!("{}", describe_outcome(&outcome));

    let report = evaluate::check(&ctx, &request.job_name).await?;
    println!("Current status: {}", report.status);
    match (&report.result, report.status) {
        (Some(result), _) => print!("{}", summarize(result)),
        (None, JobStatus::Failed | JobStatus::Cancelled) => {
            warn!("Job '{}' ended as {}", request.job_name, report.status);
        }
        _ => {}
    }

    print!("{}", monitoring_hints(&report.handle, config));
    Ok(())
}

fn monitoring_hints(handle: &JobHandle, config: &WorkflowConfig) -> String {
    let id = &handle.scheduler_job_id;
    let result_dir = collector::result_dir(
        &config.prediction.output_dir_path(),
        handle.job_name.as_str(),
    );
    format!(
        "\nMonitor the job:\n  \
         {query} -j {id}\n  \
         scancel {id}\n  \
         tail -f {logs}/{job}*.out\n\
         Results will appear in {result}\n\
         When it has finished:\n  \
         binderflow collect {job}\n",
        query = config.scheduler.query_command,
        logs = config.prediction.output_dir_path().join("logs").display(),
        result = result_dir.display(),
        job = handle.job_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::recorded_handle;
    use binderflow::engine::config::WorkflowConfigBuilder;

    #[test]
    fn hints_reference_the_scheduler_job_and_result_dir() {
        let config = WorkflowConfigBuilder::new()
            .prediction_install_path("/opt/af3")
            .generation_install_path("/opt/rfd")
            .build()
            .unwrap();
        let hints = monitoring_hints(&recorded_handle(), &config);
        assert!(hints.contains("squeue -j 12345"));
        assert!(hints.contains("scancel 12345"));
        assert!(hints.contains("tail -f /opt/af3/af_output/logs/t1*.out"));
        assert!(hints.contains("/opt/af3/af_output/fold_t1"));
        assert!(hints.contains("binderflow collect t1"));
    }
}
