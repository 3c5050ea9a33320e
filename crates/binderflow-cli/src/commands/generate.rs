use super::{describe_outcome, load_input};
use crate::cli::GenerateArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use binderflow::core::models::job::GenerationParams;
use binderflow::engine::config::WorkflowConfig;
use binderflow::engine::context::WorkflowContext;
use binderflow::engine::error::EngineError;
use binderflow::engine::progress::ProgressReporter;
use binderflow::workflows::generate;
use tracing::info;

pub async fn run(args: GenerateArgs, config: &WorkflowConfig) -> Result<()> {
    let params = resolve_params(&args, config)?;
    let document = load_input(&args.input)?;
    let mut request = generate::prepare(&document, args.target_structure.clone(), params)?;
    if args.options.unique {
        request.job_name = request.job_name.with_timestamp_suffix();
        info!("Using unique job name '{}'", request.job_name);
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let ctx = WorkflowContext::new(config, &reporter);

    println!(
        "Designing {} binder(s) of {} residues against {}",
        request.params.num_designs,
        request.params.contig_length,
        request.target_structure.display()
    );

    if args.options.dry_run {
        println!("Dry run: batch script for job '{}'", request.job_name);
        print!("{}", generate::render_script(&ctx, &request)?);
        return Ok(());
    }

    let outcome = generate::submit_generation(&ctx, &request, args.options.force).await?;
    println!("{}", describe_outcome(&outcome));
    println!(
        "Designs will be written to {}\nOnce the job has finished, evaluate them with:\n  \
         binderflow fan-out {} {}",
        config.generation.output_dir.display(),
        args.input.display(),
        request.job_name
    );
    Ok(())
}

/// Command-line values take precedence over the configured defaults.
fn resolve_params(args: &GenerateArgs, config: &WorkflowConfig) -> Result<GenerationParams> {
    let defaults = config.generation.default_params;
    let params = GenerationParams::new(
        args.contig_length.unwrap_or(defaults.contig_length),
        args.num_designs.unwrap_or(defaults.num_designs),
        args.guide_scale.unwrap_or(defaults.guide_scale),
    )
    .map_err(EngineError::from)?;
    Ok(params)
}
