use super::evaluate::EvaluationRequest;
use crate::core::io::fasta::FastaFile;
use crate::core::io::input_file::InputDocument;
use crate::core::models::job::{
    GenerationParams, GenerationSpec, JobHandle, JobName, JobSpec, JobStatus,
};
use crate::core::models::sequence::{ProteinSpec, SequenceRecord};
use crate::engine::collector::collect_generated_structures;
use crate::engine::context::{SubmitOutcome, WorkflowContext};
use crate::engine::error::EngineError;
use crate::engine::loader::{self, LoadError};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scheduler::CommandRunner;
use crate::engine::spec_builder::build_generation_spec;
use crate::engine::state::JobStage;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub const GENERATION_JOB_PREFIX: &str = "binder_gen";
pub const EVALUATION_LABEL: &str = "eval";

/// A target structure and the parameters to design binders against it with.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub job_name: JobName,
    pub target: SequenceRecord,
    pub target_structure: PathBuf,
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn generation_spec<R>(&self, ctx: &WorkflowContext<'_, R>) -> GenerationSpec {
        build_generation_spec(
            &self.target_structure,
            self.params,
            self.job_name.clone(),
            ctx.config.generation.resources.clone(),
        )
    }
}

/// Loads the target of an input document and resolves its structure file.
///
/// `target_structure` overrides the document's `target_pdb`; one of the two must name
/// an existing file. The job is named `binder_gen_<job_name>`.
pub fn prepare(
    document: &InputDocument,
    target_structure: Option<PathBuf>,
    params: GenerationParams,
) -> Result<GenerationRequest, EngineError> {
    let job_name = JobName::new(format!(
        "{}_{}",
        GENERATION_JOB_PREFIX, document.job_name
    ))?;
    let target = loader::load(&document.target)?;
    let target_structure = target_structure
        .or_else(|| document.target.pdb_path.clone())
        .ok_or_else(|| LoadError::UnsupportedSource("target structure".to_string()))?;
    if !target_structure.is_file() {
        return Err(LoadError::NotFound(target_structure).into());
    }

    Ok(GenerationRequest {
        job_name,
        target,
        target_structure,
        params,
    })
}

/// The batch script the generation job would be submitted with.
pub fn render_script<R: CommandRunner>(
    ctx: &WorkflowContext<'_, R>,
    request: &GenerationRequest,
) -> Result<String, EngineError> {
    ctx.scheduler
        .render_generation_script(&request.generation_spec(ctx))
}

#[instrument(skip_all, name = "generate_submit", fields(job = %request.job_name))]
pub async fn submit_generation<R: CommandRunner>(
    ctx: &WorkflowContext<'_, R>,
    request: &GenerationRequest,
    force: bool,
) -> Result<SubmitOutcome, EngineError> {
    ctx.reporter.report(Progress::PhaseStart {
        name: "Submitting Generation",
    });
    ctx.reporter.stage(request.job_name.as_str(), JobStage::Loaded);
    info!(
        "Generating {} binder(s) of length {} against {:?} (guide scale {})",
        request.params.num_designs,
        request.params.contig_length,
        request.target_structure,
        request.params.guide_scale
    );

    let spec = JobSpec::Generation(request.generation_spec(ctx));
    ctx.reporter.stage(request.job_name.as_str(), JobStage::SpecBuilt);
    let outcome = ctx.submit_once(&spec, force).await?;
    ctx.reporter.report(Progress::PhaseFinish);
    Ok(outcome)
}

#[derive(Debug, Clone, Serialize)]
pub struct FanOutFailure {
    pub structure: PathBuf,
    pub job_name: JobName,
    pub error: String,
}

/// What a fan-out step did. Nothing is submitted until the generation job completes.
#[derive(Debug, Clone, Serialize)]
pub struct FanOutReport {
    pub generation_job: JobHandle,
    pub generation_status: JobStatus,
    pub structures: Vec<PathBuf>,
    pub submitted: Vec<JobHandle>,
    pub failures: Vec<FanOutFailure>,
    pub diagnostics: Vec<String>,
    /// FASTA file holding the sequences of every binder that could be read.
    pub binders_fasta: Option<PathBuf>,
}

impl FanOutReport {
    fn new(generation_job: JobHandle, generation_status: JobStatus) -> Self {
        Self {
            generation_job,
            generation_status,
            structures: Vec::new(),
            submitted: Vec::new(),
            failures: Vec::new(),
            diagnostics: Vec::new(),
            binders_fasta: None,
        }
    }

    /// The generation job finished but produced no structures.
    pub fn is_empty(&self) -> bool {
        self.generation_status == JobStatus::Completed && self.structures.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn diagnostic(&mut self, reporter: &ProgressReporter<'_>, message: String) {
        warn!("{}", message);
        reporter.report(Progress::Message(message.clone()));
        self.diagnostics.push(message);
    }
}

/// Submits one evaluation job per structure a completed generation job produced.
///
/// Each structure's binder chain is paired with `target`; the evaluation jobs are named
/// `<generation_job>_eval_<i>`. A binder that cannot be loaded or submitted is recorded
/// as a failure and the remaining binders are still processed.
///
/// # Errors
///
/// Only fails when the generation job is not in the ledger or the ledger is unreadable.
#[instrument(skip_all, name = "fan_out", fields(job = %generation_job))]
pub async fn fan_out<R: CommandRunner>(
    ctx: &WorkflowContext<'_, R>,
    generation_job: &JobName,
    target: &SequenceRecord,
    force: bool,
) -> Result<FanOutReport, EngineError> {
    let (handle, status) = ctx.poll_recorded(generation_job).await?;
    let mut report = FanOutReport::new(handle, status);

    if status != JobStatus::Completed {
        report.diagnostic(ctx.reporter, format!(
            "Generation job '{}' is {}; nothing to evaluate yet",
            generation_job, status
        ));
        return Ok(report);
    }

    let output_dir = &ctx.config.generation.output_dir;
    report.structures = collect_generated_structures(output_dir, generation_job.as_str());
    if report.structures.is_empty() {
        report.diagnostic(ctx.reporter, format!(
            "No generated binders found for '{}' in {}",
            generation_job,
            output_dir.display()
        ));
        return Ok(report);
    }
    info!(
        "Found {} generated binder(s) for '{}'",
        report.structures.len(),
        generation_job
    );

    ctx.reporter.report(Progress::PhaseStart {
        name: "Submitting Evaluations",
    });
    ctx.reporter.report(Progress::TaskStart {
        total_steps: report.structures.len() as u64,
    });

    let binder_chain = ctx.config.generation.binder_chain.clone();
    let mut binders = Vec::with_capacity(report.structures.len());
    for (index, structure) in report.structures.clone().into_iter().enumerate() {
        let job_name = generation_job.child(EVALUATION_LABEL, index);
        let spec = ProteinSpec::new(job_name.as_str())
            .with_pdb(&structure, Some(binder_chain.clone()));

        let submitted = match loader::load(&spec) {
            Ok(binder) => {
                let request = EvaluationRequest {
                    job_name: job_name.clone(),
                    target: target.clone(),
                    binder,
                };
                binders.push(request.binder.clone());
                ctx.submit_once(&request.job_spec(), force).await
            }
            Err(e) => Err(e.into()),
        };

        match submitted {
            Ok(outcome) => report.submitted.push(outcome.into_handle()),
            Err(e) => {
                warn!("Evaluation of {:?} failed: {}", structure, e);
                ctx.reporter
                    .report(Progress::Message(format!("{} not submitted: {}", job_name, e)));
                report.failures.push(FanOutFailure {
                    structure,
                    job_name,
                    error: e.to_string(),
                });
            }
        }
        ctx.reporter.report(Progress::TaskIncrement);
    }
    ctx.reporter.report(Progress::TaskFinish);
    ctx.reporter.report(Progress::PhaseFinish);

    if !binders.is_empty() {
        let path = output_dir.join(format!("binders_{}.fasta", generation_job));
        match write_binders_fasta(&path, &binders) {
            Ok(()) => report.binders_fasta = Some(path),
            Err(e) => report.diagnostic(ctx.reporter, format!(
                "Could not write binder sequences to {}: {}",
                path.display(),
                e
            )),
        }
    }

    info!(
        "Fan-out of '{}': {} submitted, {} failed",
        generation_job,
        report.submitted.len(),
        report.failures.len()
    );
    Ok(report)
}

fn write_binders_fasta(path: &Path, binders: &[SequenceRecord]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for binder in binders {
        FastaFile::write_record(binder.name(), binder.sequence(), &mut writer)
            .map_err(std::io::Error::other)?;
    }
    writer.flush()
}
