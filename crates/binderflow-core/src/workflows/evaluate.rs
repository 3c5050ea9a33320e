use crate::core::io::input_file::InputDocument;
use crate::core::models::job::{JobHandle, JobName, JobSpec, JobStatus};
use crate::core::models::result::BindingResult;
use crate::core::models::sequence::SequenceRecord;
use crate::engine::collector;
use crate::engine::context::{SubmitOutcome, WorkflowContext};
use crate::engine::error::EngineError;
use crate::engine::loader::{self, LoadError};
use crate::engine::progress::Progress;
use crate::engine::scheduler::CommandRunner;
use crate::engine::spec_builder::{build_prediction_spec, render_prediction_document};
use crate::engine::state::JobStage;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// A target/binder pair ready to be evaluated.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub job_name: JobName,
    pub target: SequenceRecord,
    pub binder: SequenceRecord,
}

impl EvaluationRequest {
    pub fn job_spec(&self) -> JobSpec {
        JobSpec::Prediction(build_prediction_spec(
            &self.target,
            &self.binder,
            self.job_name.clone(),
        ))
    }

    /// The prediction input document exactly as it would be submitted.
    pub fn render_document(&self) -> Result<String, EngineError> {
        let spec =
            build_prediction_spec(&self.target, &self.binder, self.job_name.clone());
        render_prediction_document(&spec).map_err(|source| EngineError::Serialization {
            what: "prediction input document",
            source,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub handle: JobHandle,
    pub status: JobStatus,
    /// Whether the prediction tool's confidence document exists. A job that has left
    /// the queue without it most likely failed before writing results.
    pub verified: bool,
    pub result: Option<BindingResult>,
}

/// Loads both proteins of an input document.
///
/// # Errors
///
/// Fails with [`LoadError::UnsupportedSource`] if the document names no binder, and
/// with any error the loader reports for either protein.
pub fn prepare(document: &InputDocument) -> Result<EvaluationRequest, EngineError> {
    let job_name = JobName::new(document.job_name.as_str())?;
    let target = loader::load(&document.target)?;
    let binder_spec = document
        .binder
        .as_ref()
        .ok_or_else(|| LoadError::UnsupportedSource("binder".to_string()))?;
    let binder = loader::load(binder_spec)?;

    Ok(EvaluationRequest {
        job_name,
        target,
        binder,
    })
}

/// Builds and submits the prediction job for a request.
///
/// A job name already present in the ledger is not resubmitted unless `force` is set.
#[instrument(skip_all, name = "evaluate_submit", fields(job = %request.job_name))]
pub async fn submit<R: CommandRunner>(
    ctx: &WorkflowContext<'_, R>,
    request: &EvaluationRequest,
    force: bool,
) -> Result<SubmitOutcome, EngineError> {
    let reporter = ctx.reporter;
    reporter.report(Progress::PhaseStart {
        name: "Submitting Evaluation",
    });
    reporter.stage(request.job_name.as_str(), JobStage::Loaded);
    info!(
        "Evaluating binder '{}' ({} aa) against target '{}' ({} aa)",
        request.binder.name(),
        request.binder.length(),
        request.target.name(),
        request.target.length()
    );

    let spec = request.job_spec();
    reporter.stage(request.job_name.as_str(), JobStage::SpecBuilt);

    let outcome = ctx.submit_once(&spec, force).await?;
    reporter.report(Progress::PhaseFinish);
    Ok(outcome)
}

/// Polls a submitted evaluation job once and collects its results if it has finished.
#[instrument(skip_all, name = "evaluate_check", fields(job = %job_name))]
pub async fn check<R: CommandRunner>(
    ctx: &WorkflowContext<'_, R>,
    job_name: &JobName,
) -> Result<EvaluationReport, EngineError> {
    let (handle, status) = ctx.poll_recorded(job_name).await?;
    let output_root = ctx.config.prediction.output_dir_path();
    let verified = collector::has_completion_marker(&output_root, job_name.as_str());

    let result = if status == JobStatus::Completed {
        if !verified {
            warn!(
                "Job '{}' has left the queue but its confidence document is missing",
                job_name
            );
        }
        Some(collector::collect(&output_root, job_name.as_str()))
    } else {
        None
    };

    Ok(EvaluationReport {
        handle,
        status,
        verified,
        result,
    })
}

/// Collects a prediction job's results without consulting the scheduler.
pub fn collect<R>(ctx: &WorkflowContext<'_, R>, job_name: &JobName) -> BindingResult {
    collector::collect(&ctx.config.prediction.output_dir_path(), job_name.as_str())
}
