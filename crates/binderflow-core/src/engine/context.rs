use super::config::WorkflowConfig;
use super::error::EngineError;
use super::ledger::JobLedger;
use super::progress::ProgressReporter;
use super::scheduler::{CommandRunner, ProcessRunner, SchedulerClient};
use super::state::JobStage;
use crate::core::models::job::{JobHandle, JobName, JobSpec, JobStatus};
use tracing::info;

/// Outcome of a ledger-guarded submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(JobHandle),
    /// The job name was already recorded; nothing was sent to the scheduler.
    AlreadySubmitted(JobHandle),
}

impl SubmitOutcome {
    pub fn handle(&self) -> &JobHandle {
        match self {
            SubmitOutcome::Submitted(handle) | SubmitOutcome::AlreadySubmitted(handle) => handle,
        }
    }

    pub fn into_handle(self) -> JobHandle {
        match self {
            SubmitOutcome::Submitted(handle) | SubmitOutcome::AlreadySubmitted(handle) => handle,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

/// Everything a workflow step needs: configuration, the scheduler, the ledger and
/// the progress sink.
pub struct WorkflowContext<'a, R = ProcessRunner> {
    pub config: &'a WorkflowConfig,
    pub scheduler: SchedulerClient<R>,
    pub ledger: JobLedger,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> WorkflowContext<'a, ProcessRunner> {
    pub fn new(config: &'a WorkflowConfig, reporter: &'a ProgressReporter<'a>) -> Self {
        Self {
            config,
            scheduler: SchedulerClient::from_config(config),
            ledger: JobLedger::new(&config.state_dir),
            reporter,
        }
    }
}

impl<'a, R: CommandRunner> WorkflowContext<'a, R> {
    pub fn with_runner(
        config: &'a WorkflowConfig,
        runner: R,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            config,
            scheduler: SchedulerClient::new(config, runner),
            ledger: JobLedger::new(&config.state_dir),
            reporter,
        }
    }

    /// Submits a job unless its name is already in the ledger.
    ///
    /// With `force`, the job is submitted regardless and the ledger entry replaced.
    pub async fn submit_once(
        &self,
        spec: &JobSpec,
        force: bool,
    ) -> Result<SubmitOutcome, EngineError> {
        let job_name = spec.job_name();
        if !force {
            if let Some(existing) = self.ledger.find(job_name)? {
                info!(
                    "Job '{}' was already submitted as scheduler job {}; not resubmitting",
                    job_name, existing.scheduler_job_id
                );
                return Ok(SubmitOutcome::AlreadySubmitted(existing));
            }
        }

        let handle = self.scheduler.submit(spec).await?;
        self.ledger.record(&handle)?;
        self.reporter.stage(job_name.as_str(), JobStage::Submitted);
        Ok(SubmitOutcome::Submitted(handle))
    }

    /// Looks up a recorded job and queries its current status.
    pub async fn poll_recorded(
        &self,
        job_name: &JobName,
    ) -> Result<(JobHandle, JobStatus), EngineError> {
        let handle = self.ledger.get(job_name)?;
        let status = self.scheduler.poll(&handle.scheduler_job_id).await;
        self.reporter
            .stage(job_name.as_str(), JobStage::Submitted.observe(status));
        info!("Job '{}' ({}) is {}", job_name, handle.scheduler_job_id, status);
        Ok((handle, status))
    }
}
