use super::config::{GenerationToolConfig, PredictionToolConfig, SchedulerConfig, WorkflowConfig};
use super::error::EngineError;
use super::spec_builder::{
    build_batch_script, build_generation_command, generation_output_stem,
    render_prediction_document,
};
use crate::core::models::job::{
    GenerationSpec, JobHandle, JobName, JobSpec, JobStatus, PredictionSpec,
};
use chrono::Utc;
use phf::phf_map;
use std::fmt;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Executes scheduler commands.
///
/// An `Err` means the command could not be run to completion at all (spawn failure,
/// timeout); a command that ran and exited non-zero is an `Ok` with `success == false`.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = io::Result<CommandOutput>> + Send;
}

/// Runs commands as child processes, killing any that outlive the timeout.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("`{}` did not finish within {:?}", invocation, limit),
                    )
                })??,
            None => command.output().await?,
        };

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

static STATUS_CODES: phf::Map<&'static str, JobStatus> = phf_map! {
    "PD" => JobStatus::Pending,
    "PENDING" => JobStatus::Pending,
    "CF" => JobStatus::Pending,
    "CONFIGURING" => JobStatus::Pending,
    "R" => JobStatus::Running,
    "RUNNING" => JobStatus::Running,
    "CG" => JobStatus::Running,
    "COMPLETING" => JobStatus::Running,
    "CD" => JobStatus::Completed,
    "COMPLETED" => JobStatus::Completed,
    "F" => JobStatus::Failed,
    "FAILED" => JobStatus::Failed,
    "TO" => JobStatus::Failed,
    "TIMEOUT" => JobStatus::Failed,
    "NF" => JobStatus::Failed,
    "NODE_FAIL" => JobStatus::Failed,
    "OOM" => JobStatus::Failed,
    "OUT_OF_MEMORY" => JobStatus::Failed,
    "BF" => JobStatus::Failed,
    "BOOT_FAIL" => JobStatus::Failed,
    "DL" => JobStatus::Failed,
    "DEADLINE" => JobStatus::Failed,
    "PR" => JobStatus::Failed,
    "PREEMPTED" => JobStatus::Failed,
    "CA" => JobStatus::Cancelled,
    "CANCELLED" => JobStatus::Cancelled,
};

/// Maps a scheduler state code, compact or long form, to a [`JobStatus`].
pub fn normalize_status(code: &str) -> JobStatus {
    let code = code.trim().trim_end_matches('+').to_ascii_uppercase();
    STATUS_CODES
        .get(code.as_str())
        .copied()
        .unwrap_or(JobStatus::Unknown)
}

/// Submits prepared jobs to the batch scheduler and queries their state.
pub struct SchedulerClient<R = ProcessRunner> {
    prediction: PredictionToolConfig,
    generation: GenerationToolConfig,
    scheduler: SchedulerConfig,
    runner: R,
}

impl SchedulerClient<ProcessRunner> {
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self::new(
            config,
            ProcessRunner::new(config.scheduler.command_timeout),
        )
    }
}

impl<R: CommandRunner> SchedulerClient<R> {
    pub fn new(config: &WorkflowConfig, runner: R) -> Self {
        Self {
            prediction: config.prediction.clone(),
            generation: config.generation.clone(),
            scheduler: config.scheduler.clone(),
            runner,
        }
    }

    /// Writes the job's artifacts and hands it to the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if an artifact cannot be written and
    /// [`EngineError::Submission`] if the scheduler rejects the job or its
    /// acknowledgement carries no job id.
    pub async fn submit(&self, spec: &JobSpec) -> Result<JobHandle, EngineError> {
        let invocation = match spec {
            JobSpec::Prediction(spec) => self.prepare_prediction(spec)?,
            JobSpec::Generation(spec) => self.prepare_generation(spec)?,
        };
        let job_name = spec.job_name();
        debug!("Submitting '{}': {}", job_name, invocation);

        let output = self
            .runner
            .run(&invocation)
            .await
            .map_err(|e| submission_error(job_name, &invocation, e.to_string()))?;
        if !output.success {
            let message = match output.stderr.trim() {
                "" => format!("exited with status {:?}", output.code),
                stderr => stderr.to_string(),
            };
            return Err(submission_error(job_name, &invocation, message));
        }

        let scheduler_job_id = output
            .stdout
            .split_whitespace()
            .last()
            .ok_or_else(|| {
                submission_error(
                    job_name,
                    &invocation,
                    "scheduler acknowledgement contained no job id".to_string(),
                )
            })?
            .to_string();

        info!(
            "Submitted {} job '{}' as scheduler job {}",
            spec.kind(),
            job_name,
            scheduler_job_id
        );
        Ok(JobHandle {
            scheduler_job_id,
            job_name: job_name.clone(),
            kind: spec.kind(),
            submitted_at: Utc::now(),
        })
    }

    /// Queries the live queue for a job's state.
    ///
    /// Never fails: a job absent from the queue is reported as [`JobStatus::Completed`]
    /// and any query failure degrades to [`JobStatus::Unknown`].
    pub async fn poll(&self, scheduler_job_id: &str) -> JobStatus {
        let invocation = Invocation::new(&self.scheduler.query_command)
            .arg("-j")
            .arg(scheduler_job_id)
            .arg("-h")
            .arg("-o")
            .arg("%T");

        let output = match self.runner.run(&invocation).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Status query for job {} failed: {}", scheduler_job_id, e);
                return JobStatus::Unknown;
            }
        };

        if !output.success {
            if output.stderr.to_ascii_lowercase().contains("invalid job id") {
                debug!("Job {} is no longer known to the scheduler", scheduler_job_id);
                return JobStatus::Completed;
            }
            warn!(
                "Status query for job {} exited with {:?}: {}",
                scheduler_job_id,
                output.code,
                output.stderr.trim()
            );
            return JobStatus::Unknown;
        }

        match output.stdout.split_whitespace().next() {
            None => JobStatus::Completed,
            Some(code) => {
                let status = normalize_status(code);
                if status == JobStatus::Unknown {
                    warn!(
                        "Unrecognized state '{}' for job {}",
                        code, scheduler_job_id
                    );
                }
                status
            }
        }
    }

    fn prepare_prediction(&self, spec: &PredictionSpec) -> Result<Invocation, EngineError> {
        let input_dir = self.prediction.input_dir_path();
        let output_dir = self.prediction.output_dir_path();
        create_dir(&input_dir)?;
        create_dir(&output_dir)?;

        let document =
            render_prediction_document(spec).map_err(|source| EngineError::Serialization {
                what: "prediction input document",
                source,
            })?;
        let input_file_name = spec.input_file_name();
        let document_path = input_dir.join(&input_file_name);
        fs::write(&document_path, document).map_err(|e| EngineError::io(&document_path, e))?;
        debug!("Wrote prediction input document {:?}", document_path);

        let mut invocation = Invocation::new(&self.scheduler.submit_command);
        if let Some(nodelist) = &self.prediction.nodelist {
            invocation = invocation.arg(format!("--nodelist={}", nodelist));
        }
        Ok(invocation
            .arg(path_arg(&self.prediction.batch_script_path()))
            .arg(input_file_name)
            .arg(path_arg(&input_dir))
            .arg(path_arg(&output_dir)))
    }

    /// Renders the batch script a generation job would be submitted with.
    ///
    /// The script changes into the tool's install directory, so every path it
    /// mentions is made absolute.
    pub fn render_generation_script(&self, spec: &GenerationSpec) -> Result<String, EngineError> {
        let output_dir = absolute(&self.generation.output_dir)?;
        let target = absolute(&spec.target_structure_path)?;
        let output_prefix = output_dir.join(generation_output_stem(&spec.job_name));
        let command =
            build_generation_command(&spec.params, &target, &output_prefix, &self.generation);
        Ok(build_batch_script(
            &command,
            &spec.job_name,
            &spec.scheduler_resources,
            &output_dir.join("logs"),
        ))
    }

    fn prepare_generation(&self, spec: &GenerationSpec) -> Result<Invocation, EngineError> {
        let log_dir = absolute(&self.generation.log_dir())?;
        create_dir(&log_dir)?;
        let script = self.render_generation_script(spec)?;

        let script_path = script_path(&log_dir, &spec.job_name);
        fs::write(&script_path, script).map_err(|e| EngineError::io(&script_path, e))?;
        debug!("Wrote batch script {:?}", script_path);

        Ok(Invocation::new(&self.scheduler.submit_command).arg(path_arg(&script_path)))
    }
}

fn script_path(log_dir: &Path, job_name: &JobName) -> PathBuf {
    log_dir.join(format!("{}.slurm", job_name))
}

fn create_dir(path: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(path).map_err(|e| EngineError::io(path, e))
}

fn absolute(path: &Path) -> Result<PathBuf, EngineError> {
    std::path::absolute(path).map_err(|e| EngineError::io(path, e))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn submission_error(job_name: &JobName, invocation: &Invocation, message: String) -> EngineError {
    EngineError::Submission {
        job_name: job_name.to_string(),
        command: invocation.to_string(),
        message,
    }
}
