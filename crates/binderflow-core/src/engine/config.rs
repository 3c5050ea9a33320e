use crate::core::io::pdb::DEFAULT_CHAIN_ID;
use crate::core::models::job::{GenerationParams, SchedulerResources};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Target-agnostic contact potential. Potentials that name target atoms
/// (`subset_atom_indices`) are supplied per site through `generation.guiding_potential`.
pub const DEFAULT_GUIDING_POTENTIAL: &str =
    "type:substrate_contacts,s:1,r_0:8,rep_r_0:5.0,rep_s:2,rep_r_min:1";
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {parameter}: {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Locations and options of the structure-prediction installation.
///
/// Input and output directories are resolved relative to `install_path`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionToolConfig {
    pub install_path: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub batch_script: PathBuf,
    pub nodelist: Option<String>,
}

impl PredictionToolConfig {
    pub fn input_dir_path(&self) -> PathBuf {
        self.install_path.join(&self.input_dir)
    }

    pub fn output_dir_path(&self) -> PathBuf {
        self.install_path.join(&self.output_dir)
    }

    pub fn batch_script_path(&self) -> PathBuf {
        self.install_path.join(&self.batch_script)
    }
}

/// Locations and options of the binder-generation installation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationToolConfig {
    pub install_path: PathBuf,
    pub conda_env: String,
    pub output_dir: PathBuf,
    pub inference_script: String,
    pub guiding_potential: String,
    pub guide_decay: String,
    /// Chain of the generated structures that holds the designed binder.
    pub binder_chain: String,
    pub resources: SchedulerResources,
    pub default_params: GenerationParams,
}

impl GenerationToolConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.output_dir.join("logs")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub submit_command: String,
    pub query_command: String,
    /// Upper bound on any single scheduler invocation; `None` waits indefinitely.
    pub command_timeout: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            submit_command: "sbatch".to_string(),
            query_command: "squeue".to_string(),
            command_timeout: Some(DEFAULT_COMMAND_TIMEOUT),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub prediction: PredictionToolConfig,
    pub generation: GenerationToolConfig,
    pub scheduler: SchedulerConfig,
    /// Directory holding one ledger entry per submitted job.
    pub state_dir: PathBuf,
}

#[derive(Default)]
pub struct WorkflowConfigBuilder {
    prediction_install_path: Option<PathBuf>,
    prediction_input_dir: Option<PathBuf>,
    prediction_output_dir: Option<PathBuf>,
    prediction_batch_script: Option<PathBuf>,
    prediction_nodelist: Option<String>,
    generation_install_path: Option<PathBuf>,
    conda_env: Option<String>,
    generation_output_dir: Option<PathBuf>,
    inference_script: Option<String>,
    guiding_potential: Option<String>,
    guide_decay: Option<String>,
    binder_chain: Option<String>,
    resources: Option<SchedulerResources>,
    default_params: Option<GenerationParams>,
    scheduler: Option<SchedulerConfig>,
    state_dir: Option<PathBuf>,
}

impl WorkflowConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prediction_install_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.prediction_install_path = Some(path.into());
        self
    }
    pub fn prediction_input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.prediction_input_dir = Some(path.into());
        self
    }
    pub fn prediction_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.prediction_output_dir = Some(path.into());
        self
    }
    pub fn prediction_batch_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.prediction_batch_script = Some(path.into());
        self
    }
    pub fn prediction_nodelist(mut self, nodelist: Option<String>) -> Self {
        self.prediction_nodelist = nodelist;
        self
    }
    pub fn generation_install_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.generation_install_path = Some(path.into());
        self
    }
    pub fn conda_env(mut self, env: impl Into<String>) -> Self {
        self.conda_env = Some(env.into());
        self
    }
    pub fn generation_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.generation_output_dir = Some(path.into());
        self
    }
    pub fn inference_script(mut self, script: impl Into<String>) -> Self {
        self.inference_script = Some(script.into());
        self
    }
    pub fn guiding_potential(mut self, potential: impl Into<String>) -> Self {
        self.guiding_potential = Some(potential.into());
        self
    }
    pub fn guide_decay(mut self, decay: impl Into<String>) -> Self {
        self.guide_decay = Some(decay.into());
        self
    }
    pub fn binder_chain(mut self, chain: impl Into<String>) -> Self {
        self.binder_chain = Some(chain.into());
        self
    }
    pub fn resources(mut self, resources: SchedulerResources) -> Self {
        self.resources = Some(resources);
        self
    }
    pub fn default_params(mut self, params: GenerationParams) -> Self {
        self.default_params = Some(params);
        self
    }
    pub fn scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = Some(scheduler);
        self
    }
    pub fn state_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(path.into());
        self
    }

    pub fn build(self) -> Result<WorkflowConfig, ConfigError> {
        let prediction = PredictionToolConfig {
            install_path: self
                .prediction_install_path
                .ok_or(ConfigError::MissingParameter("prediction.install_path"))?,
            input_dir: self
                .prediction_input_dir
                .unwrap_or_else(|| PathBuf::from("af_input")),
            output_dir: self
                .prediction_output_dir
                .unwrap_or_else(|| PathBuf::from("af_output")),
            batch_script: self
                .prediction_batch_script
                .unwrap_or_else(|| PathBuf::from("run_alphafold3.slurm")),
            nodelist: self.prediction_nodelist,
        };

        let generation = GenerationToolConfig {
            install_path: self
                .generation_install_path
                .ok_or(ConfigError::MissingParameter("generation.install_path"))?,
            conda_env: non_empty("generation.conda_env", self.conda_env, "SE3nv")?,
            output_dir: self
                .generation_output_dir
                .unwrap_or_else(|| PathBuf::from("./rfdiffusion_output")),
            inference_script: non_empty(
                "generation.inference_script",
                self.inference_script,
                "./scripts/run_inference.py",
            )?,
            guiding_potential: non_empty(
                "generation.guiding_potential",
                self.guiding_potential,
                DEFAULT_GUIDING_POTENTIAL,
            )?,
            guide_decay: non_empty("generation.guide_decay", self.guide_decay, "quadratic")?,
            binder_chain: non_empty(
                "generation.binder_chain",
                self.binder_chain,
                DEFAULT_CHAIN_ID,
            )?,
            resources: self.resources.unwrap_or_default(),
            default_params: self.default_params.unwrap_or_default(),
        };
        validate_resources(&generation.resources)?;

        let scheduler = self.scheduler.unwrap_or_default();
        if scheduler.submit_command.trim().is_empty() {
            return Err(ConfigError::MissingParameter("scheduler.submit_command"));
        }
        if scheduler.query_command.trim().is_empty() {
            return Err(ConfigError::MissingParameter("scheduler.query_command"));
        }

        Ok(WorkflowConfig {
            prediction,
            generation,
            scheduler,
            state_dir: self
                .state_dir
                .unwrap_or_else(|| Path::new(".binderflow").join("jobs")),
        })
    }
}

fn non_empty(
    parameter: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<String, ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue {
            parameter,
            reason: "must not be empty".to_string(),
        }),
        Some(v) => Ok(v),
        None => Ok(default.to_string()),
    }
}

fn validate_resources(resources: &SchedulerResources) -> Result<(), ConfigError> {
    let positive = [
        ("resources.nodes", resources.nodes),
        ("resources.ntasks", resources.ntasks),
        ("resources.cpus_per_task", resources.cpus_per_task),
    ];
    for (parameter, value) in positive {
        if value == 0 {
            return Err(ConfigError::InvalidValue {
                parameter,
                reason: "must be greater than zero".to_string(),
            });
        }
    }
    if resources.partition.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            parameter: "resources.partition",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}
