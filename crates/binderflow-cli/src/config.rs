use crate::error::{CliError, Result};
use crate::paths::AppPaths;
use binderflow::core::models::job::{GenerationParams, SchedulerResources};
use binderflow::engine::config::{
    ConfigError, SchedulerConfig, WorkflowConfig, WorkflowConfigBuilder,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# binderflow configuration
#
# Values left commented out use the defaults shown. Any key can also be
# overridden for a single run with `-S section.key=value`.

[prediction]
# Root of the structure-prediction installation. Input and output
# directories and the batch script are resolved relative to it.
install-path = "/path/to/alphafold3"
# input-dir = "af_input"
# output-dir = "af_output"
# batch-script = "run_alphafold3.slurm"
# nodelist = "node03"

[generation]
# Root of the binder-generation installation; jobs run from this directory.
install-path = "/path/to/RFdiffusion"
# conda-env = "SE3nv"
# output-dir = "./rfdiffusion_output"
# inference-script = "./scripts/run_inference.py"
# guide-decay = "quadratic"
# binder-chain = "A"
# contig-length = 100
# num-designs = 10
# guide-scale = 2.0

[generation.resources]
# partition = "3090"
# nodes = 1
# ntasks = 1
# cpus-per-task = 8
# mem = "16G"       # empty string omits the directive
# time = "02:00:00" # empty string omits the directive
# gres = "gpu:1"

[scheduler]
# submit-command = "sbatch"
# query-command = "squeue"
# timeout-secs = 60 # 0 disables the timeout

# state-dir = ".binderflow/jobs"
"#;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialPredictionConfig {
    install_path: Option<PathBuf>,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    batch_script: Option<PathBuf>,
    nodelist: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialResourcesConfig {
    partition: Option<String>,
    nodelist: Option<String>,
    nodes: Option<u32>,
    ntasks: Option<u32>,
    cpus_per_task: Option<u32>,
    mem: Option<String>,
    time: Option<String>,
    gres: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialGenerationConfig {
    install_path: Option<PathBuf>,
    conda_env: Option<String>,
    output_dir: Option<PathBuf>,
    inference_script: Option<String>,
    guiding_potential: Option<String>,
    guide_decay: Option<String>,
    binder_chain: Option<String>,
    contig_length: Option<u32>,
    num_designs: Option<u32>,
    guide_scale: Option<f64>,
    resources: Option<PartialResourcesConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSchedulerConfig {
    submit_command: Option<String>,
    query_command: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialWorkflowConfig {
    prediction: Option<PartialPredictionConfig>,
    generation: Option<PartialGenerationConfig>,
    scheduler: Option<PartialSchedulerConfig>,
    state_dir: Option<PathBuf>,
}

/// Loads the configuration file named on the command line (or the per-user default, if
/// present) and layers the `-S` overrides on top.
pub fn resolve(
    config_path: Option<&Path>,
    set_values: &[String],
    paths: &AppPaths,
) -> Result<WorkflowConfig> {
    PartialWorkflowConfig::load(config_path, paths)?.merge_with_cli(set_values)
}

impl PartialWorkflowConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn load(explicit: Option<&Path>, paths: &AppPaths) -> Result<Self> {
        match explicit {
            Some(path) if !path.is_file() => Err(CliError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            ))),
            Some(path) => Self::from_file(path),
            None => {
                let default_path = paths.default_config_file();
                if default_path.is_file() {
                    info!("Using configuration file {:?}", default_path);
                    Self::from_file(&default_path)
                } else {
                    debug!("No configuration file at {:?}; using defaults", default_path);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn merge_with_cli(mut self, set_values: &[String]) -> Result<WorkflowConfig> {
        self.apply_set_values(set_values)?;

        let prediction = self.prediction.take().unwrap_or_default();
        let mut generation = self.generation.take().unwrap_or_default();
        let scheduler = self.scheduler.take().unwrap_or_default();

        let defaults = GenerationParams::default();
        let params = GenerationParams::new(
            generation.contig_length.unwrap_or(defaults.contig_length),
            generation.num_designs.unwrap_or(defaults.num_designs),
            generation.guide_scale.unwrap_or(defaults.guide_scale),
        )
        .map_err(|e| CliError::Config(e.to_string()))?;
        let resources = merge_resources(generation.resources.take().unwrap_or_default());

        let default_scheduler = SchedulerConfig::default();
        let scheduler = SchedulerConfig {
            submit_command: scheduler
                .submit_command
                .unwrap_or(default_scheduler.submit_command),
            query_command: scheduler
                .query_command
                .unwrap_or(default_scheduler.query_command),
            command_timeout: match scheduler.timeout_secs {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => default_scheduler.command_timeout,
            },
        };

        let mut builder = WorkflowConfigBuilder::new()
            .prediction_nodelist(prediction.nodelist)
            .resources(resources)
            .default_params(params)
            .scheduler(scheduler);
        builder = set(builder, prediction.install_path, |b, v| b.prediction_install_path(v));
        builder = set(builder, prediction.input_dir, |b, v| b.prediction_input_dir(v));
        builder = set(builder, prediction.output_dir, |b, v| b.prediction_output_dir(v));
        builder = set(builder, prediction.batch_script, |b, v| b.prediction_batch_script(v));
        builder = set(builder, generation.install_path, |b, v| b.generation_install_path(v));
        builder = set(builder, generation.conda_env, |b, v| b.conda_env(v));
        builder = set(builder, generation.output_dir, |b, v| b.generation_output_dir(v));
        builder = set(builder, generation.inference_script, |b, v| b.inference_script(v));
        builder = set(builder, generation.guiding_potential, |b, v| b.guiding_potential(v));
        builder = set(builder, generation.guide_decay, |b, v| b.guide_decay(v));
        builder = set(builder, generation.binder_chain, |b, v| b.binder_chain(v));
        builder = set(builder, self.state_dir.take(), |b, v| b.state_dir(v));

        builder.build().map_err(|e| match e {
            ConfigError::MissingParameter(name) => CliError::Config(format!(
                "A value for '{}' is required either in the config file or via -S. \
                 Run `binderflow config init` to create a config file.",
                name.replace('_', "-")
            )),
            other => CliError::Config(other.to_string()),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;
            let value = value.trim();

            match key.trim() {
                "prediction.install-path" => {
                    self.prediction.get_or_insert_with(Default::default).install_path =
                        Some(value.into())
                }
                "prediction.nodelist" => {
                    self.prediction.get_or_insert_with(Default::default).nodelist =
                        non_empty(value)
                }
                "generation.install-path" => {
                    self.generation.get_or_insert_with(Default::default).install_path =
                        Some(value.into())
                }
                "generation.conda-env" => {
                    self.generation.get_or_insert_with(Default::default).conda_env =
                        Some(value.into())
                }
                "generation.output-dir" => {
                    self.generation.get_or_insert_with(Default::default).output_dir =
                        Some(value.into())
                }
                "generation.binder-chain" => {
                    self.generation.get_or_insert_with(Default::default).binder_chain =
                        Some(value.into())
                }
                "generation.contig-length" => {
                    self.generation.get_or_insert_with(Default::default).contig_length =
                        Some(parse(key, value)?)
                }
                "generation.num-designs" => {
                    self.generation.get_or_insert_with(Default::default).num_designs =
                        Some(parse(key, value)?)
                }
                "generation.guide-scale" => {
                    self.generation.get_or_insert_with(Default::default).guide_scale =
                        Some(parse(key, value)?)
                }
                "generation.resources.partition" => {
                    self.resources().partition = Some(value.into())
                }
                "generation.resources.nodelist" => self.resources().nodelist = non_empty(value),
                "generation.resources.mem" => self.resources().mem = Some(value.into()),
                "generation.resources.time" => self.resources().time = Some(value.into()),
                "scheduler.timeout-secs" => {
                    self.scheduler
                        .get_or_insert_with(Default::default)
                        .timeout_secs = Some(parse(key, value)?)
                }
                "state-dir" => self.state_dir = Some(value.into()),
                other => {
                    return Err(CliError::Config(format!(
                        "Unknown or unsupported key for --set: '{}'",
                        other
                    )));
                }
            }
        }
        Ok(())
    }

    fn resources(&mut self) -> &mut PartialResourcesConfig {
        self.generation
            .get_or_insert_with(Default::default)
            .resources
            .get_or_insert_with(Default::default)
    }
}

fn merge_resources(partial: PartialResourcesConfig) -> SchedulerResources {
    let defaults = SchedulerResources::default();
    SchedulerResources {
        partition: partial.partition.unwrap_or(defaults.partition),
        nodelist: partial.nodelist.as_deref().and_then(non_empty),
        nodes: partial.nodes.unwrap_or(defaults.nodes),
        ntasks: partial.ntasks.unwrap_or(defaults.ntasks),
        cpus_per_task: partial.cpus_per_task.unwrap_or(defaults.cpus_per_task),
        // An explicit empty string drops the directive.
        mem: match partial.mem {
            Some(mem) => non_empty(&mem),
            None => defaults.mem,
        },
        time: match partial.time {
            Some(time) => non_empty(&time),
            None => defaults.time,
        },
        gres: partial.gres.unwrap_or(defaults.gres),
    }
}

fn set<T>(
    builder: WorkflowConfigBuilder,
    value: Option<T>,
    setter: fn(WorkflowConfigBuilder, T) -> WorkflowConfigBuilder,
) -> WorkflowConfigBuilder {
    match value {
        Some(value) => setter(builder, value),
        None => builder,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: '{}'", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use once_cell::sync::Lazy;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn empty_paths() -> AppPaths {
        AppPaths::with_config_dir(TEST_DIR.path().join("no-such-config-dir"))
    }

    fn resolve_args(args: &[&str]) -> Result<WorkflowConfig> {
        let mut argv = vec!["binderflow"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["config", "path"]);
        let cli = Cli::parse_from(argv);
        resolve(cli.config.as_deref(), &cli.set_values, &empty_paths())
    }

    const MINIMAL: &str = r#"
        [prediction]
        install-path = "/opt/alphafold3"

        [generation]
        install-path = "/opt/RFdiffusion"
    "#;

    #[test]
    fn file_values_are_merged_with_defaults() {
        let path = write_config_file(
            "full.toml",
            r#"
            state-dir = "/var/binderflow/jobs"

            [prediction]
            install-path = "/opt/alphafold3"
            nodelist = "node03"

            [generation]
            install-path = "/opt/RFdiffusion"
            conda-env = "rfd"
            num-designs = 4

            [generation.resources]
            partition = "a100"
            mem = ""

            [scheduler]
            timeout-secs = 0
            "#,
        );
        let config = resolve_args(&["-c", path.to_str().unwrap()]).unwrap();

        assert_eq!(config.prediction.install_path, PathBuf::from("/opt/alphafold3"));
        assert_eq!(config.prediction.nodelist.as_deref(), Some("node03"));
        assert_eq!(config.prediction.input_dir, PathBuf::from("af_input"));
        assert_eq!(config.generation.conda_env, "rfd");
        assert_eq!(config.generation.default_params.num_designs, 4);
        assert_eq!(config.generation.default_params.contig_length, 100);
        assert_eq!(config.generation.resources.partition, "a100");
        assert_eq!(config.generation.resources.mem, None);
        assert_eq!(config.generation.resources.time.as_deref(), Some("02:00:00"));
        assert_eq!(config.scheduler.command_timeout, None);
        assert_eq!(config.state_dir, PathBuf::from("/var/binderflow/jobs"));
    }

    #[test]
    fn set_values_override_the_file() {
        let path = write_config_file("minimal.toml", MINIMAL);
        let config = resolve_args(&[
            "-c",
            path.to_str().unwrap(),
            "-S",
            "prediction.nodelist=node07",
            "-S",
            "generation.guide-scale=3.5",
            "-S",
            "scheduler.timeout-secs=5",
        ])
        .unwrap();
        assert_eq!(config.prediction.nodelist.as_deref(), Some("node07"));
        assert_eq!(config.generation.default_params.guide_scale, 3.5);
        assert_eq!(config.scheduler.command_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn install_paths_can_come_from_set_values_alone() {
        let config = resolve_args(&[
            "-S",
            "prediction.install-path=/opt/af3",
            "-S",
            "generation.install-path=/opt/rfd",
        ])
        .unwrap();
        assert_eq!(config.prediction.install_path, PathBuf::from("/opt/af3"));
        assert_eq!(config.scheduler.submit_command, "sbatch");
    }

    #[test]
    fn missing_install_path_is_a_config_error() {
        let err = resolve_args(&["-S", "generation.install-path=/opt/rfd"]).unwrap_err();
        match err {
            CliError::Config(message) => assert!(message.contains("prediction.install-path")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let path = write_config_file(
            "typo.toml",
            "[prediction]\ninstall-path = \"/opt/af3\"\ninstal-dir = \"x\"\n",
        );
        let err = resolve_args(&["-c", path.to_str().unwrap()]).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));

        let err = resolve_args(&["-S", "prediction.colour=blue"]).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        let err = resolve_args(&["-S", "prediction.nodelist"]).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        let err = resolve_args(&["-S", "generation.num-designs=many"]).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn invalid_generation_defaults_are_rejected() {
        let path = write_config_file(
            "zero.toml",
            &format!("{}\ncontig-length = 0\n", MINIMAL),
        );
        let err = resolve_args(&["-c", path.to_str().unwrap()]).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = resolve_args(&["-c", "/no/such/binderflow.toml"]).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn default_file_is_used_when_present() {
        let dir = tempdir().unwrap();
        let paths = AppPaths::with_config_dir(dir.path());
        fs::write(paths.default_config_file(), MINIMAL).unwrap();
        let config = PartialWorkflowConfig::load(None, &paths)
            .unwrap()
            .merge_with_cli(&[])
            .unwrap();
        assert_eq!(config.generation.install_path, PathBuf::from("/opt/RFdiffusion"));
    }

    #[test]
    fn default_template_parses_and_uses_documented_defaults() {
        let partial: PartialWorkflowConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        let config = partial.merge_with_cli(&[]).unwrap();
        let defaults = WorkflowConfigBuilder::new()
            .prediction_install_path("/path/to/alphafold3")
            .generation_install_path("/path/to/RFdiffusion")
            .build()
            .unwrap();
        assert_eq!(config, defaults);
    }
}
