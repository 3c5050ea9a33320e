use binderflow::core::models::job::JobName;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "binderflow - Submit, monitor and score protein binder prediction and design jobs on a SLURM cluster.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to the configuration file in TOML format.
    /// Defaults to the per-user file shown by `binderflow config path`, if it exists.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S prediction.nodelist=node03
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a structure-prediction job that scores a target/binder complex.
    Evaluate(EvaluateArgs),
    /// Submit a binder-generation job against a target structure.
    Generate(GenerateArgs),
    /// Query the scheduler for the state of a submitted job.
    Status(StatusArgs),
    /// Parse the results of a finished prediction job.
    Collect(CollectArgs),
    /// Submit one evaluation job per binder produced by a finished generation job.
    FanOut(FanOutArgs),
    /// Inspect or create the configuration file.
    Config(ConfigArgs),
}

/// Options shared by the submitting subcommands.
#[derive(Args, Debug, Clone, Copy)]
pub struct SubmitOptions {
    /// Build and print the job without submitting it.
    #[arg(long)]
    pub dry_run: bool,

    /// Append a timestamp to the job name so repeated runs never collide.
    #[arg(long)]
    pub unique: bool,

    /// Submit even if a job with the same name was already submitted.
    #[arg(long, conflicts_with = "unique")]
    pub force: bool,
}

/// Arguments for the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Input file with `target_*`, `binder_*` and `job_name` entries.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub options: SubmitOptions,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Input file describing the target; its `target_pdb` is the default structure.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Target structure to design binders against, overriding `target_pdb`.
    #[arg(short, long, value_name = "PATH")]
    pub target_structure: Option<PathBuf>,

    /// Length of each designed binder, in residues.
    #[arg(long, value_name = "INT")]
    pub contig_length: Option<u32>,

    /// Number of binder designs to generate.
    #[arg(short, long, value_name = "INT")]
    pub num_designs: Option<u32>,

    /// Strength of the guiding potential.
    #[arg(long, value_name = "FLOAT")]
    pub guide_scale: Option<f64>,

    #[command(flatten)]
    pub options: SubmitOptions,
}

/// Arguments for the `status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Name the job was submitted under.
    #[arg(value_name = "JOB_NAME")]
    pub job_name: JobName,
}

/// Arguments for the `collect` subcommand.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Name the prediction job was submitted under.
    #[arg(value_name = "JOB_NAME")]
    pub job_name: JobName,

    /// Print the result as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fan-out` subcommand.
#[derive(Args, Debug)]
pub struct FanOutArgs {
    /// Input file describing the target the binders were designed against.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Name of the generation job, e.g. `binder_gen_t1`.
    #[arg(value_name = "GENERATION_JOB")]
    pub generation_job: JobName,

    /// Resubmit evaluations that were already submitted.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the path of the default configuration file.
    Path,
    /// Write a commented default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}
