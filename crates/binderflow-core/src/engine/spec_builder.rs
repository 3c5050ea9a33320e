use super::config::GenerationToolConfig;
use crate::core::models::job::{
    GenerationParams, GenerationSpec, JobName, PredictionSpec, SchedulerResources,
};
use crate::core::models::sequence::SequenceRecord;
use serde::Serialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Seed passed to every prediction job so repeated runs are comparable.
pub const PREDICTION_SEED: u32 = 42;
pub const TARGET_CHAIN_ID: &str = "A";
pub const BINDER_CHAIN_ID: &str = "B";

const DOCUMENT_DIALECT: &str = "alphafold3";
const DOCUMENT_VERSION: u32 = 2;

#[derive(Serialize)]
struct FoldInput<'a> {
    name: &'a str,
    #[serde(rename = "modelSeeds")]
    model_seeds: Vec<u32>,
    sequences: Vec<SequenceEntry<'a>>,
    dialect: &'static str,
    version: u32,
}

#[derive(Serialize)]
struct SequenceEntry<'a> {
    protein: ProteinEntry<'a>,
}

// Empty MSAs and templates request single-sequence (ab initio) inference.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProteinEntry<'a> {
    id: &'a str,
    sequence: &'a str,
    unpaired_msa: &'static str,
    paired_msa: &'static str,
    templates: Vec<()>,
}

/// Builds the two-chain prediction job for a target/binder pair.
///
/// The target is always chain `A` and the binder chain `B`; the seed is fixed.
pub fn build_prediction_spec(
    target: &SequenceRecord,
    binder: &SequenceRecord,
    job_name: JobName,
) -> PredictionSpec {
    PredictionSpec {
        job_name,
        sequence_pairs: vec![
            (TARGET_CHAIN_ID.to_string(), target.sequence().to_string()),
            (BINDER_CHAIN_ID.to_string(), binder.sequence().to_string()),
        ],
        seed: PREDICTION_SEED,
    }
}

/// Renders the prediction tool's JSON input document.
pub fn render_prediction_document(spec: &PredictionSpec) -> Result<String, serde_json::Error> {
    let document = FoldInput {
        name: spec.job_name.as_str(),
        model_seeds: vec![spec.seed],
        sequences: spec
            .sequence_pairs
            .iter()
            .map(|(id, sequence)| SequenceEntry {
                protein: ProteinEntry {
                    id,
                    sequence,
                    unpaired_msa: "",
                    paired_msa: "",
                    templates: Vec::new(),
                },
            })
            .collect(),
        dialect: DOCUMENT_DIALECT,
        version: DOCUMENT_VERSION,
    };
    serde_json::to_string_pretty(&document)
}

pub fn build_generation_spec(
    target_structure_path: impl Into<PathBuf>,
    params: GenerationParams,
    job_name: JobName,
    scheduler_resources: SchedulerResources,
) -> GenerationSpec {
    GenerationSpec {
        job_name,
        target_structure_path: target_structure_path.into(),
        params,
        scheduler_resources,
    }
}

/// File-name stem shared by every structure a generation job writes.
pub fn generation_output_stem(job_name: &JobName) -> String {
    format!("binders_{}", job_name)
}

/// The generation tool invocation, kept structured until it is rendered into a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationCommand {
    pub workdir: PathBuf,
    pub conda_env: String,
    pub program: String,
    pub args: Vec<String>,
}

impl GenerationCommand {
    /// Renders a single shell line: change directory, activate the environment, run.
    pub fn render(&self) -> String {
        let invocation = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "cd {} && conda activate {} && {}",
            shell_quote(&self.workdir.to_string_lossy()),
            shell_quote(&self.conda_env),
            invocation
        )
    }
}

pub fn build_generation_command(
    params: &GenerationParams,
    target_structure_path: &Path,
    output_prefix: &Path,
    tool: &GenerationToolConfig,
) -> GenerationCommand {
    let args = vec![
        format!(
            "contigmap.contigs=[{0}-{0}]",
            params.contig_length
        ),
        format!("inference.output_prefix={}", output_prefix.display()),
        format!("inference.input_pdb={}", target_structure_path.display()),
        format!("inference.num_designs={}", params.num_designs),
        format!(
            "potentials.guiding_potentials=[\"{}\"]",
            tool.guiding_potential
        ),
        format!("potentials.guide_scale={:?}", params.guide_scale),
        format!("potentials.guide_decay={}", tool.guide_decay),
    ];

    GenerationCommand {
        workdir: tool.install_path.clone(),
        conda_env: tool.conda_env.clone(),
        program: tool.inference_script.clone(),
        args,
    }
}

/// Renders a batch script for a generation job.
///
/// Logs go to `<log_dir>/<job_name>.out` and `.err`; callers must keep job names
/// unique within a log directory.
pub fn build_batch_script(
    command: &GenerationCommand,
    job_name: &JobName,
    resources: &SchedulerResources,
    log_dir: &Path,
) -> String {
    let mut lines = vec![
        "#!/bin/bash".to_string(),
        format!("#SBATCH --job-name={}", job_name),
        format!("#SBATCH --partition={}", resources.partition),
    ];
    if let Some(nodelist) = &resources.nodelist {
        lines.push(format!("#SBATCH --nodelist={}", nodelist));
    }
    lines.push(format!("#SBATCH --nodes={}", resources.nodes));
    lines.push(format!("#SBATCH --ntasks={}", resources.ntasks));
    lines.push(format!("#SBATCH --cpus-per-task={}", resources.cpus_per_task));
    if let Some(mem) = &resources.mem {
        lines.push(format!("#SBATCH --mem={}", mem));
    }
    if let Some(time) = &resources.time {
        lines.push(format!("#SBATCH --time={}", time));
    }
    lines.push(format!("#SBATCH --gres={}", resources.gres));
    lines.push(format!(
        "#SBATCH --output={}",
        log_dir.join(format!("{}.out", job_name)).display()
    ));
    lines.push(format!(
        "#SBATCH --error={}",
        log_dir.join(format!("{}.err", job_name)).display()
    ));
    lines.push(String::new());
    lines.push("eval \"$(conda shell.bash hook)\"".to_string());
    lines.push(String::new());
    lines.push(format!("echo \"Starting binder generation job: {}\"", job_name));
    lines.push(String::new());
    lines.push(command.render());
    lines.push(String::new());
    lines.push(format!("echo \"Binder generation job completed: {}\"", job_name));

    let mut script = lines.join("\n");
    script.push('\n');
    script
}

/// Single-quotes a shell word unless it consists only of characters that are inert
/// both to the shell and to the generation tool's override grammar.
fn shell_quote(word: &str) -> Cow<'_, str> {
    let is_plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '=' | ',' | '+' | '@' | '%'));
    if is_plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}
