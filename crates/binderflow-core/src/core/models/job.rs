use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Invalid job name '{name}': {reason}")]
pub struct InvalidJobName {
    pub name: String,
    pub reason: &'static str,
}

/// A job name that is safe to embed in file and directory names.
///
/// Every artifact of a job (input document, batch script, logs, result directory,
/// ledger entry) is named after it, so it must not contain path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobName(String);

impl JobName {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidJobName> {
        let name = name.into();
        let reject = |reason| {
            Err(InvalidJobName {
                name: name.clone(),
                reason,
            })
        };
        if name.is_empty() {
            return reject("name is empty");
        }
        if name.contains(['/', '\\']) {
            return reject("name contains a path separator");
        }
        if name == "." || name == ".." {
            return reject("name is a relative path component");
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return reject("only ASCII letters, digits, '-', '_' and '.' are allowed");
        }
        Ok(Self(name))
    }

    /// Appends a second-resolution UTC timestamp, e.g. `t1_20251017_093000`.
    pub fn with_timestamp_suffix(&self) -> Self {
        self.with_suffix_at(Utc::now())
    }

    pub(crate) fn with_suffix_at(&self, at: DateTime<Utc>) -> Self {
        Self(format!("{}_{}", self.0, at.format("%Y%m%d_%H%M%S")))
    }

    /// Derives the name of a downstream job, e.g. `gen_eval_3`.
    pub fn child(&self, label: &str, index: usize) -> Self {
        Self(format!("{}_{}_{}", self.0, label, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobName {
    type Err = InvalidJobName;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for JobName {
    type Error = InvalidJobName;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobName> for String {
    fn from(name: JobName) -> Self {
        name.0
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Generation parameter `{name}` must be greater than zero (got {value})")]
pub struct InvalidGenerationParams {
    pub name: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub contig_length: u32,
    pub num_designs: u32,
    pub guide_scale: f64,
}

impl GenerationParams {
    pub fn new(
        contig_length: u32,
        num_designs: u32,
        guide_scale: f64,
    ) -> Result<Self, InvalidGenerationParams> {
        if contig_length == 0 {
            return Err(InvalidGenerationParams {
                name: "contig_length",
                value: contig_length.to_string(),
            });
        }
        if num_designs == 0 {
            return Err(InvalidGenerationParams {
                name: "num_designs",
                value: num_designs.to_string(),
            });
        }
        if !(guide_scale > 0.0 && guide_scale.is_finite()) {
            return Err(InvalidGenerationParams {
                name: "guide_scale",
                value: guide_scale.to_string(),
            });
        }
        Ok(Self {
            contig_length,
            num_designs,
            guide_scale,
        })
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            contig_length: 100,
            num_designs: 10,
            guide_scale: 2.0,
        }
    }
}

/// Resource requests rendered into `#SBATCH` directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerResources {
    pub partition: String,
    pub nodelist: Option<String>,
    pub nodes: u32,
    pub ntasks: u32,
    pub cpus_per_task: u32,
    pub mem: Option<String>,
    pub time: Option<String>,
    pub gres: String,
}

impl Default for SchedulerResources {
    fn default() -> Self {
        Self {
            partition: "3090".to_string(),
            nodelist: None,
            nodes: 1,
            ntasks: 1,
            cpus_per_task: 8,
            mem: Some("16G".to_string()),
            time: Some("02:00:00".to_string()),
            gres: "gpu:1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionSpec {
    pub job_name: JobName,
    /// `(chain_id, sequence)` in submission order: target first, binder second.
    pub sequence_pairs: Vec<(String, String)>,
    pub seed: u32,
}

impl PredictionSpec {
    pub fn input_file_name(&self) -> String {
        format!("fold_input_{}.json", self.job_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSpec {
    pub job_name: JobName,
    pub target_structure_path: PathBuf,
    pub params: GenerationParams,
    pub scheduler_resources: SchedulerResources,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobSpec {
    Prediction(PredictionSpec),
    Generation(GenerationSpec),
}

impl JobSpec {
    pub fn job_name(&self) -> &JobName {
        match self {
            JobSpec::Prediction(spec) => &spec.job_name,
            JobSpec::Generation(spec) => &spec.job_name,
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            JobSpec::Prediction(_) => JobKind::Prediction,
            JobSpec::Generation(_) => JobKind::Generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Prediction,
    Generation,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobKind::Prediction => "prediction",
            JobKind::Generation => "generation",
        })
    }
}

/// The scheduler's reference to a submitted job.
///
/// `scheduler_job_id` is opaque: it is stored and passed back to the scheduler verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub scheduler_job_id: String,
    pub job_name: JobName,
    pub kind: JobKind,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Unknown => "unknown",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn job_name_accepts_filesystem_safe_names() {
        for name in ["t1", "binder_gen_t1", "run-2.v3"] {
            assert!(JobName::new(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn job_name_rejects_path_separators_and_traversal() {
        for name in ["", "a/b", "a\\b", ".", "..", "has space", "semi;colon"] {
            assert!(JobName::new(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn timestamp_suffix_is_appended_in_utc() {
        let name = JobName::new("t1").unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(name.with_suffix_at(at).as_str(), "t1_20250304_050607");
    }

    #[test]
    fn child_names_are_indexed() {
        let name = JobName::new("binder_gen_t1").unwrap();
        assert_eq!(name.child("eval", 2).as_str(), "binder_gen_t1_eval_2");
    }

    #[test]
    fn job_name_deserialization_validates() {
        let ok: Result<JobName, _> = serde_json::from_str("\"t1\"");
        assert!(ok.is_ok());
        let bad: Result<JobName, _> = serde_json::from_str("\"../t1\"");
        assert!(bad.is_err());
    }

    #[test]
    fn generation_params_reject_non_positive_values() {
        assert!(GenerationParams::new(0, 10, 2.0).is_err());
        assert!(GenerationParams::new(100, 0, 2.0).is_err());
        assert!(GenerationParams::new(100, 10, 0.0).is_err());
        assert!(GenerationParams::new(100, 10, f64::NAN).is_err());
        assert_eq!(
            GenerationParams::new(100, 10, 2.0).unwrap(),
            GenerationParams::default()
        );
    }

    #[test]
    fn only_completed_failed_and_cancelled_are_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Unknown.is_terminal());
    }

    #[test]
    fn job_handle_serializes_round_trip() {
        let handle = JobHandle {
            scheduler_job_id: "12345".into(),
            job_name: JobName::new("t1").unwrap(),
            kind: JobKind::Prediction,
            submitted_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&handle).unwrap();
        assert!(json.contains("\"kind\":\"prediction\""));
        let back: JobHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handle);
    }
}
