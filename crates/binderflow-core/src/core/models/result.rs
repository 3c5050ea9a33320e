use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Interface iptm above which a complex is classified as a high-quality binder.
pub const HIGH_IPTM_THRESHOLD: f64 = 0.8;
/// Interface iptm above which (and up to [`HIGH_IPTM_THRESHOLD`]) a complex is medium quality.
pub const MEDIUM_IPTM_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingQuality {
    High,
    Medium,
    Low,
    Unknown,
}

impl BindingQuality {
    pub fn from_iptm(iptm: f64) -> Self {
        if iptm > HIGH_IPTM_THRESHOLD {
            BindingQuality::High
        } else if iptm > MEDIUM_IPTM_THRESHOLD {
            BindingQuality::Medium
        } else {
            BindingQuality::Low
        }
    }
}

impl fmt::Display for BindingQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingQuality::High => "high",
            BindingQuality::Medium => "medium",
            BindingQuality::Low => "low",
            BindingQuality::Unknown => "unknown",
        })
    }
}

/// Binding metrics extracted from a prediction job's artifacts.
///
/// Built from whatever artifacts exist. Missing artifacts are recorded in `errors`
/// and leave the corresponding fields empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingResult {
    pub job_name: String,
    pub result_dir_exists: bool,
    pub ptm_score: Option<f64>,
    pub iptm_score: Option<f64>,
    pub structure_file: Option<PathBuf>,
    pub num_models: usize,
    pub binding_quality: BindingQuality,
    pub overall_confidence: Option<f64>,
    pub errors: Vec<String>,
}

impl BindingResult {
    pub(crate) fn empty(job_name: &str) -> Self {
        Self {
            job_name: job_name.to_string(),
            result_dir_exists: false,
            ptm_score: None,
            iptm_score: None,
            structure_file: None,
            num_models: 0,
            binding_quality: BindingQuality::Unknown,
            overall_confidence: None,
            errors: Vec::new(),
        }
    }

    /// Sets both scores and derives the quality class and overall confidence from them.
    pub(crate) fn set_scores(&mut self, ptm: f64, iptm: f64) {
        self.ptm_score = Some(ptm);
        self.iptm_score = Some(iptm);
        self.binding_quality = BindingQuality::from_iptm(iptm);
        self.overall_confidence = Some((ptm + iptm) / 2.0);
    }
}
