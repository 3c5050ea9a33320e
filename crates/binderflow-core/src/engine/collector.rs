use crate::core::models::result::BindingResult;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CONFIDENCE_FILE_NAME: &str = "summary_confidences.json";
const STRUCTURE_EXTENSIONS: [&str; 2] = ["cif", "pdb"];

/// Directory the prediction tool writes a job's artifacts to.
pub fn result_dir(output_root: &Path, job_name: &str) -> PathBuf {
    output_root.join(format!("fold_{}", job_name))
}

/// Whether the prediction tool finished writing the job's confidence document.
pub fn has_completion_marker(output_root: &Path, job_name: &str) -> bool {
    result_dir(output_root, job_name)
        .join(CONFIDENCE_FILE_NAME)
        .is_file()
}

/// Extracts binding metrics from a prediction job's output directory.
///
/// This never fails. Every missing or unreadable artifact is recorded in
/// [`BindingResult::errors`] and the fields it would have filled stay empty.
pub fn collect(output_root: &Path, job_name: &str) -> BindingResult {
    let mut result = BindingResult::empty(job_name);
    let dir = result_dir(output_root, job_name);

    if !dir.is_dir() {
        let message = format!("Result directory not found: {}", dir.display());
        warn!("{}", message);
        result.errors.push(message);
        return result;
    }
    result.result_dir_exists = true;

    match read_scores(&dir.join(CONFIDENCE_FILE_NAME)) {
        Ok((ptm, iptm)) => result.set_scores(ptm, iptm),
        Err(message) => {
            warn!("{}", message);
            result.errors.push(message);
        }
    }

    match model_files(&dir) {
        Ok(models) if models.is_empty() => {
            let message = format!("No model structure files in {}", dir.display());
            warn!("{}", message);
            result.errors.push(message);
        }
        Ok(models) => {
            result.num_models = models.len();
            result.structure_file = models.into_iter().next();
        }
        Err(message) => {
            warn!("{}", message);
            result.errors.push(message);
        }
    }

    info!(
        "Collected '{}': quality {}, {} model(s), {} gap(s)",
        job_name,
        result.binding_quality,
        result.num_models,
        result.errors.len()
    );
    result
}

/// Lists the structures a generation job wrote, sorted by name.
///
/// Only `binders_<job_name>_<index>.pdb` files belong to the job, so designs of a
/// sibling job such as `<job_name>_<timestamp>` are not picked up. A missing directory
/// yields an empty list.
pub fn collect_generated_structures(output_dir: &Path, job_name: &str) -> Vec<PathBuf> {
    let prefix = format!("binders_{}_", job_name);
    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list {:?}: {}", output_dir, e);
            return Vec::new();
        }
    };

    let mut structures: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && has_extension(path, &["pdb"])
                && file_name(path).is_some_and(|name| is_design_of(name, &prefix))
        })
        .collect();
    structures.sort();
    structures
}

fn is_design_of(file_name: &str, prefix: &str) -> bool {
    file_name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".pdb"))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

fn read_scores(path: &Path) -> Result<(f64, f64), String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let document: Value = serde_json::from_str(&content)
        .map_err(|e| format!("Malformed {}: {}", path.display(), e))?;
    if !document.is_object() {
        return Err(format!("Malformed {}: not a JSON object", path.display()));
    }

    // Nested `confidences` wins; otherwise the tool's top-level keys are used.
    let scores = document
        .get("confidences")
        .filter(|v| v.is_object())
        .unwrap_or(&document);
    let score = |key: &str| scores.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    Ok((score("ptm"), score("iptm")))
}

fn model_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries =
        fs::read_dir(dir).map_err(|e| format!("Cannot list {}: {}", dir.display(), e))?;
    let mut models: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && has_extension(path, &STRUCTURE_EXTENSIONS)
                && file_name(path).is_some_and(|name| name.contains("_model_"))
        })
        .collect();
    models.sort();
    Ok(models)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
