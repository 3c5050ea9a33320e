use crate::cli::CollectArgs;
use crate::error::Result;
use binderflow::core::models::result::BindingResult;
use binderflow::engine::config::WorkflowConfig;
use binderflow::engine::context::WorkflowContext;
use binderflow::engine::progress::ProgressReporter;
use binderflow::workflows::evaluate;
use std::fmt::Write;
use tracing::info;

pub async fn run(args: CollectArgs, config: &WorkflowConfig) -> Result<()> {
    let reporter = ProgressReporter::new();
    let ctx = WorkflowContext::new(config, &reporter);

    info!("Collecting results of '{}'", args.job_name);
    let result = evaluate::collect(&ctx, &args.job_name);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| anyhow::anyhow!("Failed to serialize result: {}", e))?;
        println!("{}", json);
    } else {
        print!("{}", summarize(&result));
    }
    Ok(())
}

/// Human-readable summary of a collected result.
pub(crate) fn summarize(result: &BindingResult) -> String {
    let mut out = String::new();
    let score =
        |value: Option<f64>| value.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v));

    let _ = writeln!(out, "Results for '{}'", result.job_name);
    if !result.result_dir_exists {
        let _ = writeln!(out, "  No result directory found.");
    }
    let _ = writeln!(out, "  pTM:                {}", score(result.ptm_score));
    let _ = writeln!(out, "  ipTM:               {}", score(result.iptm_score));
    let _ = writeln!(out, "  Overall confidence: {}", score(result.overall_confidence));
    let _ = writeln!(out, "  Binding quality:    {}", result.binding_quality);
    let _ = writeln!(out, "  Models:             {}", result.num_models);
    if let Some(structure) = &result.structure_file {
        let _ = writeln!(out, "  Best structure:     {}", structure.display());
    }
    for error in &result.errors {
        let _ = writeln!(out, "  ! {}", error);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use binderflow::core::models::result::BindingQuality;
    use std::path::PathBuf;

    fn result() -> BindingResult {
        BindingResult {
            job_name: "t1".to_string(),
            result_dir_exists: true,
            ptm_score: Some(0.75),
            iptm_score: Some(0.85),
            structure_file: Some(PathBuf::from("af_output/fold_t1/fold_t1_model_0.cif")),
            num_models: 5,
            binding_quality: BindingQuality::High,
            overall_confidence: Some(0.8),
            errors: Vec::new(),
        }
    }

    #[test]
    fn summary_shows_scores_and_quality() {
        let text = summarize(&result());
        assert!(text.contains("Results for 't1'"));
        assert!(text.contains("ipTM:               0.850"));
        assert!(text.contains("Binding quality:    high"));
        assert!(text.contains("fold_t1_model_0.cif"));
        assert!(!text.contains("No result directory"));
    }

    #[test]
    fn summary_of_missing_results_lists_the_gaps() {
        let result = BindingResult {
            result_dir_exists: false,
            ptm_score: None,
            iptm_score: None,
            structure_file: None,
            num_models: 0,
            binding_quality: BindingQuality::Unknown,
            overall_confidence: None,
            errors: vec!["Result directory not found".to_string()],
            ..result()
        };
        let text = summarize(&result);
        assert!(text.contains("No result directory found."));
        assert!(text.contains("pTM:                n/a"));
        assert!(text.contains("! Result directory not found"));
    }

    #[test]
    fn json_output_uses_field_names() {
        let json = serde_json::to_value(result()).unwrap();
        assert_eq!(json["binding_quality"], "high");
        assert_eq!(json["num_models"], 5);
    }
}
