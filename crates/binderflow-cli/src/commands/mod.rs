pub mod collect;
pub mod config;
pub mod evaluate;
pub mod fan_out;
pub mod generate;
pub mod status;

use crate::error::Result;
use binderflow::core::io::input_file::InputDocument;
use binderflow::engine::context::SubmitOutcome;
use binderflow::engine::error::EngineError;
use binderflow::engine::loader;
use std::path::Path;
use tracing::info;

pub(crate) fn load_input(path: &Path) -> Result<InputDocument> {
    info!("Reading input file {:?}", path);
    let document = loader::load_input_file(path).map_err(EngineError::from)?;
    Ok(document)
}

pub(crate) fn describe_outcome(outcome: &SubmitOutcome) -> String {
    let handle = outcome.handle();
    if outcome.is_new() {
        format!(
            "Submitted {} job '{}' as scheduler job {}",
            handle.kind, handle.job_name, handle.scheduler_job_id
        )
    } else {
        format!(
            "Job '{}' was already submitted as scheduler job {} at {}; use --force to resubmit \
             or --unique for a fresh name",
            handle.job_name,
            handle.scheduler_job_id,
            handle.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use binderflow::core::models::job::JobHandle;

    pub(crate) fn recorded_handle() -> JobHandle {
        serde_json::from_str(
            r#"{
                "scheduler_job_id": "12345",
                "job_name": "t1",
                "kind": "prediction",
                "submitted_at": "2025-10-17T09:30:00Z"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn new_submissions_name_the_scheduler_job() {
        let line = describe_outcome(&SubmitOutcome::Submitted(recorded_handle()));
        assert_eq!(line, "Submitted prediction job 't1' as scheduler job 12345");
    }

    #[test]
    fn repeated_submissions_point_at_the_override_flags() {
        let line = describe_outcome(&SubmitOutcome::AlreadySubmitted(recorded_handle()));
        assert!(line.contains("scheduler job 12345"));
        assert!(line.contains("2025-10-17 09:30:00 UTC"));
        assert!(line.contains("--force"));
    }

    #[test]
    fn missing_input_file_is_an_input_error() {
        let err = load_input(Path::new("/no/such/input.txt")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
