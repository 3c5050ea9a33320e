use super::error::EngineError;
use crate::core::models::job::{JobHandle, JobName};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// On-disk record of submitted jobs, one JSON file per job name.
///
/// The ledger lets later invocations find a job's scheduler id by name, and lets
/// submission recognize a job name that has already been handed to the scheduler.
#[derive(Debug, Clone)]
pub struct JobLedger {
    dir: PathBuf,
}

impl JobLedger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, job_name: &JobName) -> PathBuf {
        self.dir.join(format!("{}.json", job_name))
    }

    /// Persists a handle, replacing any earlier entry under the same job name.
    pub fn record(&self, handle: &JobHandle) -> Result<(), EngineError> {
        fs::create_dir_all(&self.dir).map_err(|e| EngineError::io(&self.dir, e))?;
        let path = self.entry_path(&handle.job_name);
        let json = serde_json::to_string_pretty(handle).map_err(|source| {
            EngineError::Serialization {
                what: "job handle",
                source,
            }
        })?;

        // Entries are replaced atomically.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| EngineError::io(&staging, e))?;
        fs::rename(&staging, &path).map_err(|e| EngineError::io(&path, e))?;
        debug!("Recorded job '{}' in {:?}", handle.job_name, path);
        Ok(())
    }

    /// Looks a job up by name; `Ok(None)` when no entry exists.
    pub fn find(&self, job_name: &JobName) -> Result<Option<JobHandle>, EngineError> {
        let path = self.entry_path(job_name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EngineError::io(&path, e)),
        };
        let handle: JobHandle =
            serde_json::from_str(&content).map_err(|e| EngineError::Ledger {
                path: path.clone(),
                message: e.to_string(),
            })?;
        if &handle.job_name != job_name {
            return Err(EngineError::Ledger {
                path,
                message: format!("entry is for job '{}'", handle.job_name),
            });
        }
        Ok(Some(handle))
    }

    /// Like [`find`](Self::find), but a missing entry is an error.
    pub fn get(&self, job_name: &JobName) -> Result<JobHandle, EngineError> {
        self.find(job_name)?
            .ok_or_else(|| EngineError::JobNotFound(job_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::job::JobKind;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn handle(job: &str, id: &str) -> JobHandle {
        JobHandle {
            scheduler_job_id: id.into(),
            job_name: JobName::new(job).unwrap(),
            kind: JobKind::Prediction,
            submitted_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn recorded_handles_are_found_by_name() {
        let dir = tempdir().unwrap();
        let ledger = JobLedger::new(dir.path().join("jobs"));
        let name = JobName::new("t1").unwrap();

        assert_eq!(ledger.find(&name).unwrap(), None);

        ledger.record(&handle("t1", "12345")).unwrap();
        assert_eq!(ledger.find(&name).unwrap(), Some(handle("t1", "12345")));
        assert_eq!(ledger.get(&name).unwrap().scheduler_job_id, "12345");
    }

    #[test]
    fn recording_again_replaces_the_entry() {
        let dir = tempdir().unwrap();
        let ledger = JobLedger::new(dir.path());
        ledger.record(&handle("t1", "1")).unwrap();
        ledger.record(&handle("t1", "2")).unwrap();
        let name = JobName::new("t1").unwrap();
        assert_eq!(ledger.get(&name).unwrap().scheduler_job_id, "2");
        assert!(!dir.path().join("t1.json.tmp").exists());
    }

    #[test]
    fn missing_entry_is_job_not_found() {
        let dir = tempdir().unwrap();
        let ledger = JobLedger::new(dir.path());
        let err = ledger.get(&JobName::new("nope").unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::JobNotFound(name) if name == "nope"));
    }

    #[test]
    fn corrupt_entry_is_a_ledger_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("t1.json"), "{").unwrap();
        let ledger = JobLedger::new(dir.path());
        let err = ledger.find(&JobName::new("t1").unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::Ledger { .. }));
    }
}
