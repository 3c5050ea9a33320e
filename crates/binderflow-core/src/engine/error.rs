use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;
use super::loader::LoadError;
use crate::core::models::job::{InvalidGenerationParams, InvalidJobName};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Input error: {0}")]
    Input(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    JobName(#[from] InvalidJobName),

    #[error(transparent)]
    Params(#[from] InvalidGenerationParams),

    #[error("Submission of job '{job_name}' failed ({command}): {message}")]
    Submission {
        job_name: String,
        command: String,
        message: String,
    },

    #[error("I/O error at '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Job ledger entry '{path}' is unreadable: {message}", path = path.display())]
    Ledger { path: PathBuf, message: String },

    #[error("No submitted job named '{0}' is recorded in the job ledger")]
    JobNotFound(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
