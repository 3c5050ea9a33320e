use binderflow::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Fan-out incomplete: {0}")]
    FanOut(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(e) => match e {
                EngineError::Input(_)
                | EngineError::JobName(_)
                | EngineError::Params(_)
                | EngineError::JobNotFound(_) => 2,
                EngineError::Submission { .. } => 3,
                EngineError::Config(_) => 4,
                EngineError::Io { .. }
                | EngineError::Serialization { .. }
                | EngineError::Ledger { .. } => 5,
            },
            CliError::Argument(_) => 2,
            CliError::Config(_) | CliError::FileParsing { .. } => 4,
            CliError::Io(_) => 5,
            CliError::FanOut(_) => 6,
            CliError::Other(_) => 1,
        }
    }
}
