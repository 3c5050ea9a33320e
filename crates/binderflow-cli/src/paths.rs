use crate::error::{CliError, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Per-user locations of binderflow's files.
#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self> {
        let config_dir = ProjectDirs::from("edu", "caltech", "binderflow")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| {
                CliError::Config("Could not determine the user configuration directory.".into())
            })?;
        debug!("Configuration directory: {:?}", &config_dir);
        Ok(Self { config_dir })
    }

    #[cfg(test)]
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn default_config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}
