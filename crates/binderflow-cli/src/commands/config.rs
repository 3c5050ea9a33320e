use crate::cli::{ConfigArgs, ConfigCommands};
use crate::config::DEFAULT_CONFIG_TEMPLATE;
use crate::error::{CliError, Result};
use crate::paths::AppPaths;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn run(args: ConfigArgs, explicit: Option<&Path>, paths: &AppPaths) -> Result<()> {
    let target = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.default_config_file());

    match args.command {
        ConfigCommands::Path => {
            println!("{}", target.display());
            if !target.is_file() {
                println!("(not created yet; run `binderflow config init`)");
            }
        }
        ConfigCommands::Init { force } => {
            write_template(&target, force)?;
            println!("Wrote default configuration to {}", target.display());
            println!("Edit the install paths before submitting jobs.");
        }
    }
    Ok(())
}

fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::Argument(format!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    info!("Writing configuration template to {:?}", path);
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    Ok(())
}
