mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod paths;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::paths::AppPaths;
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run_app(cli).await {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("binderflow v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let paths = AppPaths::new()?;
    let resolve_config = || {
        let config = config::resolve(cli.config.as_deref(), &cli.set_values, &paths)?;
        debug!("Resolved configuration: {:?}", &config);
        Ok::<_, CliError>(config)
    };

    match cli.command {
        Commands::Evaluate(args) => {
            info!("Dispatching to 'evaluate' command.");
            commands::evaluate::run(args, &resolve_config()?).await
        }
        Commands::Generate(args) => {
            info!("Dispatching to 'generate' command.");
            commands::generate::run(args, &resolve_config()?).await
        }
        Commands::Status(args) => {
            info!("Dispatching to 'status' command.");
            commands::status::run(args, &resolve_config()?).await
        }
        Commands::Collect(args) => {
            info!("Dispatching to 'collect' command.");
            commands::collect::run(args, &resolve_config()?).await
        }
        Commands::FanOut(args) => {
            info!("Dispatching to 'fan-out' command.");
            commands::fan_out::run(args, &resolve_config()?).await
        }
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref(), &paths),
    }
}
