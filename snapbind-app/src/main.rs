use anyhow::Result;
use clap::Parser;
use snapbind_app::cli::{Action, Cli};
use snapbind_app::commands;
use snapbind_app::config::Config;
use snapbind_app::progress::ClearLineStderr;
use snapbind_platform::UserDirectories;
use std::process::ExitCode;
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let action = match cli.action() {
        Ok(action) => action,
        Err(e) => e.exit(),
    };
    match run(cli, action).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, action: Action) -> Result<bool> {
    let dirs = UserDirectories::discover();
    if let Action::ConfigInit { force } = action {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| Config::default_path(&dirs));
        commands::config::init(&path, force)?;
        return Ok(true);
    }

    let (config, path) = commands::load_config(cli.config.as_deref(), &dirs)?;
    init_logging(cli.verbose, &config.log_level);
    tracing::debug!("Configuration: {}", path.display());

    match action {
        Action::Install(args) => commands::install::run(config, dirs, &args).await,
        Action::Detect => {
            commands::detect::run(&config, &dirs).await?;
            Ok(true)
        }
        Action::ConfigShow => {
            commands::config::show(&config)?;
            Ok(true)
        }
        Action::ConfigInit { .. } => Ok(true),
    }
}

/// Logs go to stderr, each one starting on a cleared line.
fn init_logging(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured.parse::<Level>().unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(ClearLineStderr::detect())
        .with_max_level(level)
        .with_target(false)
        .init();
}
