//! proxymanager - hosts-file load balancer manager for nginx
//!
//! Keeps per-cluster host blocks in the hosts file and moves traffic
//! between hosts, restarting nginx after every change.

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use proxymanager::cli::{Cli, Commands};
use proxymanager::cmd_abstraction::RealCommandExecutor;
use proxymanager::commands::{self, Context};
use proxymanager::config::{resolve_config_path, Settings};
use proxymanager::fs_abstraction::real_fs;
use proxymanager::reload::{DevModeReloader, NginxReloader, Reloader};
use proxymanager::store::HostsFile;
use proxymanager::utils::check_root;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    // Logs go to stderr; stdout carries only the command result.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = resolve_config_path(cli.config.as_deref());
    debug!("Using config {}", config_path.display());
    let settings = Settings::load_or_default(&config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;

    if !settings.dev_mode {
        check_root()?;
    }

    let reloader: Box<dyn Reloader> = if settings.dev_mode {
        debug!("Dev mode enabled, nginx will not be touched");
        Box::new(DevModeReloader)
    } else {
        Box::new(NginxReloader::new(
            RealCommandExecutor::new(),
            &settings.reload,
        ))
    };

    let ctx = Context::new(
        HostsFile::new(&settings.load_balancer.hosts_file, real_fs()),
        reloader.as_ref(),
        settings.load_balancer.lock_file.clone(),
    );

    // Execute command
    let result = match cli.command {
        Commands::Lb { action } => commands::lb::run(action, &ctx).await,
    };

    match result {
        Ok(message) => println!("{}", message),
        Err(e) => {
            println!("{}", e);
            if e.is_critical() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
