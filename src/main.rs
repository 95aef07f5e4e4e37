//! renv - manage hierarchical application configuration stored in etcd.

use std::{error::Error, path::PathBuf, process};

use clap::Parser;
use renv::{
    cli::{
        CliService, ConfigContext,
        formatting::{OutputFormat, format_error},
        route,
    },
    config_store::ConfigService,
    settings::{Settings, SettingsOverrides},
    tracing_config,
};
use tracing::debug;

#[derive(Parser)]
#[command(name = "renv", version)]
#[command(about = "Hierarchical application configuration stored in etcd")]
#[command(after_help = "Run `renv help` to list every command.")]
struct Cli {
    /// Command to run, e.g. `config`, `config:set`, `config:nuke`
    command: Option<String>,

    /// Arguments for the command
    args: Vec<String>,

    /// What environment is being configured, e.g. development, production
    #[arg(short, long)]
    environment: Option<String>,

    /// What application is this configuration for
    #[arg(short, long)]
    application: Option<String>,

    /// etcd host:port pairs, tried in order; takes several values or repeats
    #[arg(long = "hosts", alias = "host", num_args = 1..)]
    hosts: Vec<String>,

    /// Certificate authority file for TLS; repeatable
    #[arg(long = "ca-path")]
    ca_paths: Vec<PathBuf>,

    /// Client certificate for TLS
    #[arg(long)]
    cert_path: Option<PathBuf>,

    /// Client key for TLS
    #[arg(long)]
    key_path: Option<PathBuf>,

    /// How trees are printed
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
    output: OutputFormat,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            application: self.application.clone(),
            environment: self.environment.clone(),
            hosts: self.hosts.clone(),
            ca_paths: self.ca_paths.clone(),
            cert_path: self.cert_path.clone(),
            key_path: self.key_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_config::init()?;

    if let Err(e) = run(cli).await {
        eprintln!("{}", format_error(&e.to_string()));
        process::exit(1);
    }

    Ok(())
}

/// Resolves settings, connects, and dispatches `category:name` to the registry.
///
/// # Errors
/// Returns error if settings cannot be resolved or the command fails.
async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let settings = Settings::load(&cli.overrides())?;
    let service = ConfigService::connect(&settings)?;
    let cli_service = CliService::new(ConfigContext::new(service, settings, cli.output));

    let invocation = cli.command.as_deref().unwrap_or("help");
    if invocation == "help" {
        println!("{}", cli_service.help());
        return Ok(());
    }

    let (category, command) = route(invocation);
    debug!(category, command, args = ?cli.args, "dispatching command");

    let output = cli_service
        .execute_command(category, command, &cli.args)
        .await?;

    if !output.trim().is_empty() {
        println!("{output}");
    }

    Ok(())
}
