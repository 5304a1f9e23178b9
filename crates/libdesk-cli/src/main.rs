mod cli;
mod commands;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use libdesk_client::ClientConfig;
use libdesk_client::config::loader::load_config;

use cli::{Cli, Commands};
use commands::App;
use output::print_error;

#[tokio::main]
async fn main() {
    observability::load_dotenv();
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Layer command-line flags over the loaded configuration.
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(server) = &cli.server {
        config.base_url = server.clone();
    }
    if let Some(profile) = &cli.profile {
        config.profile = profile.clone();
    }
    if cli.verbose {
        config.log_level = "debug".to_string();
    }
    config.validate()?;
    Ok(config)
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    if let Commands::Config(args) = &cli.command
        && commands::config::edit(&args.command, cli.config.as_deref())?
    {
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    observability::init_tracing(&config.log_level);
    tracing::debug!(base_url = %config.base_url, profile = %config.profile, "configuration resolved");

    let format = cli.format.unwrap_or_default();

    if let Commands::Config(_) = &cli.command {
        commands::config::show(&config, format);
        return Ok(());
    }

    let mut app = App::new(config, format)?;
    match &cli.command {
        Commands::Login(args) => commands::auth::login(&mut app, args).await?,
        Commands::Register(args) => commands::auth::register(&mut app, args).await?,
        Commands::Logout => commands::auth::logout(&mut app)?,
        Commands::Whoami => commands::auth::whoami(&mut app).await?,
        Commands::Dashboard => commands::user::dashboard(&mut app).await?,
        Commands::Profile(args) => commands::user::profile(&mut app, &args.command).await?,
        Commands::Books(args) => commands::books::run(&mut app, &args.command).await?,
        Commands::Members(args) => commands::members::run(&mut app, &args.command).await?,
        Commands::Loans(args) => commands::loans::run(&mut app, &args.command).await?,
        Commands::Admin(args) => commands::admin::run(&mut app, &args.command).await?,
        Commands::Config(_) => {}
    }

    Ok(())
}
