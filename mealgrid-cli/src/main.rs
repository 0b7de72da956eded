use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod commands;
mod config;
mod suggestion_client;

use commands::{ConfigCommand, EditCommand, PlanCommand, RecipeCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "mealgrid")]
#[command(version)]
#[command(about = "Plan meals on a day-by-meal grid", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the recipe catalog
    Recipe(RecipeCommand),

    /// Create and inspect meal plans
    Plan(PlanCommand),

    /// Edit a meal plan interactively
    Edit(EditCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mealgrid=warn,mealgrid_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for init command
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;

    match &cli.command {
        Some(Commands::Recipe(cmd)) => cmd.run(&config)?,
        Some(Commands::Plan(cmd)) => cmd.run(&config)?,
        Some(Commands::Edit(cmd)) => cmd.run(&config)?,
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path)?,
        None => println!("Use --help to see available commands"),
    }

    Ok(())
}
