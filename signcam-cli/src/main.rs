use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod launcher;
mod prompts;
mod recognizer;
mod runtime_env;
mod service;

#[derive(Parser)]
#[command(
    name = "signcam",
    about = "Start the device daemon and launch the USB-camera sign recognizer"
)]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the launch sequence (the default)
    Launch,
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Print a shell wrapper that returns the shell to $HOME after a launch
    ShellInit(commands::shell_init::ShellInitArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Launch) {
        Commands::Launch => commands::launch::run().await,
        Commands::Config(args) => commands::config::run(args).map(|()| ExitCode::SUCCESS),
        Commands::ShellInit(args) => commands::shell_init::run(args).map(|()| ExitCode::SUCCESS),
    }
}
