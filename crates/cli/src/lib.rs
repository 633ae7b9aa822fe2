pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "greenearth",
    about = "GreenEarth operator CLI",
    long_about = "Prepare the GreenEarth database, inspect configuration, check readiness, and chat with the marketplace assistant.",
    after_help = "Examples:\n  greenearth doctor --json\n  greenearth seed\n  greenearth chat --role buyer --user-id u-42"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the reference marketplace dataset and verify every record is present")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, database connectivity, and LLM client readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Start an interactive chat with the marketplace assistant")]
    Chat {
        #[arg(long, help = "Skip the role question (buyer or seller)")]
        role: Option<String>,
        #[arg(long, help = "User id whose saved footprint should inform answers")]
        user_id: Option<String>,
        #[arg(long, help = "Buyer persona key used for recommendations")]
        profile: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Chat { role, user_id, profile } => {
            commands::chat::run(commands::chat::ChatOptions { role, user_id, profile })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
