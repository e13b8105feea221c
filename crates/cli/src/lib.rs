pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::suggest::SuggestArgs;
use crate::commands::validate::ValidateArgs;

#[derive(Debug, Parser)]
#[command(
    name = "hotelscout",
    about = "Hotel suggestions within a travel budget",
    long_about = "Ask a reasoning service for exactly three hotel suggestions that fit a city, dates and total budget, and validate the structured answer.",
    after_help = "Examples:\n  hotelscout suggest --city Paris --check-in 2025-10-12 --nights 3 --budget 1500\n  hotelscout suggest --interactive --trace-level 2\n  hotelscout validate response.json\n  hotelscout config"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Config file (default: hotelscout.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one planning cycle and print the hotels response as JSON")]
    Suggest(SuggestArgs),
    #[command(about = "Validate a hotels response document against the schema")]
    Validate(ValidateArgs),
    #[command(about = "Print the JSON Schema sent to the reasoning service")]
    Schema,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Suggest(args) => commands::suggest::run(args, cli.config),
        Command::Validate(args) => commands::validate::run(args),
        Command::Schema => commands::schema::run(),
        Command::Config => commands::config::run(cli.config),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
