//! Meridian CLI - validate, repair and score a YAML content corpus.

use clap::Parser;
use meridian_cli::commands::{self, Context};
use meridian_cli::{Cli, Command, Config, Formatter};
use meridian_engine::ExitStatus;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(status) => std::process::exit(status.code()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> meridian_cli::Result<ExitStatus> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let ctx = Context::resolve(cli.corpus, cli.schema, &config)?;

    match cli.command {
        Command::Validate(args) => commands::execute_validate(args, &ctx, &formatter),
        Command::Repair(args) => commands::execute_repair(args, &ctx, &formatter),
        Command::Score(args) => commands::execute_score(args, &ctx, &formatter),
    }
}
