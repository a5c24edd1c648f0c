//! Cyberpolicy CLI - extract cybercrime policy rules from policy documents.

use clap::Parser;
use cyberpolicy_cli::commands;
use cyberpolicy_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> cyberpolicy_cli::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so table and JSON output stay clean on stdout
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config, &formatter)?,
        Command::Locate(args) => commands::execute_locate(args, &config, &formatter)?,
        Command::Plan(args) => commands::execute_plan(args, &config, &formatter)?,
        Command::Show(args) => commands::execute_show(args, &config, &formatter)?,
        Command::Config(args) => {
            let target = match cli.config {
                Some(path) => path,
                None => Config::path()?,
            };
            commands::execute_config(args, &config, &target, &formatter)?
        }
    }

    Ok(())
}
