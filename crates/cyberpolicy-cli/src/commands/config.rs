//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
///
/// Prints the effective configuration; with `--write` it is also saved to
/// `target`, which is the `--config` path or the default location.
pub fn execute_config(args: ConfigArgs, config: &Config, target: &Path, formatter: &Formatter) -> Result<()> {
    print!("{}", config.to_toml()?);

    if args.write {
        config.save(target)?;
        println!("{}", formatter.success(&format!("Configuration saved to {}", target.display())));
    }

    Ok(())
}
