//! Show command implementation.

use crate::cli::ShowArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use cyberpolicy_extractor::JsonFileSink;

/// Execute the show command.
pub fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let path = args.file.unwrap_or_else(|| config.paths.output.clone());
    let rules = JsonFileSink::load(&path)?;

    println!("{}", formatter.format_collection(&rules, args.country.as_deref())?);

    Ok(())
}
