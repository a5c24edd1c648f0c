//! Locate command implementation.

use crate::cli::LocateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use cyberpolicy_extractor::locate_documents;

/// Execute the locate command.
pub fn execute_locate(args: LocateArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let root = args.policies.unwrap_or_else(|| config.paths.policies_dir.clone());
    let documents = locate_documents(&root, &config.pipeline.document_extension)?;

    println!("{}", formatter.format_documents(&documents)?);

    Ok(())
}
