// Example configuration generation

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::Path;
use token_issuer::config::create_example_config;

use super::utils::success;

#[derive(Args)]
pub struct InitConfigCmd {
    /// Output path
    #[arg(default_value = "issuer.toml")]
    path: String,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub fn execute(cmd: InitConfigCmd) -> Result<()> {
    if Path::new(&cmd.path).exists() && !cmd.force {
        bail!("{} already exists, use --force to overwrite", cmd.path);
    }

    create_example_config(&cmd.path)
        .with_context(|| format!("Failed to write config to {}", cmd.path))?;

    success(&format!("Configuration saved to: {}", cmd.path));
    Ok(())
}
