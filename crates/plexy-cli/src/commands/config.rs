use anyhow::{Context, Result};
use colored::Colorize;

use super::CliContext;

pub fn show(ctx: &CliContext) -> Result<()> {
    let service = ctx.config_service()?;
    let config = service
        .get_config()
        .with_context(|| format!("Failed to load {}", service.path().display()))?;

    println!("{}", format!("# {}", service.path().display()).dimmed());
    print!("{}", toml::to_string_pretty(&config).context("Failed to render configuration")?);

    Ok(())
}
