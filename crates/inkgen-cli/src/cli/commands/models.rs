//! Models command handler.

use anyhow::{Context, Result};
use inkgen_core::config::Config;
use inkgen_providers::ModelClient;

/// Prints the model ids the configured backend lists, one per line.
pub async fn list(config: &Config) -> Result<()> {
    let client = ModelClient::new(config.client_config()).context("Invalid API configuration")?;
    let models = client.list_models().await?;
    if models.is_empty() {
        eprintln!("{} reported no models", client.backend().label());
        return Ok(());
    }
    for model in models {
        println!("{model}");
    }
    Ok(())
}
