//! One extension invocation: resolve the model, build the prompt, generate,
//! clean up, and write the result into the document.

use anyhow::{Context, Result, bail};
use inkgen_providers::{ModelClient, TextGenerator};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::document::{EditContext, NodeId};
use crate::layout::layout;
use crate::locator::locate_text;
use crate::prompts::{build_context_prompt, build_create_prompt};
use crate::render::{insert_text_block, rewrite_text};
use crate::sanitize::{SanitizeOptions, sanitize};

/// Minimum trimmed prompt length in create mode.
const MIN_PROMPT_CHARS: usize = 3;

/// What an invocation did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new text group was inserted.
    Created(NodeId),
    /// The located text element was rewritten in place.
    Rewritten(NodeId),
    /// The model returned nothing usable; the document was left alone.
    Unchanged,
}

/// Checks the settings that must hold before any request is made.
///
/// # Errors
/// Returns an error if the API URL is empty, or if a model is required
/// but neither configured nor auto-detectable.
pub fn validate(config: &Config) -> Result<()> {
    if config.api_url.trim().is_empty() {
        bail!("Please provide a valid API URL for local LLM in the API Config tab.");
    }
    if config.local_model.trim().is_empty()
        && !config.auto_detect_model
        && config.api_provider.requires_model()
    {
        bail!("Please specify a local model name in the API Config tab.");
    }
    Ok(())
}

/// Fills in the model name when none is configured and auto-detection is on.
///
/// Detection failure is only fatal for backends that cannot run without a
/// model; the others proceed and let the server pick.
///
/// # Errors
/// Returns an error if a required model cannot be detected.
pub async fn resolve_model(config: &Config, client: &mut ModelClient) -> Result<()> {
    if client.model().is_some() || !config.auto_detect_model {
        return Ok(());
    }

    match client.detect_model().await {
        Ok(model) => {
            info!("Auto-detected model: {model}");
            client.set_model(model);
            Ok(())
        }
        Err(err) if client.backend().requires_model() => Err(anyhow::Error::new(err).context(
            "Could not auto-detect model. Please specify a model name in the API Config tab.",
        )),
        Err(err) => {
            warn!("Could not auto-detect model: {err}");
            Ok(())
        }
    }
}

async fn generate_clean<G: TextGenerator>(
    generator: &G,
    prompt: &str,
    config: &Config,
) -> Result<String> {
    let raw = generator.generate(prompt).await?;
    let text = sanitize(&raw, SanitizeOptions::from(config));
    debug!(
        "Cleaned text (first 200 chars): {}",
        text.chars().take(200).collect::<String>()
    );
    Ok(text)
}

/// Runs the configured operation against `ctx` using `generator`.
///
/// # Errors
/// Returns an error when the selection or prompt does not fit the mode, or
/// when generation fails. The document is not modified in either case.
pub async fn apply<G: TextGenerator>(
    config: &Config,
    ctx: &mut EditContext,
    generator: &G,
) -> Result<Outcome> {
    let mode = config.operation_mode;

    if mode.needs_selection() {
        let Some(target) = locate_text(&ctx.document, &ctx.selection) else {
            bail!(
                "Please select a text object for {} mode.\n\
                 Make sure you've selected a text element (not a group or other object).",
                mode.id()
            );
        };
        debug!(mode = mode.id(), chars = target.text.chars().count(), "Located text");

        let prompt = build_context_prompt(config, &target.text);
        let text = generate_clean(generator, &prompt, config).await?;
        if text.is_empty() {
            warn!("Model returned no text; document left unchanged");
            return Ok(Outcome::Unchanged);
        }
        rewrite_text(&mut ctx.document, &target, &text, config);
        return Ok(Outcome::Rewritten(target.node));
    }

    if config.prompt.trim().chars().count() < MIN_PROMPT_CHARS {
        bail!("Please provide a prompt for text generation in the Prompt tab.");
    }

    let prompt = build_create_prompt(config);
    let text = generate_clean(generator, &prompt, config).await?;
    if text.is_empty() {
        warn!("Model returned no text; document left unchanged");
        return Ok(Outcome::Unchanged);
    }

    let selection_center = ctx
        .selection
        .iter()
        .find_map(|node| ctx.document.bounding_box(*node))
        .map(|bbox| bbox.center());
    let laid_out = layout(&text, config, ctx.document.size(), selection_center);
    let group = insert_text_block(&mut ctx.document, &laid_out, config);
    Ok(Outcome::Created(group))
}

/// Full invocation against the configured backend.
///
/// # Errors
/// Returns configuration, detection and generation errors.
pub async fn run(config: &Config, ctx: &mut EditContext) -> Result<Outcome> {
    validate(config)?;
    let mut client =
        ModelClient::new(config.client_config()).context("Invalid API configuration")?;
    resolve_model(config, &mut client).await?;
    apply(config, ctx, &client).await
}
