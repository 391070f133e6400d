//! Default command: run the effect on one SVG document.

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use inkgen_core::config::Config;
use inkgen_core::document::{EditContext, SvgDocument};
use inkgen_core::effect::{self, Outcome};
use tracing::info;

use crate::cli::options::EffectArgs;

fn read_input(args: &EffectArgs) -> Result<String> {
    match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read SVG from stdin")?;
            Ok(source)
        }
    }
}

fn write_output(args: &EffectArgs, svg: &str) -> Result<()> {
    match &args.output {
        Some(path) => {
            fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(svg.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write SVG to stdout")
        }
    }
}

/// Reads the document, applies the configured operation and writes the
/// result. Nothing is written when the operation fails.
pub async fn run(args: &EffectArgs, config: &Config) -> Result<()> {
    let source = read_input(args)?;
    let document = SvgDocument::parse(&source).context("Failed to parse SVG document")?;
    let mut ctx = EditContext::with_selection(document, &args.id);

    match effect::run(config, &mut ctx).await? {
        Outcome::Created(node) => {
            let id = ctx.document.attribute(node, "id").unwrap_or_default();
            info!(id, "Inserted generated text");
        }
        Outcome::Rewritten(node) => {
            let id = ctx.document.attribute(node, "id").unwrap_or_default();
            info!(id, "Rewrote selected text");
        }
        Outcome::Unchanged => {}
    }

    write_output(args, &ctx.document.to_xml_string())
}
