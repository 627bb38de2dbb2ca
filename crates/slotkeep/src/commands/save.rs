//! Save command

use anyhow::{Context as _, Result};
use tokio::io::AsyncReadExt;

use super::Context;
use crate::cli::SaveArgs;
use crate::output;

pub async fn run(args: SaveArgs, ctx: &Context) -> Result<()> {
    let blob = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read save data from stdin")?;
            buffer
        }
    };

    let saves = ctx.coordinator()?;
    let spinner = output::spinner(&format!("Saving slot {}...", args.slot));
    let outcome = saves.save(args.slot, &blob, args.title).await;
    spinner.finish_and_clear();

    for warning in &outcome.warnings {
        output::warning(warning);
    }

    if !outcome.is_success() {
        if let Some(cause) = &outcome.error {
            output::error(cause);
        }
        return Err(anyhow::anyhow!(
            "Save of slot {} failed ({})",
            args.slot,
            outcome.state
        ));
    }

    output::success(&format!("Saved slot {} ({} bytes)", args.slot, blob.len()));
    Ok(())
}
