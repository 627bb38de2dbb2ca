//! Load command

use anyhow::{Context as _, Result};

use super::Context;
use crate::cli::LoadArgs;
use crate::output;

pub async fn run(args: LoadArgs, ctx: &Context) -> Result<()> {
    let saves = ctx.coordinator()?;

    if !saves.exists(args.slot).await? {
        return Err(anyhow::anyhow!("Slot {} has no saved data", args.slot));
    }

    let blob = saves.load_game(args.slot).await?.unwrap_or_default();

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &blob)
                .await
                .with_context(|| format!("Failed to write {}", path))?;
            output::success(&format!("Wrote slot {} to {}", args.slot, path));
        }
        None => print!("{}", blob),
    }
    Ok(())
}
