//! Delete command

use anyhow::Result;

use super::Context;
use crate::cli::SlotArgs;
use crate::output;

pub async fn run(args: SlotArgs, ctx: &Context) -> Result<()> {
    let saves = ctx.coordinator()?;
    saves.delete_game(args.slot).await?;
    output::success(&format!("Deleted slot {}", args.slot));
    Ok(())
}
