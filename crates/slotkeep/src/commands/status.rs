//! Status command

use anyhow::Result;

use super::Context;
use crate::cli::SlotArgs;
use crate::output;

pub async fn run(args: SlotArgs, ctx: &Context) -> Result<()> {
    let saves = ctx.coordinator()?;
    let storage = saves.storage();
    let addresses = storage.describe(args.slot);

    output::section(&format!("Slot {}", args.slot));
    output::field("Storage", &storage.mode().to_string());
    output::field("Clean policy", &saves.clean_policy().to_string());
    output::field(
        "Primary",
        &format!(
            "{} ({})",
            output::presence(storage.exists(args.slot).await?),
            addresses.primary
        ),
    );
    output::field(
        "Backup",
        &format!(
            "{} ({})",
            output::presence(storage.backup_exists(args.slot).await?),
            addresses.backup
        ),
    );

    let indexed = saves
        .list_slots()
        .await?
        .into_iter()
        .find(|(slot, _)| *slot == args.slot);
    if let Some((_, info)) = indexed {
        output::field("Title", info.title.as_deref().unwrap_or("untitled"));
        output::field("Saved at", &info.saved_at.to_rfc3339());
        output::field("Size", &format!("{} bytes", info.size_bytes));
    }
    Ok(())
}
