//! List command

use anyhow::Result;
use chrono::Local;

use super::Context;
use crate::cli::ListArgs;
use crate::output;

pub async fn run(args: ListArgs, ctx: &Context) -> Result<()> {
    let saves = ctx.coordinator()?;
    let slots = saves.list_slots().await?;

    if args.json {
        let entries: Vec<_> = slots
            .iter()
            .map(|(slot, info)| {
                serde_json::json!({
                    "slot": slot,
                    "title": info.title,
                    "savedAt": info.saved_at,
                    "sizeBytes": info.size_bytes,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if slots.is_empty() {
        output::info("No saved slots");
        return Ok(());
    }

    output::section("Saved slots");
    for (slot, info) in &slots {
        let saved_at = info.saved_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
        output::field(
            &format!("Slot {}", slot),
            &format!(
                "{} ({}, {} bytes)",
                info.title.as_deref().unwrap_or("untitled"),
                saved_at,
                info.size_bytes
            ),
        );
    }
    Ok(())
}
