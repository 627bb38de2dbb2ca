//! Backup commands

use anyhow::Result;
use clap::Subcommand;

use super::Context;
use crate::cli::SlotArgs;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Copy the current slot data to its backup
    Create(SlotArgs),

    /// Put the backup back as the slot data and drop it
    Restore(SlotArgs),

    /// Delete the backup, keeping the slot data
    Clean(SlotArgs),

    /// Print the backup data
    Show(SlotArgs),
}

pub async fn run(cmd: BackupCommands, ctx: &Context) -> Result<()> {
    let saves = ctx.coordinator()?;
    let backups = saves.backups();

    match cmd {
        BackupCommands::Create(args) => {
            if backups.backup(args.slot).await? {
                output::success(&format!("Backed up slot {}", args.slot));
            } else {
                output::info(&format!("Slot {} has no data to back up", args.slot));
            }
        }
        BackupCommands::Restore(args) => {
            if backups.restore(args.slot).await? {
                output::success(&format!("Restored slot {} from backup", args.slot));
            } else {
                output::info(&format!("Slot {} has no backup", args.slot));
            }
        }
        BackupCommands::Clean(args) => {
            if backups.clean(args.slot).await? {
                output::success(&format!("Removed backup of slot {}", args.slot));
            } else {
                output::info(&format!("Slot {} has no backup", args.slot));
            }
        }
        BackupCommands::Show(args) => {
            let blob = backups.load_backup(args.slot).await?;
            print!("{}", blob.unwrap_or_default());
        }
    }
    Ok(())
}
