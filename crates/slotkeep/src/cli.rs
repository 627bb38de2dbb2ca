//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use slotkeep_core::{SlotId, StorageMode};

// Re-export command types for convenience
pub use crate::commands::backup::BackupCommands;

/// Slotkeep - crash-safe save slots with backup and rescue
#[derive(Parser, Debug)]
#[command(name = "slotkeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to slotkeep.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Override the configured storage backend
    #[arg(long, value_enum, global = true)]
    pub mode: Option<ModeArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save data into a slot
    Save(SaveArgs),

    /// Print the data stored in a slot
    Load(LoadArgs),

    /// List saved slots
    List(ListArgs),

    /// Show storage state of a slot
    Status(SlotArgs),

    /// Delete a slot and its backup
    Delete(SlotArgs),

    /// Slot backup management
    #[command(subcommand)]
    Backup(BackupCommands),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// One file per slot
    Filesystem,

    /// Namespaced keys in a JSON store
    KeyValue,
}

impl From<ModeArg> for StorageMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Filesystem => StorageMode::Filesystem,
            ModeArg::KeyValue => StorageMode::KeyValue,
        }
    }
}

#[derive(Args, Debug)]
pub struct SlotArgs {
    /// Slot number (from 1)
    pub slot: SlotId,
}

// Save command
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Slot number (from 1)
    pub slot: SlotId,

    /// Read the data from a file instead of stdin
    #[arg(short, long)]
    pub file: Option<Utf8PathBuf>,

    /// Title recorded in the slot index
    #[arg(short, long)]
    pub title: Option<String>,
}

// Load command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Slot number (from 1)
    pub slot: SlotId,

    /// Write the data to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,
}

// List command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
