//! Where a piece of save data lives, independent of the medium.

use slotkeep_core::SlotId;
use std::fmt;

/// Suffix appended to a primary file path to form its backup path
pub const FILE_BACKUP_SUFFIX: &str = ".bak";

/// Suffix appended to a primary key to form its backup key
pub const KEY_BACKUP_SUFFIX: &str = "bak";

/// Extension of save files on disk
pub const SAVE_FILE_EXTENSION: &str = "rpgsave";

/// A storage location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// Current committed data of a slot
    Primary(SlotId),
    /// Pre-save copy of a slot
    Backup(SlotId),
    /// The global slot index
    Global,
}

impl Address {
    /// File name under the save directory
    pub fn file_name(&self) -> String {
        match self {
            Address::Primary(slot) => format!("file{}.{}", slot, SAVE_FILE_EXTENSION),
            Address::Backup(slot) => format!(
                "file{}.{}{}",
                slot, SAVE_FILE_EXTENSION, FILE_BACKUP_SUFFIX
            ),
            Address::Global => format!("global.{}", SAVE_FILE_EXTENSION),
        }
    }

    /// Key within a key-value namespace
    pub fn key(&self, namespace: &str) -> String {
        match self {
            Address::Primary(slot) => format!("{}/File{}", namespace, slot),
            Address::Backup(slot) => format!("{}/File{}{}", namespace, slot, KEY_BACKUP_SUFFIX),
            Address::Global => format!("{}/Global", namespace),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Primary(slot) => write!(f, "slot {}", slot),
            Address::Backup(slot) => write!(f, "slot {} backup", slot),
            Address::Global => write!(f, "global index"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: u32) -> SlotId {
        SlotId::new(n).unwrap()
    }

    #[test]
    fn test_backup_file_is_primary_plus_suffix() {
        let primary = Address::Primary(slot(3)).file_name();
        let backup = Address::Backup(slot(3)).file_name();
        assert_eq!(primary, "file3.rpgsave");
        assert_eq!(backup, format!("{}{}", primary, FILE_BACKUP_SUFFIX));
    }

    #[test]
    fn test_backup_key_is_primary_plus_suffix() {
        let primary = Address::Primary(slot(12)).key("Save");
        let backup = Address::Backup(slot(12)).key("Save");
        assert_eq!(primary, "Save/File12");
        assert_eq!(backup, "Save/File12bak");
    }

    #[test]
    fn test_global_addresses() {
        assert_eq!(Address::Global.file_name(), "global.rpgsave");
        assert_eq!(Address::Global.key("Quest"), "Quest/Global");
    }
}
