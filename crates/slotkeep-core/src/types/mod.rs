//! Type definitions for slotkeep configuration and slots

mod config_types;
mod slot;

pub use config_types::*;
pub use slot::SlotId;
