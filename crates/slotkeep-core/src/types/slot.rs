//! Save slot identifiers

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Identifier of a save slot.
///
/// Slots are small positive integers. Zero is reserved for the global index
/// and is never a valid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(NonZeroU32);

impl SlotId {
    /// Create a slot id, rejecting zero
    pub fn new(value: u32) -> Result<Self> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| Error::invalid_slot(value.to_string()))
    }

    /// Numeric value of the slot
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SlotId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: u32 = s.trim().parse().map_err(|_| Error::invalid_slot(s))?;
        Self::new(value)
    }
}

impl TryFrom<u32> for SlotId {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        assert!(SlotId::new(0).is_err());
        assert!("0".parse::<SlotId>().is_err());
    }

    #[test]
    fn test_parse_and_display() {
        let slot: SlotId = " 7 ".parse().unwrap();
        assert_eq!(slot.get(), 7);
        assert_eq!(slot.to_string(), "7");
        assert!("seven".parse::<SlotId>().is_err());
        assert!("-1".parse::<SlotId>().is_err());
    }

    #[test]
    fn test_ordering_follows_number() {
        let a = SlotId::new(2).unwrap();
        let b = SlotId::new(10).unwrap();
        assert!(a < b);
    }
}
