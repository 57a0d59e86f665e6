//! Action codes and the externally supplied action-code → sequence table.
//!
//! The firmware addresses behaviour triggers with a four-part code such as `75-0-0-3`. Where the
//! toy stores the mapping from those codes to SEQ slots is not known, so the table is loaded
//! from configuration and attached to a document at load time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DlcError, Result};

/// Hierarchical behaviour trigger identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionCode {
    pub category: u16,
    pub subcategory: u16,
    pub group: u16,
    pub variant: u16,
}

impl ActionCode {
    pub const fn new(category: u16, subcategory: u16, group: u16, variant: u16) -> Self {
        ActionCode {
            category,
            subcategory,
            group,
            variant,
        }
    }
}

impl From<(u16, u16, u16, u16)> for ActionCode {
    fn from((category, subcategory, group, variant): (u16, u16, u16, u16)) -> Self {
        ActionCode::new(category, subcategory, group, variant)
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.category, self.subcategory, self.group, self.variant
        )
    }
}

impl FromStr for ActionCode {
    type Err = DlcError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != 4 {
            return Err(DlcError::InvalidActionCode(s.to_string()));
        }

        let mut fields = [0u16; 4];
        for (field, part) in fields.iter_mut().zip(&parts) {
            *field = part
                .parse()
                .map_err(|_| DlcError::InvalidActionCode(s.to_string()))?;
        }

        Ok(ActionCode::new(fields[0], fields[1], fields[2], fields[3]))
    }
}

impl Serialize for ActionCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ActionCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the action table as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub code: ActionCode,
    pub sequence: usize,
}

/// Read-only lookup from action code to SEQ slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMap {
    entries: BTreeMap<ActionCode, usize>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ActionEntry>,
    {
        ActionMap {
            entries: entries
                .into_iter()
                .map(|entry| (entry.code, entry.sequence))
                .collect(),
        }
    }

    pub fn insert(&mut self, code: ActionCode, sequence: usize) {
        self.entries.insert(code, sequence);
    }

    pub fn get(&self, code: ActionCode) -> Option<usize> {
        self.entries.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionCode, usize)> + '_ {
        self.entries.iter().map(|(code, seq)| (*code, *seq))
    }
}
