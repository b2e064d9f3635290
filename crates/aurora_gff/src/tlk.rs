//! Talk table lookup.
//!
//! Talk tables (`.tlk`) hold the game's translated strings. Reading them is outside this crate;
//! localized strings only need a way to resolve a StrRef to text, which [`TalkTable`] provides.

use std::collections::HashMap;

/// Read-only StrRef resolution
pub trait TalkTable {
    /// Text for `str_ref`, if the table has it.
    fn string(&self, str_ref: u32) -> Option<String>;
}

/// Talk table held in memory, mostly useful for tests and small tools
#[derive(Debug, Clone, Default)]
pub struct MemoryTalkTable {
    entries: HashMap<u32, String>,
}

impl MemoryTalkTable {
    pub fn insert(&mut self, str_ref: u32, text: impl Into<String>) {
        self.entries.insert(str_ref, text.into());
    }

    /// Number of entries contained in this table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(u32, String)> for MemoryTalkTable {
    fn from_iter<T: IntoIterator<Item = (u32, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl TalkTable for MemoryTalkTable {
    fn string(&self, str_ref: u32) -> Option<String> {
        self.entries.get(&str_ref).cloned()
    }
}
