//! Localized strings (`CExoLocString`).
//!
//! ## Layout
//!
//! | Offset (bytes) | Field        | Description                                           |
//! |----------------|--------------|-------------------------------------------------------|
//! | 0x0000         | Total size   | 4 bytes: size of everything after this field          |
//! | 0x0004         | StrRef       | 4 bytes: talk table reference, `0xFFFFFFFF` for none  |
//! | 0x0008         | String count | 4 bytes: number of inline strings                     |
//! | 0x000C         | Strings      | count × (key: u32, length: u32, UTF-8 bytes)          |
//!
//! The key of an inline string combines language and gender: `language * 2 + gender`.

use indexmap::IndexMap;
use std::borrow::Cow;
use tracing::warn;

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::tlk::TalkTable;

/// Sentinel StrRef meaning "no talk table entry"
pub const NO_REFERENCE: u32 = 0xFFFF_FFFF;

/// Languages the engine ships talk tables for
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Language {
    English = 0,
    French = 1,
    German = 2,
    Italian = 3,
    Spanish = 4,
    Polish = 5,
    Korean = 128,
    ChineseTraditional = 129,
    ChineseSimplified = 130,
    Japanese = 131,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Gender {
    Masculine = 0,
    Feminine = 1,
}

/// Key of an inline string: a language id and a gender packed into one integer
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LocKey(pub u32);

impl LocKey {
    pub fn new(language: Language, gender: Gender) -> Self {
        LocKey(language as u32 * 2 + gender as u32)
    }

    pub fn language_id(self) -> u32 {
        self.0 / 2
    }

    pub fn is_feminine(self) -> bool {
        self.0 % 2 == 1
    }
}

impl From<LocKey> for u32 {
    fn from(value: LocKey) -> Self {
        value.0
    }
}

/// How duplicate keys in a localized string are handled when reading
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum DuplicateKeys {
    Reject,
    KeepFirst,
}

/// A talk table reference plus inline strings keyed by [`LocKey`]
///
/// When `str_ref` is set, the talk table string is what the game displays; inline strings are
/// kept for round-trips and for tools without access to the talk table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocString {
    pub str_ref: u32,
    strings: IndexMap<u32, String>,
}

impl Default for LocString {
    fn default() -> Self {
        Self {
            str_ref: NO_REFERENCE,
            strings: IndexMap::new(),
        }
    }
}

impl LocString {
    pub fn new() -> Self {
        Self::default()
    }

    /// A localized string that only points into the talk table
    pub fn from_str_ref(str_ref: u32) -> Self {
        Self {
            str_ref,
            ..Default::default()
        }
    }

    /// A localized string with a single masculine English string
    pub fn english(text: impl Into<String>) -> Self {
        let mut loc = Self::default();
        loc.insert(LocKey::new(Language::English, Gender::Masculine), text);
        loc
    }

    pub fn has_str_ref(&self) -> bool {
        self.str_ref != NO_REFERENCE
    }

    /// Number of inline strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// True when there is neither a talk table reference nor an inline string
    pub fn is_empty(&self) -> bool {
        !self.has_str_ref() && self.strings.is_empty()
    }

    pub fn get(&self, key: impl Into<u32>) -> Option<&str> {
        self.strings.get(&key.into()).map(String::as_str)
    }

    /// Set the string for `key`, replacing and returning any previous one.
    pub fn insert(&mut self, key: impl Into<u32>, text: impl Into<String>) -> Option<String> {
        self.strings.insert(key.into(), text.into())
    }

    /// Add the string for `key`, failing if the key is already present.
    pub fn try_insert(&mut self, key: impl Into<u32>, text: impl Into<String>) -> Result<()> {
        let key = key.into();
        if self.strings.contains_key(&key) {
            return Err(Error::MalformedLocalizedTable { key });
        }
        self.strings.insert(key, text.into());
        Ok(())
    }

    pub fn remove(&mut self, key: impl Into<u32>) -> Option<String> {
        self.strings.shift_remove(&key.into())
    }

    /// Inline strings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.strings.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// The text to display for `key`.
    ///
    /// The talk table wins when the reference resolves; otherwise the inline string for `key`,
    /// then the first inline string.
    pub fn resolve<'a>(
        &'a self,
        talk_table: Option<&dyn TalkTable>,
        key: impl Into<u32>,
    ) -> Option<Cow<'a, str>> {
        if self.has_str_ref() {
            if let Some(text) = talk_table.and_then(|tlk| tlk.string(self.str_ref)) {
                return Some(Cow::Owned(text));
            }
        }
        self.get(key)
            .or_else(|| self.strings.values().next().map(String::as_str))
            .map(Cow::Borrowed)
    }

    /// Decode a localized string from its field data bytes, rejecting duplicate keys.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes, "localized string");
        Self::read(&mut reader, DuplicateKeys::Reject)
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>, duplicates: DuplicateKeys) -> Result<Self> {
        let total = reader.read_u32()? as usize;
        let mut body = reader.sub_reader(total)?;

        let str_ref = body.read_u32()?;
        let count = body.read_u32()?;

        let mut strings = IndexMap::new();
        for _ in 0..count {
            let key = body.read_u32()?;
            let at = body.absolute();
            let length = body.read_u32()? as usize;
            let raw = body.read_bytes(length)?;
            let text = String::from_utf8(raw.to_vec()).map_err(|_| {
                Error::malformed("localized string", at, "string is not valid UTF-8")
            })?;

            if strings.contains_key(&key) {
                match duplicates {
                    DuplicateKeys::Reject => return Err(Error::MalformedLocalizedTable { key }),
                    DuplicateKeys::KeepFirst => {
                        warn!(key, offset = at, "dropping duplicate localized string key");
                        continue;
                    }
                }
            }
            strings.insert(key, text);
        }

        if body.remaining() != 0 {
            warn!(
                trailing = body.remaining(),
                "localized string has bytes past its last entry"
            );
        }

        Ok(LocString { str_ref, strings })
    }

    /// Size of the encoding, including the leading size field.
    pub fn encoded_len(&self) -> usize {
        12 + self
            .strings
            .values()
            .map(|text| 8 + text.len())
            .sum::<usize>()
    }

    pub(crate) fn write(&self, writer: &mut ByteWriter) -> Result<()> {
        let total = self.encoded_len() - 4;
        writer.write_u32(u32::try_from(total).map_err(|_| Error::Overflow {
            table: "field data",
            size: total,
        })?)?;
        writer.write_u32(self.str_ref)?;
        writer.write_u32(self.strings.len() as u32)?;
        for (key, text) in &self.strings {
            writer.write_u32(*key)?;
            writer.write_u32(text.len() as u32)?;
            writer.write_bytes(text.as_bytes())?;
        }
        Ok(())
    }
}
