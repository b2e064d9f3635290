use derive_more::derive::{Deref, Display};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Resource reference, the name of another resource without its extension
///
/// The engine treats resrefs as lowercase, but nothing here enforces it; the value is kept
/// exactly as read so files round-trip unchanged.
#[derive(Debug, Display, Deref, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ResRef(String);

impl ResRef {
    /// Maximum length in bytes
    pub const MAX_LEN: usize = 16;

    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.len() > Self::MAX_LEN {
            return Err(Error::InvalidResRef(value));
        }
        Ok(ResRef(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased copy, the form the engine uses for lookups.
    pub fn normalized(&self) -> ResRef {
        ResRef(self.0.to_ascii_lowercase())
    }
}

impl FromStr for ResRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResRef::new(s)
    }
}

impl TryFrom<&str> for ResRef {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        ResRef::new(value)
    }
}

impl TryFrom<String> for ResRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        ResRef::new(value)
    }
}

impl From<ResRef> for String {
    fn from(value: ResRef) -> Self {
        value.0
    }
}
