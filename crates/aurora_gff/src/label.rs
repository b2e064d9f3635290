use derive_more::derive::{Deref, Display};
use std::{borrow::Borrow, str::FromStr};

use crate::error::{Error, Result};
use crate::types::LABEL_SIZE;

/// Name of a field within a struct
///
/// Labels are case-sensitive, at most 16 bytes and free of NUL bytes, which pad them on disk.
/// They are stored once in the label table and referenced by index.
#[derive(Debug, Display, Deref, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Label(String);

impl Label {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.len() > LABEL_SIZE || value.contains('\0') {
            return Err(Error::InvalidLabel(value));
        }
        Ok(Label(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Label::new(s)
    }
}

impl TryFrom<&str> for Label {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Label::new(value)
    }
}

impl TryFrom<String> for Label {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Label::new(value)
    }
}

impl From<Label> for String {
    fn from(value: Label) -> Self {
        value.0
    }
}

#[cfg(test)]
mod test {
    use crate::label::Label;

    #[test]
    fn labels_are_bounded() {
        assert!(Label::new("RepliesList").is_ok());
        assert!(Label::new("ABCDEFGHIJKLMNOP").is_ok());
        assert!(Label::new("ABCDEFGHIJKLMNOPQ").is_err());
        assert!(Label::new("A\0B").is_err());
        assert!(Label::new("Tag\0").is_err());
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert_ne!(Label::new("Tag").unwrap(), Label::new("TAG").unwrap());
    }
}
