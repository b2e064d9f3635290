//! Typed views over GFF documents.

use std::path::Path;

use crate::read::{decode_as, Gff};
use crate::types::FileType;

/// A document kind with a typed model on top of a [`Gff`]
///
/// Implementors convert between their model and the generic value tree; decoding and encoding
/// bytes and files comes for free.
pub trait GffDocument: Sized {
    /// Error type of the conversion, able to carry codec errors
    type Error: From<crate::error::Error>;

    /// The file type tag this document kind is stored under
    const FILE_TYPE: FileType;

    /// Build the typed model from a decoded document.
    fn from_gff(gff: Gff) -> Result<Self, Self::Error>;

    /// Produce the generic document to encode.
    fn to_gff(&self) -> Result<Gff, Self::Error>;

    /// Decode bytes, checking the file type.
    fn decode(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_gff(decode_as(bytes, Self::FILE_TYPE)?)
    }

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        Ok(self.to_gff()?.encode()?)
    }

    fn open(path: impl AsRef<Path>) -> Result<Self, Self::Error> {
        let bytes = std::fs::read(path).map_err(crate::error::Error::from)?;
        Self::decode(&bytes)
    }

    fn save(&self, path: impl AsRef<Path>) -> Result<(), Self::Error> {
        Ok(self.to_gff()?.save(path)?)
    }
}
