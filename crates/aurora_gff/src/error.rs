//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// The file type or version tag is not one this library reads
    #[error("unsupported format: expected {expected}, found {found:?}")]
    #[diagnostic(code(aurora_gff::unsupported_format))]
    UnsupportedFormat {
        /// What the reader was looking for
        expected: String,
        /// The raw tag found in the file
        found: [u8; 4],
    },

    /// A read ran past the end of a table or of the buffer
    #[error("truncated input in {table}: needed {needed} bytes at offset {offset:#x}")]
    #[diagnostic(code(aurora_gff::truncated_input))]
    TruncatedInput {
        /// The table or block being read
        table: &'static str,
        /// Absolute offset of the failed read
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
    },

    /// The tables are internally inconsistent
    #[error("malformed structure in {table} at index {index}: {reason}")]
    #[diagnostic(code(aurora_gff::malformed_structure))]
    MalformedStructure {
        /// The table holding the offending entry
        table: &'static str,
        /// Index (or offset) of the offending entry
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// A computed offset or size does not fit the 32-bit format
    #[error("{table} is too large to address: {size} bytes")]
    #[diagnostic(code(aurora_gff::overflow))]
    Overflow {
        /// The table or block that overflowed
        table: &'static str,
        /// The size that was requested
        size: usize,
    },

    /// A localized string holds the same language key twice
    #[error("localized string has duplicate language key {key}")]
    #[diagnostic(code(aurora_gff::malformed_localized_table))]
    MalformedLocalizedTable {
        /// The repeated key
        key: u32,
    },

    /// Label longer than 16 bytes or holding a NUL byte
    #[error("invalid label {0:?}: labels are at most 16 bytes without NUL bytes")]
    InvalidLabel(String),

    /// Resource reference longer than 16 bytes
    #[error("invalid resref {0:?}: resrefs are at most 16 bytes")]
    InvalidResRef(String),

    /// A schema expected a field that is not present
    #[error("missing field {label}")]
    MissingField {
        /// Label that was looked up
        label: String,
    },

    /// A schema found a field holding a different variant than expected
    #[error("field {label} has type {found}, expected {expected}")]
    UnexpectedFieldType {
        /// Label that was looked up
        label: String,
        /// Expected field type
        expected: crate::types::FieldType,
        /// Actual field type
        found: crate::types::FieldType,
    },
}

impl Error {
    pub(crate) fn malformed(table: &'static str, index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedStructure {
            table,
            index,
            reason: reason.into(),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
