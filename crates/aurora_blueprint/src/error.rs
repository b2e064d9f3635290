//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`aurora_gff::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Gff(#[from] aurora_gff::error::Error),

    /// Equipment slots are single bits of the slot mask
    #[error("invalid equipment slot {0:#x}: expected a single bit")]
    #[diagnostic(code(aurora_blueprint::invalid_equip_slot))]
    InvalidEquipSlot(u32),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
