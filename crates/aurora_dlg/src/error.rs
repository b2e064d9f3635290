//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::node::NodeId;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`aurora_gff::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Gff(#[from] aurora_gff::error::Error),

    /// A pointer targets a node index that does not exist
    #[error("{source_desc} points at {target}, which does not exist")]
    #[diagnostic(code(aurora_dlg::dangling_pointer))]
    DanglingPointer {
        /// Where the pointer lives, e.g. `entry 3` or `start list`
        source_desc: String,
        /// The missing target
        target: NodeId,
    },

    /// Pointers must connect an entry to a reply or a reply to an entry
    #[error("cannot point from {from} to {to}: both are the same kind of node")]
    #[diagnostic(code(aurora_dlg::same_kind_pointer))]
    SameKindPointer { from: NodeId, to: NodeId },

    /// Start list pointers must target entries
    #[error("start list cannot point at {0}: only entries can start a conversation")]
    #[diagnostic(code(aurora_dlg::invalid_start))]
    InvalidStart(NodeId),

    /// The node is not part of this dialog
    #[error("{0} is not part of this dialog")]
    #[diagnostic(code(aurora_dlg::unknown_node))]
    UnknownNode(NodeId),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
