//! This library handles reading from and creating **GFF** files used by the *Aurora* engine
//! (*Neverwinter Nights*).
//!
//! # GFF Format Documentation
//!
//! The Generic File Format is a tagged, offset-indexed struct/field/list container. Creature
//! templates (`.utc`), item templates (`.uti`), player characters (`.bic`), dialogs (`.dlg`) and
//! most other game resources are GFF files that differ only in their file type tag and in the
//! fields they hold.
//!
//! ## File Structure
//!
//! A GFF file consists of a header followed by six tables, in this order: structs, fields,
//! labels, field data, field indices and list indices.
//!
//! | Offset (bytes) | Field                  | Description                                        |
//! |----------------|------------------------|----------------------------------------------------|
//! | 0x0000         | File type              | 4 bytes: space padded tag, e.g. "DLG "             |
//! | 0x0004         | Version                | 4 bytes: "V3.2"                                    |
//! | 0x0008         | Struct offset / count  | 4 + 4 bytes: count of 12-byte struct entries       |
//! | 0x0010         | Field offset / count   | 4 + 4 bytes: count of 12-byte field entries        |
//! | 0x0018         | Label offset / count   | 4 + 4 bytes: count of 16-byte labels               |
//! | 0x0020         | Field data offset/size | 4 + 4 bytes: size in bytes                         |
//! | 0x0028         | Field indices off/size | 4 + 4 bytes: size in bytes                         |
//! | 0x0030         | List indices off/size  | 4 + 4 bytes: size in bytes                         |
//!
//! ### Structs
//!
//! Each struct entry holds its type id, a data slot and its field count. With one field the
//! data slot is that field's index; with more it is a byte offset into the field indices table,
//! where `field_count` field indices start. Structs without fields store `0xFFFFFFFF`. Struct 0
//! is the root and carries the type id `0xFFFFFFFF`.
//!
//! ### Fields
//!
//! Each field entry holds its type tag, the index of its label and a 4-byte data slot. Values of
//! 4 bytes or less live in the slot itself. Wider values, strings, resrefs, localized strings and
//! void blobs are stored in the field data table and the slot holds their byte offset. A struct
//! field's slot holds a struct index; a list field's slot holds a byte offset into the list
//! indices table, where a count is followed by that many struct indices.
//!
//! ### Labels
//!
//! Labels are 16 bytes, NUL padded, and shared by every field with the same name.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Field data alignment**: each entry is zero padded to a 4-byte boundary
//!

pub mod cursor;
pub mod document;
pub mod error;
pub mod label;
pub mod locstring;
pub mod read;
pub mod resref;
pub mod tlk;
pub mod types;
pub mod value;
pub mod write;

pub use document::GffDocument;
pub use label::Label;
pub use locstring::{Gender, Language, LocKey, LocString, NO_REFERENCE};
pub use read::{decode, decode_as, Gff};
pub use resref::ResRef;
pub use tlk::{MemoryTalkTable, TalkTable};
pub use types::{FieldType, FileType};
pub use value::{Struct, Value};
pub use write::{encode, encode_with, GffWriterOptions};
