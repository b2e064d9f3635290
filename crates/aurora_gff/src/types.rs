//! Base types for structure of GFF file.

use binrw::{BinRead, BinWrite};
use std::fmt;

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 56;

/// Size of a struct table entry in bytes
pub const STRUCT_ENTRY_SIZE: usize = 12;

/// Size of a field table entry in bytes
pub const FIELD_ENTRY_SIZE: usize = 12;

/// Width of a label table entry in bytes
pub const LABEL_SIZE: usize = 16;

/// Struct type id the engine reserves for the root struct
pub const ROOT_STRUCT_TYPE: u32 = 0xFFFF_FFFF;

/// Deepest struct nesting read or written, the root being depth 0
///
/// Game files nest a handful of levels; the bound keeps every walk over a value tree off the
/// end of the stack.
pub const MAX_NESTING: usize = 256;

/// The only version tag this library reads or writes
pub const VERSION_V32: [u8; 4] = *b"V3.2";

/// Four character tag identifying the kind of document stored in a GFF file
///
/// Tags are space padded, e.g. `"DLG "`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct FileType([u8; 4]);

impl FileType {
    pub const GFF: FileType = FileType(*b"GFF ");
    pub const DLG: FileType = FileType(*b"DLG ");
    pub const UTC: FileType = FileType(*b"UTC ");
    pub const UTI: FileType = FileType(*b"UTI ");
    pub const BIC: FileType = FileType(*b"BIC ");
    pub const IFO: FileType = FileType(*b"IFO ");
    pub const ARE: FileType = FileType(*b"ARE ");
    pub const GIT: FileType = FileType(*b"GIT ");
    pub const JRL: FileType = FileType(*b"JRL ");

    /// Build a tag from raw bytes, accepting only printable ASCII.
    pub fn new(raw: [u8; 4]) -> Option<Self> {
        raw.iter()
            .all(|b| b.is_ascii_graphic() || *b == b' ')
            .then_some(FileType(raw))
    }

    /// Build a tag from a file extension such as `dlg`, upper-casing and space padding it.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.is_empty() || ext.len() > 4 {
            return None;
        }
        let mut raw = [b' '; 4];
        for (slot, b) in raw.iter_mut().zip(ext.bytes()) {
            *slot = b.to_ascii_uppercase();
        }
        Self::new(raw)
    }

    pub fn raw(&self) -> [u8; 4] {
        self.0
    }

    pub fn as_str(&self) -> &str {
        // `new` only admits ASCII
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl TryFrom<String> for FileType {
    type Error = String;

    /// Accepts up to four printable characters, space padding shorter tags.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() || value.len() > 4 {
            return Err(value);
        }
        let mut raw = [b' '; 4];
        raw[..value.len()].copy_from_slice(value.as_bytes());
        FileType::new(raw).ok_or(value)
    }
}

impl From<FileType> for String {
    fn from(value: FileType) -> Self {
        value.as_str().to_owned()
    }
}

/// Closed set of field variants a GFF file can hold, with their on-disk type tags
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum FieldType {
    Byte = 0,
    Char = 1,
    Word = 2,
    Short = 3,
    DWord = 4,
    Int = 5,
    DWord64 = 6,
    Int64 = 7,
    Float = 8,
    Double = 9,
    String = 10,
    ResRef = 11,
    LocString = 12,
    Void = 13,
    Struct = 14,
    List = 15,
}

impl FieldType {
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Whether the value lives in the field data block rather than in the field's own slot.
    ///
    /// Structs and lists are neither: their slot holds an index into another table.
    pub fn is_out_of_line(self) -> bool {
        matches!(
            self,
            FieldType::DWord64
                | FieldType::Int64
                | FieldType::Double
                | FieldType::String
                | FieldType::ResRef
                | FieldType::LocString
                | FieldType::Void
        )
    }
}

impl TryFrom<u32> for FieldType {
    type Error = u32;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        Ok(match tag {
            0 => FieldType::Byte,
            1 => FieldType::Char,
            2 => FieldType::Word,
            3 => FieldType::Short,
            4 => FieldType::DWord,
            5 => FieldType::Int,
            6 => FieldType::DWord64,
            7 => FieldType::Int64,
            8 => FieldType::Float,
            9 => FieldType::Double,
            10 => FieldType::String,
            11 => FieldType::ResRef,
            12 => FieldType::LocString,
            13 => FieldType::Void,
            14 => FieldType::Struct,
            15 => FieldType::List,
            other => return Err(other),
        })
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().trim_end())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Byte => "BYTE",
            FieldType::Char => "CHAR",
            FieldType::Word => "WORD",
            FieldType::Short => "SHORT",
            FieldType::DWord => "DWORD",
            FieldType::Int => "INT",
            FieldType::DWord64 => "DWORD64",
            FieldType::Int64 => "INT64",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::String => "CExoString",
            FieldType::ResRef => "CResRef",
            FieldType::LocString => "CExoLocString",
            FieldType::Void => "VOID",
            FieldType::Struct => "Struct",
            FieldType::List => "List",
        };
        f.write_str(name)
    }
}

/// GFF file header
///
/// Every table is addressed by its offset from the start of the file. Struct, field and label
/// counts are entry counts; the three remaining counts are sizes in bytes.
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct GffHeader {
    /// Document kind, see [`FileType`]
    pub file_type: [u8; 4],

    /// Format version, always `V3.2`
    pub version: [u8; 4],

    pub struct_offset: u32,
    pub struct_count: u32,

    pub field_offset: u32,
    pub field_count: u32,

    pub label_offset: u32,
    pub label_count: u32,

    pub field_data_offset: u32,
    pub field_data_size: u32,

    pub field_indices_offset: u32,
    pub field_indices_size: u32,

    pub list_indices_offset: u32,
    pub list_indices_size: u32,
}

impl GffHeader {
    /// Each table region as `(name, offset, length in bytes)`, in canonical file order.
    pub fn regions(&self) -> [(&'static str, usize, usize); 6] {
        [
            (
                "struct table",
                self.struct_offset as usize,
                self.struct_count as usize * STRUCT_ENTRY_SIZE,
            ),
            (
                "field table",
                self.field_offset as usize,
                self.field_count as usize * FIELD_ENTRY_SIZE,
            ),
            (
                "label table",
                self.label_offset as usize,
                self.label_count as usize * LABEL_SIZE,
            ),
            (
                "field data",
                self.field_data_offset as usize,
                self.field_data_size as usize,
            ),
            (
                "field indices",
                self.field_indices_offset as usize,
                self.field_indices_size as usize,
            ),
            (
                "list indices",
                self.list_indices_offset as usize,
                self.list_indices_size as usize,
            ),
        ]
    }
}

/// Entry in the struct table
///
/// `data` is the field index when the struct has exactly one field, otherwise a byte offset into
/// the field indices block where `field_count` field indices start.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct StructEntry {
    pub struct_type: u32,
    pub data: u32,
    pub field_count: u32,
}

/// Entry in the field table
///
/// `data` holds inline scalars directly; for other types it is an offset or index, see
/// [`FieldType`].
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct FieldEntry {
    pub field_type: u32,
    pub label_index: u32,
    pub data: u32,
}
