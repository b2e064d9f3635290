//! Decoding GFF files into a value tree
//!

use binrw::BinRead;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use tracing::{debug, instrument, trace, warn};

use crate::cursor::ByteReader;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::locstring::{DuplicateKeys, LocString};
use crate::resref::ResRef;
use crate::types::{
    FieldEntry, FieldType, FileType, GffHeader, StructEntry, FIELD_ENTRY_SIZE, HEADER_SIZE,
    LABEL_SIZE, MAX_NESTING, STRUCT_ENTRY_SIZE, VERSION_V32,
};
use crate::value::{Struct, Value};

/// A GFF document: the kind of file it is and its root struct
///
/// ```
/// # fn doit() -> aurora_gff::error::Result<()> {
/// use aurora_gff::{FileType, Gff};
///
/// let mut gff = Gff::new(FileType::UTI);
/// gff.root.set("Tag", "longsword")?;
///
/// let bytes = gff.encode()?;
/// assert_eq!(Gff::decode(&bytes)?, gff);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gff {
    pub file_type: FileType,
    pub root: Struct,
}

impl Gff {
    /// An empty document of the given kind
    pub fn new(file_type: FileType) -> Self {
        Self::with_root(file_type, Struct::root())
    }

    pub fn with_root(file_type: FileType, root: Struct) -> Self {
        Self { file_type, root }
    }

    /// See [`decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }

    /// Read the whole of `reader` and decode it.
    pub fn read_from(mut reader: impl Read) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        decode(&buffer)
    }

    /// Decode the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}

/// Decode a GFF buffer of any file type.
#[instrument(skip_all, fields(len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<Gff> {
    Decoder::new(bytes)?.finish()
}

/// Decode a GFF buffer, failing with [`Error::UnsupportedFormat`] unless its file type is
/// `expected`.
#[instrument(skip_all, fields(len = bytes.len(), expected = %expected))]
pub fn decode_as(bytes: &[u8], expected: FileType) -> Result<Gff> {
    let decoder = Decoder::new(bytes)?;
    if decoder.file_type != expected {
        return Err(Error::UnsupportedFormat {
            expected: expected.to_string(),
            found: decoder.file_type.raw(),
        });
    }
    decoder.finish()
}

struct Decoder<'a> {
    file_type: FileType,
    structs: ByteReader<'a>,
    fields: ByteReader<'a>,
    field_data: ByteReader<'a>,
    field_indices: ByteReader<'a>,
    list_indices: ByteReader<'a>,
    labels: Vec<Label>,
    field_count: usize,
    visited: Vec<bool>,
}

/// Reader over one table region of the file.
fn region<'a>(
    bytes: &'a [u8],
    table: &'static str,
    offset: usize,
    len: usize,
) -> Result<ByteReader<'a>> {
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .ok_or(Error::TruncatedInput {
            table,
            offset,
            needed: len,
        })?;
    Ok(ByteReader::with_base(&bytes[offset..end], offset, table))
}

/// Fresh reader positioned at `pos` within `table`.
fn at<'a>(table: &ByteReader<'a>, pos: usize) -> Result<ByteReader<'a>> {
    let mut reader = table.clone();
    reader.seek(pos)?;
    Ok(reader)
}

fn utf8(raw: &[u8], table: &'static str, offset: usize) -> Result<String> {
    String::from_utf8(raw.to_vec())
        .map_err(|_| Error::malformed(table, offset, "string is not valid UTF-8"))
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes, "header");
        let raw = reader.read_bytes(HEADER_SIZE)?;
        let header = GffHeader::read(&mut Cursor::new(raw))?;

        if header.version != VERSION_V32 {
            return Err(Error::UnsupportedFormat {
                expected: "version V3.2".to_owned(),
                found: header.version,
            });
        }
        let file_type = FileType::new(header.file_type).ok_or(Error::UnsupportedFormat {
            expected: "a printable file type".to_owned(),
            found: header.file_type,
        })?;
        debug!(%file_type, ?header, "read header");

        let [structs, fields, labels, field_data, field_indices, list_indices] = header
            .regions()
            .map(|(table, offset, len)| region(bytes, table, offset, len));

        let mut label_table = labels?;
        let labels = (0..header.label_count)
            .map(|_| Label::new(label_table.read_cstring(LABEL_SIZE)?))
            .collect::<Result<Vec<_>>>()?;

        Ok(Decoder {
            file_type,
            structs: structs?,
            fields: fields?,
            field_data: field_data?,
            field_indices: field_indices?,
            list_indices: list_indices?,
            labels,
            field_count: header.field_count as usize,
            visited: vec![false; header.struct_count as usize],
        })
    }

    fn finish(mut self) -> Result<Gff> {
        if self.visited.is_empty() {
            return Err(Error::malformed("struct table", 0, "file has no root struct"));
        }
        let root = self.read_struct(0, 0)?;

        let orphans = self.visited.iter().filter(|seen| !**seen).count();
        if orphans > 0 {
            warn!(orphans, "struct table holds structs unreachable from the root");
        }

        Ok(Gff {
            file_type: self.file_type,
            root,
        })
    }

    fn read_struct(&mut self, index: usize, depth: usize) -> Result<Struct> {
        if depth > MAX_NESTING {
            return Err(Error::malformed(
                "struct table",
                index,
                format!("structs nest deeper than {MAX_NESTING} levels"),
            ));
        }
        let Some(seen) = self.visited.get_mut(index) else {
            return Err(Error::malformed("struct table", index, "struct index out of range"));
        };
        if std::mem::replace(seen, true) {
            return Err(Error::malformed(
                "struct table",
                index,
                "struct is embedded in more than one place",
            ));
        }

        let mut reader = at(&self.structs, index * STRUCT_ENTRY_SIZE)?;
        let entry = StructEntry::read(&mut Cursor::new(reader.read_bytes(STRUCT_ENTRY_SIZE)?))?;
        trace!(index, ?entry, "read struct");

        let field_indices = match entry.field_count {
            0 => Vec::new(),
            1 => vec![entry.data],
            count => {
                let mut reader = at(&self.field_indices, entry.data as usize)?;
                (0..count)
                    .map(|_| reader.read_u32())
                    .collect::<Result<Vec<_>>>()?
            }
        };

        let mut result = Struct::new(entry.struct_type);
        for field_index in field_indices {
            let (label, value) = self.read_field(field_index as usize, depth)?;
            if result.contains(&label) {
                return Err(Error::malformed(
                    "field table",
                    field_index as usize,
                    format!("label {label} appears twice in struct {index}"),
                ));
            }
            result.insert(label, value);
        }
        Ok(result)
    }

    /// Read one field of a struct at `depth`.
    fn read_field(&mut self, index: usize, depth: usize) -> Result<(Label, Value)> {
        if index >= self.field_count {
            return Err(Error::malformed("field table", index, "field index out of range"));
        }
        let mut reader = at(&self.fields, index * FIELD_ENTRY_SIZE)?;
        let entry = FieldEntry::read(&mut Cursor::new(reader.read_bytes(FIELD_ENTRY_SIZE)?))?;

        let label = self
            .labels
            .get(entry.label_index as usize)
            .cloned()
            .ok_or_else(|| {
                Error::malformed(
                    "label table",
                    entry.label_index as usize,
                    "label index out of range",
                )
            })?;
        let field_type = FieldType::try_from(entry.field_type).map_err(|tag| {
            Error::malformed("field table", index, format!("unknown field type {tag}"))
        })?;

        let data = entry.data;
        let value = match field_type {
            FieldType::Byte => Value::Byte(data as u8),
            FieldType::Char => Value::Char(data as u8 as i8),
            FieldType::Word => Value::Word(data as u16),
            FieldType::Short => Value::Short(data as u16 as i16),
            FieldType::DWord => Value::DWord(data),
            FieldType::Int => Value::Int(data as i32),
            FieldType::Float => Value::Float(f32::from_bits(data)),
            FieldType::DWord64 => Value::DWord64(self.data_at(data)?.read_u64()?),
            FieldType::Int64 => Value::Int64(self.data_at(data)?.read_i64()?),
            FieldType::Double => Value::Double(self.data_at(data)?.read_f64()?),
            FieldType::String => {
                let mut reader = self.data_at(data)?;
                let len = reader.read_u32()? as usize;
                let start = reader.absolute();
                Value::String(utf8(reader.read_bytes(len)?, "field data", start)?)
            }
            FieldType::ResRef => {
                let mut reader = self.data_at(data)?;
                let len = reader.read_u8()? as usize;
                let start = reader.absolute();
                if len > ResRef::MAX_LEN {
                    return Err(Error::malformed(
                        "field data",
                        start,
                        format!("resref of {len} bytes is longer than {}", ResRef::MAX_LEN),
                    ));
                }
                Value::ResRef(ResRef::new(utf8(
                    reader.read_bytes(len)?,
                    "field data",
                    start,
                )?)?)
            }
            FieldType::LocString => Value::LocString(LocString::read(
                &mut self.data_at(data)?,
                DuplicateKeys::KeepFirst,
            )?),
            FieldType::Void => {
                let mut reader = self.data_at(data)?;
                let len = reader.read_u32()? as usize;
                Value::Void(reader.read_bytes(len)?.to_vec())
            }
            FieldType::Struct => Value::Struct(self.read_struct(data as usize, depth + 1)?),
            FieldType::List => {
                let mut reader = at(&self.list_indices, data as usize)?;
                let count = reader.read_u32()?;
                let indices = (0..count)
                    .map(|_| reader.read_u32())
                    .collect::<Result<Vec<_>>>()?;
                Value::List(
                    indices
                        .into_iter()
                        .map(|index| self.read_struct(index as usize, depth + 1))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
        };

        Ok((label, value))
    }

    fn data_at(&self, offset: u32) -> Result<ByteReader<'a>> {
        at(&self.field_data, offset as usize)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::read::{decode, decode_as};
    use crate::types::{FileType, ROOT_STRUCT_TYPE};
    use crate::value::Value;

    /// Root struct holding a single `Tag = "abc"` string field.
    #[rustfmt::skip]
    const MINIMAL: [u8; 104] = [
        // Header (56)
        0x47, 0x46, 0x46, 0x20, 0x56, 0x33, 0x2E, 0x32,
        0x38, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        0x44, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        0x50, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        0x60, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00,
        0x68, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x68, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Structs (12)
        0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        // Fields (12)
        0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Labels (16)
        0x54, 0x61, 0x67, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Field data (8)
        0x03, 0x00, 0x00, 0x00, 0x61, 0x62, 0x63, 0x00,
    ];

    /// Root struct with two struct fields that both embed struct 1.
    #[rustfmt::skip]
    const SHARED_STRUCT: [u8; 144] = [
        // Header (56)
        0x47, 0x46, 0x46, 0x20, 0x56, 0x33, 0x2E, 0x32,
        0x38, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
        0x50, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
        0x68, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
        0x88, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x88, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00,
        0x90, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Structs (24)
        0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00,
        // Fields (24)
        0x0E, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        0x0E, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        // Labels (32)
        0x41, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x42, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Field indices (8)
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn decode_minimal_document() -> Result<()> {
        let gff = decode(&MINIMAL)?;

        assert_eq!(gff.file_type, FileType::GFF);
        assert_eq!(gff.root.struct_type, ROOT_STRUCT_TYPE);
        assert_eq!(gff.root.len(), 1);
        assert_eq!(gff.root.get("Tag"), Some(&Value::String("abc".to_owned())));

        Ok(())
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let mut input = MINIMAL;
        input[4..8].copy_from_slice(b"V4.0");

        assert!(matches!(
            decode(&input),
            Err(Error::UnsupportedFormat { found, .. }) if &found == b"V4.0"
        ));
    }

    #[test]
    fn decode_as_checks_file_type() {
        assert!(decode_as(&MINIMAL, FileType::GFF).is_ok());
        assert!(matches!(
            decode_as(&MINIMAL, FileType::DLG),
            Err(Error::UnsupportedFormat { found, .. }) if &found == b"GFF "
        ));
    }

    #[test]
    fn decode_truncated_header() {
        assert!(matches!(
            decode(&MINIMAL[..20]),
            Err(Error::TruncatedInput {
                table: "header",
                offset: 0,
                needed: 56
            })
        ));
    }

    #[test]
    fn decode_region_past_end_names_table() {
        assert!(matches!(
            decode(&MINIMAL[..100]),
            Err(Error::TruncatedInput {
                table: "field data",
                offset: 0x60,
                needed: 8
            })
        ));
    }

    #[test]
    fn decode_rejects_unknown_field_type() {
        let mut input = MINIMAL;
        input[0x44] = 0x10;

        assert!(matches!(
            decode(&input),
            Err(Error::MalformedStructure {
                table: "field table",
                index: 0,
                ..
            })
        ));
    }

    #[test]
    fn decode_rejects_shared_struct() {
        assert!(matches!(
            decode(&SHARED_STRUCT),
            Err(Error::MalformedStructure {
                table: "struct table",
                index: 1,
                ..
            })
        ));
    }

    #[test]
    fn decode_rejects_field_index_out_of_range() {
        let mut input = MINIMAL;
        // root's inline field index
        input[0x3C] = 0x05;

        assert!(matches!(
            decode(&input),
            Err(Error::MalformedStructure {
                table: "field table",
                index: 5,
                ..
            })
        ));
    }
}
