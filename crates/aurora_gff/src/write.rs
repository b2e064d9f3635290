//! Types for writing GFF files
//!
//! Writing happens in two passes. The measure pass walks the value tree depth-first and lays out
//! every table: structs and fields get slots in visiting order, labels are interned, and
//! out-of-line values are appended to the field data block. The emit pass then computes the table
//! offsets and writes the header followed by the six tables. Every size is checked against the
//! 32-bit range before the first byte is produced.

use binrw::BinWrite;
use bon::Builder;
use indexmap::IndexSet;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tracing::{debug, instrument};

use crate::cursor::ByteWriter;
use crate::error::{Error, Result};
use crate::read::Gff;
use crate::types::{
    FieldEntry, FileType, GffHeader, StructEntry, FIELD_ENTRY_SIZE, HEADER_SIZE, LABEL_SIZE,
    MAX_NESTING, STRUCT_ENTRY_SIZE, VERSION_V32,
};
use crate::value::{Struct, Value};

/// Data slot of a struct without fields
const NO_FIELDS: u32 = 0xFFFF_FFFF;

/// Options for how the GFF file should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct GffWriterOptions {
    /// Pad each field data entry with zero bytes up to a 4-byte boundary
    #[builder(default = true)]
    pub pad_field_data: bool,
}

impl Default for GffWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Gff {
    /// Encode with default options.
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    pub fn encode_with(&self, options: GffWriterOptions) -> Result<Vec<u8>> {
        encode_with(self, options)
    }

    /// Encode and write the result to `writer`.
    ///
    /// Nothing is written when encoding fails.
    pub fn write_to(&self, mut writer: impl Write) -> Result<()> {
        let bytes = self.encode()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Encode and write the result to the file at `path`, replacing it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.encode()?;
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }
}

/// Encode a document with default options.
pub fn encode(gff: &Gff) -> Result<Vec<u8>> {
    encode_with(gff, GffWriterOptions::default())
}

/// Encode a document.
#[instrument(skip_all, err, fields(file_type = %gff.file_type))]
pub fn encode_with(gff: &Gff, options: GffWriterOptions) -> Result<Vec<u8>> {
    let mut layout = Layout::new(options);
    layout.add_struct(&gff.root, 0)?;
    layout.emit(gff.file_type)
}

fn to_u32(table: &'static str, size: usize) -> Result<u32> {
    u32::try_from(size).map_err(|_| Error::Overflow { table, size })
}

/// Tables built by the measure pass
struct Layout<'a> {
    options: GffWriterOptions,
    structs: Vec<StructEntry>,
    fields: Vec<FieldEntry>,
    labels: IndexSet<&'a str>,
    field_data: ByteWriter,
    field_indices: ByteWriter,
    list_indices: ByteWriter,
}

impl<'a> Layout<'a> {
    fn new(options: GffWriterOptions) -> Self {
        Self {
            options,
            structs: Vec::new(),
            fields: Vec::new(),
            labels: IndexSet::new(),
            field_data: ByteWriter::new("field data"),
            field_indices: ByteWriter::new("field indices"),
            list_indices: ByteWriter::new("list indices"),
        }
    }

    /// Lay out `value` and its subtree, returning its struct index.
    fn add_struct(&mut self, value: &'a Struct, depth: usize) -> Result<u32> {
        if depth > MAX_NESTING {
            return Err(Error::malformed(
                "struct table",
                self.structs.len(),
                format!("structs nest deeper than {MAX_NESTING} levels"),
            ));
        }
        let index = to_u32("struct table", self.structs.len())?;
        self.structs.push(StructEntry::default());

        let first_field = self.fields.len();
        let field_count = to_u32("field table", value.len())?;
        self.fields
            .resize(first_field + value.len(), FieldEntry::default());

        let data = match value.len() {
            0 => NO_FIELDS,
            1 => to_u32("field table", first_field)?,
            count => {
                let offset = self.field_indices.offset();
                for field in first_field..first_field + count {
                    self.field_indices.write_u32(to_u32("field table", field)?)?;
                }
                offset
            }
        };
        self.structs[index as usize] = StructEntry {
            struct_type: value.struct_type,
            data,
            field_count,
        };

        for (slot, (label, field)) in value.iter().enumerate() {
            let entry = self.add_field(label.as_str(), field, depth)?;
            self.fields[first_field + slot] = entry;
        }

        Ok(index)
    }

    fn add_field(
        &mut self,
        label: &'a str,
        value: &'a Value,
        depth: usize,
    ) -> Result<FieldEntry> {
        let (label_index, _) = self.labels.insert_full(label);
        let label_index = to_u32("label table", label_index)?;

        let data = match value {
            Value::Byte(v) => *v as u32,
            Value::Char(v) => *v as u8 as u32,
            Value::Word(v) => *v as u32,
            Value::Short(v) => *v as u16 as u32,
            Value::DWord(v) => *v,
            Value::Int(v) => *v as u32,
            Value::Float(v) => v.to_bits(),
            Value::DWord64(v) => self.data_entry(|w| w.write_u64(*v))?,
            Value::Int64(v) => self.data_entry(|w| w.write_i64(*v))?,
            Value::Double(v) => self.data_entry(|w| w.write_f64(*v))?,
            Value::String(v) => self.data_entry(|w| {
                w.write_u32(to_u32("field data", v.len())?)?;
                w.write_bytes(v.as_bytes())
            })?,
            Value::ResRef(v) => self.data_entry(|w| {
                // bounded by ResRef::MAX_LEN
                w.write_u8(v.len() as u8)?;
                w.write_bytes(v.as_bytes())
            })?,
            Value::LocString(v) => self.data_entry(|w| v.write(w))?,
            Value::Void(v) => self.data_entry(|w| {
                w.write_u32(to_u32("field data", v.len())?)?;
                w.write_bytes(v)
            })?,
            Value::Struct(v) => self.add_struct(v, depth + 1)?,
            Value::List(v) => self.add_list(v, depth + 1)?,
        };

        Ok(FieldEntry {
            field_type: value.field_type().tag(),
            label_index,
            data,
        })
    }

    /// Append one out-of-line value to the field data block, returning its offset.
    fn data_entry(&mut self, write: impl FnOnce(&mut ByteWriter) -> Result<()>) -> Result<u32> {
        let offset = self.field_data.offset();
        write(&mut self.field_data)?;
        if self.options.pad_field_data {
            self.field_data.pad_to(4)?;
        }
        Ok(offset)
    }

    /// Reserve the list's count and indices, then lay out each element and patch its index in.
    fn add_list(&mut self, list: &'a [Struct], depth: usize) -> Result<u32> {
        let offset = self.list_indices.reserve(4 * (list.len() + 1))?;
        self.list_indices
            .patch_u32(offset, to_u32("list indices", list.len())?)?;

        for (slot, element) in list.iter().enumerate() {
            let index = self.add_struct(element, depth)?;
            self.list_indices.patch_u32(offset + 4 * (slot + 1), index)?;
        }

        to_u32("list indices", offset)
    }

    fn emit(self, file_type: FileType) -> Result<Vec<u8>> {
        let mut labels = ByteWriter::new("label table");
        for label in &self.labels {
            labels.write_cstring(label, LABEL_SIZE)?;
        }

        let sizes = [
            ("struct table", self.structs.len() * STRUCT_ENTRY_SIZE),
            ("field table", self.fields.len() * FIELD_ENTRY_SIZE),
            ("label table", labels.len()),
            ("field data", self.field_data.len()),
            ("field indices", self.field_indices.len()),
            ("list indices", self.list_indices.len()),
        ];
        let mut offsets = [0u32; 6];
        let mut end = HEADER_SIZE as u32;
        for (slot, &(table, size)) in sizes.iter().enumerate() {
            offsets[slot] = end;
            end = to_u32(table, size)?
                .checked_add(end)
                .ok_or(Error::Overflow {
                    table,
                    size: end as usize + size,
                })?;
        }

        let header = GffHeader {
            file_type: file_type.raw(),
            version: VERSION_V32,
            struct_offset: offsets[0],
            struct_count: self.structs.len() as u32,
            field_offset: offsets[1],
            field_count: self.fields.len() as u32,
            label_offset: offsets[2],
            label_count: self.labels.len() as u32,
            field_data_offset: offsets[3],
            field_data_size: self.field_data.len() as u32,
            field_indices_offset: offsets[4],
            field_indices_size: self.field_indices.len() as u32,
            list_indices_offset: offsets[5],
            list_indices_size: self.list_indices.len() as u32,
        };
        debug!(?header, size = end, "laid out tables");

        let mut out = Cursor::new(Vec::with_capacity(end as usize));
        header.write(&mut out)?;
        for entry in &self.structs {
            entry.write(&mut out)?;
        }
        for entry in &self.fields {
            entry.write(&mut out)?;
        }
        out.write_all(labels.as_slice())?;
        out.write_all(self.field_data.as_slice())?;
        out.write_all(self.field_indices.as_slice())?;
        out.write_all(self.list_indices.as_slice())?;

        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod test {
    use binrw::BinRead;
    use pretty_assertions::{assert_eq, assert_str_eq};
    use std::io::Cursor;
    use tracing_test::traced_test;

    use crate::error::Result;
    use crate::read::{decode, Gff};
    use crate::types::{FileType, GffHeader};
    use crate::value::Struct;
    use crate::write::{encode, encode_with, GffWriterOptions};

    #[traced_test]
    #[test]
    fn encode_minimal_document() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            // Header
            0x47, 0x46, 0x46, 0x20, 0x56, 0x33, 0x2E, 0x32,
            0x38, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x44, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x50, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x60, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00,
            0x68, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x68, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Structs
            0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            // Fields
            0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Labels
            0x54, 0x61, 0x67, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Field data
            0x03, 0x00, 0x00, 0x00, 0x61, 0x62, 0x63, 0x00,
        ];

        let gff = Gff::with_root(FileType::GFF, Struct::root().with("Tag", "abc")?);
        let result = encode(&gff)?;

        assert_eq!(result.len(), expected.len());
        assert_str_eq!(format!("{:02X?}", result), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn encode_list_layout() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            // Header
            0x47, 0x46, 0x46, 0x20, 0x56, 0x33, 0x2E, 0x32,
            0x38, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
            0x5C, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
            0x74, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
            0x94, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x94, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x94, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00,
            // Structs: root, a single field struct, an empty struct
            0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x07, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00,
            // Fields
            0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            // Labels
            0x4C, 0x69, 0x73, 0x74, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x41, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // List indices
            0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
        ];

        let list = vec![Struct::new(0).with("A", 1u8)?, Struct::new(7)];
        let gff = Gff::with_root(FileType::GFF, Struct::root().with("List", list)?);
        let result = encode(&gff)?;

        assert_str_eq!(format!("{:02X?}", result), format!("{:02X?}", expected));
        assert_eq!(decode(&result)?, gff);

        Ok(())
    }

    #[test]
    fn labels_are_shared_between_structs() -> Result<()> {
        let item = |tag: &str| Struct::new(0).with("Tag", tag).and_then(|s| s.with("Stack", 1u16));
        let root = Struct::root()
            .with("Tag", "chest")?
            .with("ItemList", vec![item("sword")?, item("shield")?])?;
        let result = encode(&Gff::with_root(FileType::GFF, root))?;

        let header = GffHeader::read(&mut Cursor::new(&result[..56]))?;
        assert_eq!(header.label_count, 3);
        assert_eq!(header.field_count, 6);

        Ok(())
    }

    #[test]
    fn unpadded_field_data() -> Result<()> {
        let gff = Gff::with_root(FileType::GFF, Struct::root().with("Tag", "abc")?);
        let options = GffWriterOptions::builder().pad_field_data(false).build();

        let padded = encode(&gff)?;
        let unpadded = encode_with(&gff, options)?;

        assert_eq!(padded.len(), 104);
        assert_eq!(unpadded.len(), 103);
        assert_eq!(decode(&unpadded)?, gff);

        Ok(())
    }

    #[test]
    fn encode_is_deterministic() -> Result<()> {
        let root = Struct::root()
            .with("Gold", 120u32)?
            .with("XP", 9001u64)?
            .with("Nested", Struct::new(3).with("Flag", true)?)?;
        let gff = Gff::with_root(FileType::UTC, root);

        assert_eq!(encode(&gff)?, encode(&gff)?);
        assert_eq!(encode(&decode(&encode(&gff)?)?)?, encode(&gff)?);

        Ok(())
    }
}
