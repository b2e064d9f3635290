//! Bounds-checked little-endian cursors over flat buffers.
//!
//! Every table of a GFF file is read through a [`ByteReader`] named after the table, so a failed
//! read reports which table was truncated and at which absolute offset. The writer side,
//! [`ByteWriter`], refuses to grow past the 32-bit range the format can address and supports
//! reserving space that is patched once a forward reference is known.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{Error, Result};

/// Largest buffer the format can address with its 32-bit offsets.
pub const ADDRESSABLE: usize = u32::MAX as usize;

/// Reader over a byte slice
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
    table: &'static str,
}

impl<'a> ByteReader<'a> {
    /// Create a reader for `data`, reporting errors against `table`.
    pub fn new(data: &'a [u8], table: &'static str) -> Self {
        Self::with_base(data, 0, table)
    }

    /// Create a reader for a slice that starts at absolute offset `base` of the file.
    pub fn with_base(data: &'a [u8], base: usize, table: &'static str) -> Self {
        Self {
            data,
            pos: 0,
            base,
            table,
        }
    }

    /// Position relative to the start of the slice
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Position relative to the start of the file
    pub fn absolute(&self) -> usize {
        self.base + self.pos
    }

    /// Length of the underlying slice
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying slice is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move to `pos`, relative to the start of the slice.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(self.truncated(pos, 0));
        }
        self.pos = pos;
        Ok(())
    }

    fn truncated(&self, at: usize, needed: usize) -> Error {
        Error::TruncatedInput {
            table: self.table,
            offset: self.base + at,
            needed,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| self.truncated(self.pos, n))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Split off the next `n` bytes as their own reader, keeping absolute offsets.
    pub fn sub_reader(&mut self, n: usize) -> Result<ByteReader<'a>> {
        let base = self.absolute();
        let data = self.take(n)?;
        Ok(ByteReader::with_base(data, base, self.table))
    }

    /// Read a fixed-width field of `max_len` bytes holding a NUL-padded string.
    ///
    /// The full width is always consumed. The string ends at the first NUL byte, or fills the
    /// whole field when there is none.
    pub fn read_cstring(&mut self, max_len: usize) -> Result<String> {
        let at = self.base + self.pos;
        let raw = self.take(max_len)?;
        let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        String::from_utf8(raw[..end].to_vec())
            .map_err(|_| Error::malformed(self.table, at, "string is not valid UTF-8"))
    }
}

/// Growable little-endian writer limited to the 32-bit addressable range
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
    limit: usize,
    table: &'static str,
}

impl ByteWriter {
    /// Create an empty writer, reporting errors against `table`.
    pub fn new(table: &'static str) -> Self {
        Self::with_limit(table, ADDRESSABLE)
    }

    /// Create an empty writer that refuses to grow past `limit` bytes.
    pub fn with_limit(table: &'static str, limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit: limit.min(ADDRESSABLE),
            table,
        }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current write offset as a format offset.
    pub fn offset(&self) -> u32 {
        // `ensure` keeps the buffer within `limit`, which never exceeds u32::MAX
        self.buf.len() as u32
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn ensure(&self, extra: usize) -> Result<()> {
        match self.buf.len().checked_add(extra) {
            Some(size) if size <= self.limit => Ok(()),
            _ => Err(Error::Overflow {
                table: self.table,
                size: self.buf.len().saturating_add(extra),
            }),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.ensure(1)?;
        self.buf.write_u8(value)?;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.ensure(2)?;
        self.buf.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.ensure(2)?;
        self.buf.write_i16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.ensure(4)?;
        self.buf.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.ensure(4)?;
        self.buf.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.ensure(8)?;
        self.buf.write_u64::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.ensure(8)?;
        self.buf.write_i64::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.ensure(4)?;
        self.buf.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.ensure(8)?;
        self.buf.write_f64::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Write `value` into a fixed-width field of `width` bytes, padding with NUL.
    pub fn write_cstring(&mut self, value: &str, width: usize) -> Result<()> {
        let bytes = value.as_bytes();
        if bytes.len() > width {
            return Err(Error::Overflow {
                table: self.table,
                size: bytes.len(),
            });
        }
        self.ensure(width)?;
        self.buf.extend_from_slice(bytes);
        self.buf.resize(self.buf.len() + width - bytes.len(), 0);
        Ok(())
    }

    /// Advance by `n` zero bytes, returning the offset of the reserved region.
    pub fn reserve(&mut self, n: usize) -> Result<usize> {
        self.ensure(n)?;
        let at = self.buf.len();
        self.buf.resize(at + n, 0);
        Ok(at)
    }

    /// Overwrite previously written bytes at `offset`.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|end| *end <= self.buf.len())
            .ok_or(Error::Overflow {
                table: self.table,
                size: offset.saturating_add(bytes.len()),
            })?;
        self.buf[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn patch_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        let mut raw = [0u8; 4];
        LittleEndian::write_u32(&mut raw, value);
        self.patch(offset, &raw)
    }

    /// Pad with zero bytes up to the next multiple of `alignment`, returning the padding length.
    pub fn pad_to(&mut self, alignment: usize) -> Result<usize> {
        let padding = (alignment - self.buf.len() % alignment) % alignment;
        self.reserve(padding)?;
        Ok(padding)
    }
}
