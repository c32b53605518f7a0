//! Bounds checked little-endian field access over a byte buffer.
//!
//! [`ByteCursor`] is shared by the reader and the writer. Every access names the
//! field being touched so that an out of range offset is reported as a
//! [`FormatError::OutOfBounds`] instead of a panic.

use std::io::Cursor;
use std::ops::Range;

use binrw::{BinRead, BinWrite, Endian};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{FormatError, Result};

/// A structure with a fixed on-disk size
pub trait FixedSize {
    /// Number of bytes the structure occupies in the archive
    const SIZE: usize;
}

/// A position within a byte buffer
///
/// Reading is available for any buffer, writing for buffers that can be borrowed
/// mutably. Writes never grow the buffer, the writer allocates the full archive
/// size up front.
///
/// ```
/// use drs_archive::cursor::ByteCursor;
///
/// let mut cursor = ByteCursor::new([0x01u8, 0x00, 0x00, 0x00, 0xFF]);
/// assert_eq!(cursor.read_i32("count").unwrap(), 1);
/// assert!(cursor.read_i32("offset").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<T> {
    inner: T,
    position: usize,
}

impl<T> ByteCursor<T> {
    /// Create a cursor at the start of `inner`
    pub const fn new(inner: T) -> Self {
        Self { inner, position: 0 }
    }

    /// Current absolute position
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Unwrap and return the underlying buffer
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: AsRef<[u8]>> ByteCursor<T> {
    fn len(&self) -> usize {
        self.inner.as_ref().len()
    }

    fn span(&self, field: &'static str, offset: usize, len: usize) -> Result<Range<usize>> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len() => Ok(offset..end),
            _ => Err(FormatError::OutOfBounds {
                field,
                offset,
                len,
                available: self.len().saturating_sub(offset),
            }
            .into()),
        }
    }

    /// Borrow `len` bytes at an absolute offset without moving the cursor
    pub fn slice_at(&self, field: &'static str, offset: usize, len: usize) -> Result<&[u8]> {
        let range = self.span(field, offset, len)?;
        Ok(&self.inner.as_ref()[range])
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn read_bytes(&mut self, field: &'static str, len: usize) -> Result<&[u8]> {
        let range = self.span(field, self.position, len)?;
        self.position = range.end;
        Ok(&self.inner.as_ref()[range])
    }

    /// Copy the next `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(field, N)?);
        Ok(out)
    }

    /// Read a single byte
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.read_bytes(field, 1)?.read_u8()?)
    }

    /// Read a little-endian signed 32 bit integer
    pub fn read_i32(&mut self, field: &'static str) -> Result<i32> {
        Ok(self.read_bytes(field, 4)?.read_i32::<LittleEndian>()?)
    }

    /// Read a fixed size little-endian structure
    pub fn read_record<R>(&mut self, field: &'static str) -> Result<R>
    where
        R: BinRead + FixedSize,
        for<'a> R::Args<'a>: Default,
    {
        let bytes = self.read_bytes(field, R::SIZE)?;
        Ok(R::read_options(
            &mut Cursor::new(bytes),
            Endian::Little,
            Default::default(),
        )?)
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> ByteCursor<T> {
    fn next_mut(&mut self, field: &'static str, len: usize) -> Result<&mut [u8]> {
        let range = self.span(field, self.position, len)?;
        self.position = range.end;
        Ok(&mut self.inner.as_mut()[range])
    }

    /// Copy `bytes` to the position and advance past them
    pub fn write_bytes(&mut self, field: &'static str, bytes: &[u8]) -> Result<()> {
        self.next_mut(field, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Write a single byte
    pub fn write_u8(&mut self, field: &'static str, value: u8) -> Result<()> {
        self.next_mut(field, 1)?.write_u8(value)?;
        Ok(())
    }

    /// Write a little-endian signed 32 bit integer
    pub fn write_i32(&mut self, field: &'static str, value: i32) -> Result<()> {
        self.next_mut(field, 4)?.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write a fixed size little-endian structure
    pub fn write_record<W>(&mut self, field: &'static str, record: &W) -> Result<()>
    where
        W: BinWrite + FixedSize,
        for<'a> W::Args<'a>: Default,
    {
        let bytes = self.next_mut(field, W::SIZE)?;
        record.write_options(&mut Cursor::new(bytes), Endian::Little, Default::default())?;
        Ok(())
    }
}
