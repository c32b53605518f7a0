//! Base types for structure of DRS file.

use std::borrow::Cow;

use binrw::{BinRead, BinWrite};

use crate::cursor::FixedSize;
use crate::error::{Error, Result};

/// Size of the fixed archive header
pub const HEADER_SIZE: usize = COPYRIGHT_LEN + VERSION_LEN + ARCHIVE_TYPE_LEN + 4 + 4;

/// Width of the copyright slot
pub const COPYRIGHT_LEN: usize = 40;

/// Width of the version slot
pub const VERSION_LEN: usize = 4;

/// Width of the archive type slot
pub const ARCHIVE_TYPE_LEN: usize = 12;

/// Width of a table extension
pub const EXTENSION_LEN: usize = 3;

/// Size of one table header
pub const TABLE_HEADER_SIZE: usize = 12;

/// Size of one file index entry
pub const FILE_ENTRY_SIZE: usize = 12;

fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

/// A text field stored in a fixed width slot
///
/// The slot is kept byte for byte as it was read. The text is the run of
/// printable ASCII at the start of the slot, everything from the first other
/// byte onwards is ignored when reading it back.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FixedText<const N: usize> {
    raw: [u8; N],
}

impl<const N: usize> FixedText<N> {
    /// Wrap a slot exactly as stored on disk
    pub const fn from_raw(raw: [u8; N]) -> Self {
        Self { raw }
    }

    /// Build a slot from text, zero-padding the rest
    ///
    /// Fails if the text does not fit or contains anything outside printable ASCII.
    pub fn new(field: &'static str, text: &str) -> Result<Self> {
        if text.len() > N {
            return Err(Error::InvalidField {
                field,
                reason: format!("{} bytes does not fit in {N}", text.len()),
            });
        }
        if let Some(byte) = text.bytes().find(|b| !is_printable(*b)) {
            return Err(Error::InvalidField {
                field,
                reason: format!("byte {byte:#04X} is not printable ascii"),
            });
        }

        let mut raw = [0u8; N];
        raw[..text.len()].copy_from_slice(text.as_bytes());
        Ok(Self { raw })
    }

    /// The decoded text
    pub fn as_str(&self) -> &str {
        let len = self.raw.iter().position(|b| !is_printable(*b)).unwrap_or(N);
        // printable ascii is always valid utf-8
        std::str::from_utf8(&self.raw[..len]).unwrap_or_default()
    }

    /// The slot as stored on disk
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.raw
    }
}

impl<const N: usize> Default for FixedText<N> {
    fn default() -> Self {
        Self { raw: [0u8; N] }
    }
}

/// Four character format version, stored verbatim
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Version(pub [u8; VERSION_LEN]);

impl Version {
    /// Build a version from exactly four bytes of text
    pub fn new(text: &str) -> Result<Self> {
        let raw = text
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InvalidField {
                field: "version",
                reason: format!("expected {VERSION_LEN} bytes, got {}", text.len()),
            })?;
        Ok(Self(raw))
    }

    /// The version as text, lossily decoded
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

/// Three character extension shared by every file in a table
///
/// Held in reading order. The archive stores it reversed, see
/// [`Extension::from_disk`] and [`Extension::to_disk`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Extension(pub [u8; EXTENSION_LEN]);

impl Extension {
    /// Build an extension from exactly three bytes of printable ascii
    pub fn new(text: &str) -> Result<Self> {
        let raw: [u8; EXTENSION_LEN] =
            text.as_bytes()
                .try_into()
                .map_err(|_| Error::InvalidField {
                    field: "extension",
                    reason: format!("expected {EXTENSION_LEN} bytes, got {}", text.len()),
                })?;
        if let Some(byte) = raw.iter().find(|b| !is_printable(**b)) {
            return Err(Error::InvalidField {
                field: "extension",
                reason: format!("byte {byte:#04X} is not printable ascii"),
            });
        }
        Ok(Self(raw))
    }

    /// Decode the reversed on-disk bytes
    pub fn from_disk(mut raw: [u8; EXTENSION_LEN]) -> Self {
        raw.reverse();
        Self(raw)
    }

    /// Encode into reversed on-disk bytes
    pub fn to_disk(&self) -> [u8; EXTENSION_LEN] {
        let mut raw = self.0;
        raw.reverse();
        raw
    }

    /// The extension as text, lossily decoded
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

/// DRS file header
///
/// The table count stored on disk is the length of [`Archive::tables`].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Header {
    /// Free form copyright notice
    pub copyright: FixedText<COPYRIGHT_LEN>,

    /// Format version
    pub version: Version,

    /// Kind of archive, such as `tribe`
    pub archive_type: FixedText<ARCHIVE_TYPE_LEN>,

    /// Offset from the start of the file to the first table's file index
    pub first_file_offset: i32,
}

/// Table header as stored after the archive header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct TableHeader {
    /// Classification tag of the files in this table
    pub file_type: u8,

    /// Extension of the files in this table
    #[br(map = |raw: [u8; EXTENSION_LEN]| Extension::from_disk(raw))]
    #[bw(map = |extension: &Extension| extension.to_disk())]
    pub extension: Extension,

    /// Offset from the start of the file to this table's file index
    pub table_offset: i32,

    /// Number of entries in this table's file index
    pub file_count: i32,
}

impl FixedSize for TableHeader {
    const SIZE: usize = TABLE_HEADER_SIZE;
}

/// File index entry as stored at a table's offset
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct IndexEntry {
    /// Identifier of the file
    pub id: i32,

    /// Offset from the start of the file to the payload
    pub offset: i32,

    /// Length of the payload
    pub size: i32,
}

impl FixedSize for IndexEntry {
    const SIZE: usize = FILE_ENTRY_SIZE;
}

/// A single file stored in the archive
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FileEntry {
    /// Identifier of the file, unique within its table by convention
    pub id: i32,

    /// Offset of the payload in the buffer the archive was loaded from
    ///
    /// Only meaningful right after loading or building.
    pub source_offset: u32,

    /// The payload
    pub data: Vec<u8>,
}

impl FileEntry {
    /// Create an entry that has not been placed in an archive yet
    pub fn new(id: i32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            source_offset: 0,
            data: data.into(),
        }
    }

    /// Length of the payload in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A group of files sharing a type and extension
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Table {
    /// Classification tag of the files in this table
    pub file_type: u8,

    /// Extension of the files in this table
    pub extension: Extension,

    /// Offset of this table's file index in the buffer the archive was loaded from
    pub table_offset: u32,

    /// Files in on-disk order
    pub files: Vec<FileEntry>,
}

impl Table {
    /// Create an empty table
    pub fn new(file_type: u8, extension: &str) -> Result<Self> {
        Ok(Self {
            file_type,
            extension: Extension::new(extension)?,
            table_offset: 0,
            files: Vec::new(),
        })
    }

    /// Append a file, returning the table
    pub fn with_file(mut self, id: i32, data: impl Into<Vec<u8>>) -> Self {
        self.files.push(FileEntry::new(id, data));
        self
    }

    /// Number of files in this table
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Size of the file index and payloads belonging to this table
    pub fn encoded_size(&self) -> u64 {
        self.files
            .iter()
            .map(|f| (FILE_ENTRY_SIZE + f.size()) as u64)
            .sum()
    }
}

/// A decoded DRS archive
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Archive {
    /// The archive header
    pub header: Header,

    /// Tables in on-disk order
    pub tables: Vec<Table>,

    /// Size in bytes of the buffer this archive was loaded from
    ///
    /// Writing checks the archive against this value and never updates it.
    pub recorded_file_size: u64,
}

impl Archive {
    /// Number of tables in the archive
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of files across all tables
    pub fn len(&self) -> usize {
        self.tables.iter().map(Table::file_count).sum()
    }

    /// Whether the archive contains no files
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every file with its table, in table then file order
    pub fn entries(&self) -> impl Iterator<Item = (&Table, &FileEntry)> {
        self.tables
            .iter()
            .flat_map(|table| table.files.iter().map(move |file| (table, file)))
    }

    /// Size of the archive as it would be written now
    pub fn encoded_size(&self) -> u64 {
        (HEADER_SIZE + self.tables.len() * TABLE_HEADER_SIZE) as u64
            + self.tables.iter().map(Table::encoded_size).sum::<u64>()
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{Extension, FixedText, IndexEntry, TableHeader, Version};

    #[test]
    fn read_table_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x61,
            0x6E, 0x69, 0x62,
            0x64, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
        ]);

        let expected = TableHeader {
            file_type: b'a',
            extension: Extension(*b"bin"),
            table_offset: 100,
            file_count: 2,
        };

        assert_eq!(TableHeader::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn write_table_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x20,
            0x76, 0x61, 0x77,
            0x4C, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
        ];

        let header = TableHeader {
            file_type: b' ',
            extension: Extension(*b"wav"),
            table_offset: 76,
            file_count: 1,
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn extension_is_reversed_on_disk() {
        let extension = Extension::from_disk([0x41, 0x42, 0x43]);
        assert_eq!(extension.as_str(), "CBA");
        assert_eq!(extension.to_disk(), [0x41, 0x42, 0x43]);
    }

    #[test]
    fn read_index_entry() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x07, 0x00, 0x00, 0x00,
            0x58, 0x00, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
        ]);

        let expected = IndexEntry {
            id: 7,
            offset: 88,
            size: 11,
        };

        assert_eq!(IndexEntry::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn fixed_text_stops_at_first_unprintable_byte() {
        let mut raw = [0u8; 12];
        raw[..5].copy_from_slice(b"tribe");
        raw[6] = b'x';

        assert_eq!(FixedText::from_raw(raw).as_str(), "tribe");
        assert_eq!(FixedText::from_raw(*b"graphicsXXXX").as_str(), "graphicsXXXX");
    }

    #[test]
    fn fixed_text_rejects_what_it_cannot_store() {
        assert!(FixedText::<4>::new("copyright", "12345").is_err());
        assert!(FixedText::<4>::new("copyright", "a\tb").is_err());

        let text = FixedText::<6>::new("copyright", "abc").unwrap();
        assert_eq!(text.as_bytes(), b"abc\0\0\0");
    }

    #[test]
    fn version_requires_four_bytes() {
        assert_eq!(Version::new("1.00").unwrap().as_str(), "1.00");
        assert!(Version::new("1.0").is_err());
    }

    #[test]
    fn extension_requires_three_printable_bytes() {
        assert!(Extension::new("wav").is_ok());
        assert!(Extension::new("wave").is_err());
        assert!(Extension::new("w\0v").is_err());
    }
}
