//! Types for reading DRS archives
//!

use std::io::Read;
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::cursor::ByteCursor;
use crate::error::{Error, FormatError, Result};
use crate::types::{
    Archive, FileEntry, FixedText, Header, IndexEntry, Table, TableHeader, Version,
    ARCHIVE_TYPE_LEN, COPYRIGHT_LEN, FILE_ENTRY_SIZE, HEADER_SIZE, TABLE_HEADER_SIZE,
};

fn non_negative(field: &'static str, value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| FormatError::NegativeValue { field, value }.into())
}

fn reserve<T>(what: &'static str, count: usize) -> Result<Vec<T>> {
    let mut items = Vec::new();
    items
        .try_reserve_exact(count)
        .map_err(|_| Error::AllocationError { what, count })?;
    Ok(items)
}

impl Archive {
    /// Decode an archive from a complete in-memory copy of the file
    ///
    /// Every payload is copied out of `bytes`, the returned archive does not
    /// borrow from it.
    ///
    /// ```no_run
    /// fn list_drs_contents(bytes: &[u8]) -> drs_archive::error::Result<()> {
    ///     let drs = drs_archive::Archive::load(bytes)?;
    ///
    ///     for (table, file) in drs.entries() {
    ///         println!("{}.{}: {} bytes", file.id, table.extension.as_str(), file.size());
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip_all, fields(len = bytes.len()), err)]
    pub fn load(bytes: &[u8]) -> Result<Archive> {
        if bytes.len() <= HEADER_SIZE {
            return Err(FormatError::TooSmall {
                len: bytes.len(),
                min: HEADER_SIZE,
            }
            .into());
        }

        let mut cursor = ByteCursor::new(bytes);

        let copyright = FixedText::from_raw(cursor.read_array::<COPYRIGHT_LEN>("copyright")?);
        let version = Version(cursor.read_array("version")?);
        let archive_type =
            FixedText::from_raw(cursor.read_array::<ARCHIVE_TYPE_LEN>("archive type")?);
        let table_count = non_negative("table count", cursor.read_i32("table count")?)?;
        let first_file_offset = cursor.read_i32("first file offset")?;

        let header = Header {
            copyright,
            version,
            archive_type,
            first_file_offset,
        };

        // The table headers must fit before anything is reserved for them
        cursor.slice_at(
            "table headers",
            cursor.position(),
            table_count.saturating_mul(TABLE_HEADER_SIZE),
        )?;

        let mut tables = reserve("tables", table_count)?;
        for _ in 0..table_count {
            let table_header: TableHeader = cursor.read_record("table header")?;
            tables.push(Self::read_table(&cursor, table_header)?);
        }

        debug!(
            copyright = header.copyright.as_str(),
            tables = tables.len(),
            "loaded archive"
        );

        Ok(Archive {
            header,
            tables,
            recorded_file_size: bytes.len() as u64,
        })
    }

    /// Read an archive from the remainder of `reader`
    pub fn read_from<R: Read>(mut reader: R) -> Result<Archive> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::load(&bytes)
    }

    /// Read and decode the archive at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Archive> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            action: "reading",
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(&bytes)
    }

    #[instrument(skip(source), fields(extension = %header.extension.as_str()), err)]
    fn read_table(source: &ByteCursor<&[u8]>, header: TableHeader) -> Result<Table> {
        let table_offset = non_negative("table offset", header.table_offset)?;
        let file_count = non_negative("file count", header.file_count)?;

        let mut index = ByteCursor::new(source.slice_at(
            "file index",
            table_offset,
            file_count.saturating_mul(FILE_ENTRY_SIZE),
        )?);

        let mut files = reserve("file entries", file_count)?;
        for _ in 0..file_count {
            let entry: IndexEntry = index.read_record("file index entry")?;
            let offset = non_negative("file offset", entry.offset)?;
            let size = non_negative("file size", entry.size)?;
            let payload = source.slice_at("file data", offset, size)?;

            let mut data = Vec::new();
            if data.try_reserve_exact(size).is_ok() {
                data.extend_from_slice(payload);
            } else {
                // One unreadable payload must not lose the rest of the archive
                warn!(id = entry.id, size, "unable to allocate payload, keeping empty entry");
            }

            files.push(FileEntry {
                id: entry.id,
                source_offset: offset as u32,
                data,
            });
        }

        Ok(Table {
            file_type: header.file_type,
            extension: header.extension,
            table_offset: table_offset as u32,
            files,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, FormatError};
    use crate::types::{Archive, HEADER_SIZE};

    #[rustfmt::skip]
    fn single_entry() -> Vec<u8> {
        let mut input = Vec::new();
        // Header (64)
        input.extend_from_slice(b"Copyright (c) 1997 Ensemble Studios.\x1A\0\0\0");
        input.extend_from_slice(b"1.00");
        input.extend_from_slice(b"tribe\0\0\0\0\0\0\0");
        input.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]);
        input.extend_from_slice(&[0x4C, 0x00, 0x00, 0x00]);
        // Table headers (12)
        input.extend_from_slice(&[
            0x20, 0x76, 0x61, 0x77,
            0x4C, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
        ]);
        // File index (12)
        input.extend_from_slice(&[
            0x07, 0x00, 0x00, 0x00,
            0x58, 0x00, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
        ]);
        // Data (11)
        input.extend_from_slice(b"Hello World");
        input
    }

    #[test]
    fn read_uncompressed_drs_with_entry() -> crate::error::Result<()> {
        let input = single_entry();
        let archive = Archive::load(&input)?;

        assert_eq!(archive.header.copyright.as_str(), "Copyright (c) 1997 Ensemble Studios.");
        assert_eq!(archive.header.version.as_str(), "1.00");
        assert_eq!(archive.header.archive_type.as_str(), "tribe");
        assert_eq!(archive.header.first_file_offset, 76);
        assert_eq!(archive.recorded_file_size, input.len() as u64);
        assert_eq!(archive.table_count(), 1);

        let table = &archive.tables[0];
        assert_eq!(table.file_type, b' ');
        assert_eq!(table.extension.as_str(), "wav");
        assert_eq!(table.table_offset, 76);
        assert_eq!(table.file_count(), 1);

        let file = &table.files[0];
        assert_eq!(file.id, 7);
        assert_eq!(file.source_offset, 88);
        assert_eq!(file.data, b"Hello World");

        Ok(())
    }

    #[test]
    fn copyright_truncates_without_moving_version() -> crate::error::Result<()> {
        let mut input = single_entry();
        input[5] = 0x00;

        let archive = Archive::load(&input)?;
        assert_eq!(archive.header.copyright.as_str(), "Copyr");
        assert_eq!(archive.header.version.as_str(), "1.00");
        assert_eq!(archive.header.archive_type.as_str(), "tribe");

        Ok(())
    }

    #[test]
    fn read_header_only_buffer() {
        let input = vec![0x20u8; HEADER_SIZE];
        let err = Archive::load(&input).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::TooSmall { len: 64, min: 64 })
        ));

        assert!(Archive::load(&input[..HEADER_SIZE - 1]).is_err());
    }

    #[test]
    fn read_payload_past_end() {
        let mut input = single_entry();
        // size 0x0B -> 0x0C runs one byte past the buffer
        input[84] = 0x0C;

        let err = Archive::load(&input).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::OutOfBounds {
                field: "file data",
                offset: 88,
                len: 12,
                available: 11,
            })
        ));
    }

    #[test]
    fn read_table_index_past_end() {
        let mut input = single_entry();
        // table offset 0x4C -> 0xFC
        input[68] = 0xFC;

        assert!(matches!(
            Archive::load(&input),
            Err(Error::Format(FormatError::OutOfBounds { field: "file index", .. }))
        ));
    }

    #[test]
    fn read_negative_table_count() {
        let mut input = single_entry();
        input[56..60].copy_from_slice(&(-1i32).to_le_bytes());

        assert!(matches!(
            Archive::load(&input),
            Err(Error::Format(FormatError::NegativeValue {
                field: "table count",
                value: -1
            }))
        ));
    }

    #[test]
    fn read_oversized_table_count() {
        let mut input = single_entry();
        input[56..60].copy_from_slice(&i32::MAX.to_le_bytes());

        assert!(matches!(
            Archive::load(&input),
            Err(Error::Format(FormatError::OutOfBounds { field: "table headers", .. }))
        ));
    }
}
