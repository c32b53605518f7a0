//! Types for writing DRS archives
//!

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::{debug, instrument};

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::types::{Archive, IndexEntry, TableHeader};

fn to_i32<T>(field: &'static str, value: T) -> Result<i32>
where
    T: TryInto<i32> + Copy + Display,
{
    value.try_into().map_err(|_| Error::InvalidField {
        field,
        reason: format!("{value} does not fit in a 32 bit field"),
    })
}

impl Archive {
    /// Encode the archive into a new buffer
    ///
    /// The archive is only written if it still matches the size it was loaded
    /// with and its first table directly follows the table headers. Nothing is
    /// corrected automatically, see [`Error::SizeMismatch`] and
    /// [`Error::OffsetMismatch`].
    #[instrument(skip_all, fields(tables = self.tables.len()), err)]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let total = self.encoded_size();
        if total != self.recorded_file_size {
            return Err(Error::SizeMismatch {
                expected: self.recorded_file_size,
                actual: total,
            });
        }

        let len = usize::try_from(total).map_err(|_| Error::AllocationError {
            what: "archive bytes",
            count: usize::MAX,
        })?;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| Error::AllocationError {
                what: "archive bytes",
                count: len,
            })?;
        buffer.resize(len, 0);

        let mut cursor = ByteCursor::new(buffer);

        cursor.write_bytes("copyright", self.header.copyright.as_bytes())?;
        cursor.write_bytes("version", &self.header.version.0)?;
        cursor.write_bytes("archive type", self.header.archive_type.as_bytes())?;
        cursor.write_i32("table count", to_i32("table count", self.tables.len())?)?;
        cursor.write_i32("first file offset", self.header.first_file_offset)?;

        for table in &self.tables {
            cursor.write_record(
                "table header",
                &TableHeader {
                    file_type: table.file_type,
                    extension: table.extension,
                    table_offset: to_i32("table offset", table.table_offset)?,
                    file_count: to_i32("file count", table.file_count())?,
                },
            )?;
        }

        let first = self.tables.first().ok_or(Error::MissingTables)?;
        if cursor.position() as u64 != u64::from(first.table_offset) {
            return Err(Error::OffsetMismatch {
                expected: cursor.position() as u64,
                actual: u64::from(first.table_offset),
            });
        }

        for (_, file) in self.entries() {
            cursor.write_record(
                "file index entry",
                &IndexEntry {
                    id: file.id,
                    offset: to_i32("file offset", file.source_offset)?,
                    size: to_i32("file size", file.size())?,
                },
            )?;
        }

        for (_, file) in self.entries() {
            cursor.write_bytes("file data", &file.data)?;
        }

        debug!(size = cursor.position(), "encoded archive");

        Ok(cursor.into_inner())
    }

    /// Encode the archive and write it to `path`
    ///
    /// Unless `overwrite` is set an existing file at `path` is left untouched
    /// and an error is returned.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let io_error = |source| Error::Io {
            action: "writing",
            path: path.to_path_buf(),
            source,
        };
        let file = options.open(path).map_err(io_error)?;
        ArchiveWriter::new(file)
            .write_bytes(&bytes)
            .map_err(|err| match err {
                Error::IOError(source) => io_error(source),
                other => other,
            })
    }
}

/// DRS archive writer
///
/// ```
/// # fn doit() -> drs_archive::error::Result<()>
/// # {
/// use drs_archive::{Archive, ArchiveWriter, Table};
///
/// let archive = Archive::builder()
///     .copyright("Copyright (c) 1997 Ensemble Studios.")
///     .archive_type("tribe")
///     .tables(vec![Table::new(b'a', "bin")?.with_file(50500, b"Hello, World!".to_vec())])
///     .build()?;
///
/// // We use a buffer here, though you'd normally use a `File`
/// let mut drs = ArchiveWriter::new(Vec::new());
/// drs.write(&archive)?;
///
/// assert_eq!(drs.into_inner().len() as u64, archive.recorded_file_size);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct ArchiveWriter<W: Write> {
    inner: W,
}

impl<W: Write> ArchiveWriter<W> {
    /// Wrap a writer that will receive encoded archives
    pub fn new(inner: W) -> ArchiveWriter<W> {
        ArchiveWriter { inner }
    }

    /// Encode `archive` and write every byte of it
    #[instrument(skip_all, err)]
    pub fn write(&mut self, archive: &Archive) -> Result<()> {
        let bytes = archive.to_bytes()?;
        self.write_bytes(&bytes)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        // A short write surfaces as `ErrorKind::WriteZero`
        self.inner.write_all(bytes)?;
        self.inner.flush()?;
        Ok(())
    }

    /// Unwrap and return the inner writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod test {
    use std::io::{self, Write};

    use pretty_assertions::assert_str_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::types::{Archive, Extension, FileEntry, FixedText, Header, Table, Version};
    use crate::write::ArchiveWriter;

    fn single_entry() -> Archive {
        Archive {
            header: Header {
                copyright: FixedText::new("copyright", "Copyright").unwrap(),
                version: Version(*b"1.00"),
                archive_type: FixedText::new("archive type", "tribe").unwrap(),
                first_file_offset: 76,
            },
            tables: vec![Table {
                file_type: b'a',
                extension: Extension(*b"bin"),
                table_offset: 76,
                files: vec![FileEntry {
                    id: 1,
                    source_offset: 88,
                    data: b"Hi".to_vec(),
                }],
            }],
            recorded_file_size: 90,
        }
    }

    #[traced_test]
    #[test]
    fn drs_single_entry_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // Header
            0x43, 0x6F, 0x70, 0x79, 0x72, 0x69, 0x67, 0x68, 0x74, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x31, 0x2E, 0x30, 0x30,
            0x74, 0x72, 0x69, 0x62, 0x65, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x4C, 0x00, 0x00, 0x00,
            // Tables
            0x61, 0x6E, 0x69, 0x62,
            0x4C, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            // Files
            0x01, 0x00, 0x00, 0x00,
            0x58, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            // Data
            0x48, 0x69,
        ];

        let actual = single_entry().to_bytes()?;
        assert_eq!(actual.len(), expected.len());
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn drs_write_after_adding_file() {
        let mut archive = single_entry();
        archive.tables[0].files.push(FileEntry::new(2, b"!".to_vec()));

        assert!(matches!(
            archive.to_bytes(),
            Err(Error::SizeMismatch {
                expected: 90,
                actual: 103
            })
        ));
    }

    #[traced_test]
    #[test]
    fn drs_write_after_growing_payload() {
        let mut archive = single_entry();
        archive.tables[0].files[0].data.push(b'!');

        assert!(matches!(
            archive.to_bytes(),
            Err(Error::SizeMismatch {
                expected: 90,
                actual: 91
            })
        ));
    }

    #[traced_test]
    #[test]
    fn drs_write_with_misplaced_first_table() {
        let mut archive = single_entry();
        archive.tables[0].table_offset = 80;

        assert!(matches!(
            archive.to_bytes(),
            Err(Error::OffsetMismatch {
                expected: 76,
                actual: 80
            })
        ));
    }

    #[traced_test]
    #[test]
    fn drs_write_without_tables() {
        let archive = Archive {
            tables: Vec::new(),
            recorded_file_size: 64,
            ..single_entry()
        };

        assert!(matches!(archive.to_bytes(), Err(Error::MissingTables)));
    }

    struct ShortWriter;

    impl Write for ShortWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[traced_test]
    #[test]
    fn drs_short_write() {
        let mut writer = ArchiveWriter::new(ShortWriter);

        match writer.write(&single_entry()) {
            Err(Error::IOError(err)) => assert_eq!(err.kind(), io::ErrorKind::WriteZero),
            other => panic!("expected a write error, got {other:?}"),
        }
    }
}
