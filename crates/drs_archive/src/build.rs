//! Laying out new archives from loose files

use bon::bon;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{
    Archive, FixedText, Header, Table, Version, FILE_ENTRY_SIZE, HEADER_SIZE, TABLE_HEADER_SIZE,
};

/// Version written when none is given
pub const DEFAULT_VERSION: &str = "1.00";

/// Archive type written when none is given
pub const DEFAULT_ARCHIVE_TYPE: &str = "tribe";

fn offset(field: &'static str, position: usize) -> Result<u32> {
    i32::try_from(position)
        .map(|p| p as u32)
        .map_err(|_| Error::InvalidField {
            field,
            reason: format!("offset {position} does not fit in a 32 bit field"),
        })
}

#[bon]
impl Archive {
    /// Lay out a new archive
    ///
    /// Table headers are followed by every table's file index and then every
    /// payload, in table then file order. All offsets in `tables` are replaced
    /// and the recorded size is set to the encoded size, so the result can be
    /// written as is.
    ///
    /// ```
    /// # fn doit() -> drs_archive::error::Result<()>
    /// # {
    /// use drs_archive::{Archive, Table};
    ///
    /// let drs = Archive::builder()
    ///     .copyright("Copyright (c) 1997 Ensemble Studios.")
    ///     .tables(vec![
    ///         Table::new(b' ', "wav")?.with_file(1, b"RIFF".to_vec()),
    ///         Table::new(b'a', "slp")?.with_file(2, b"2.0N".to_vec()),
    ///     ])
    ///     .build()?;
    ///
    /// assert_eq!(drs.tables[0].table_offset, 88);
    /// assert_eq!(drs.recorded_file_size, 120);
    /// # Ok(())
    /// # }
    /// # doit().unwrap();
    /// ```
    #[builder]
    pub fn new(
        copyright: Option<&str>,
        version: Option<&str>,
        archive_type: Option<&str>,
        tables: Vec<Table>,
    ) -> Result<Self> {
        let mut tables = tables;
        if tables.is_empty() {
            return Err(Error::MissingTables);
        }

        let header = Header {
            copyright: FixedText::new("copyright", copyright.unwrap_or_default())?,
            version: Version::new(version.unwrap_or(DEFAULT_VERSION))?,
            archive_type: FixedText::new(
                "archive type",
                archive_type.unwrap_or(DEFAULT_ARCHIVE_TYPE),
            )?,
            first_file_offset: 0,
        };

        let mut position = HEADER_SIZE + tables.len() * TABLE_HEADER_SIZE;
        let first_file_offset = offset("first file offset", position)? as i32;

        for table in tables.iter_mut() {
            table.table_offset = offset("table offset", position)?;
            position += table.file_count() * FILE_ENTRY_SIZE;
        }

        for table in tables.iter_mut() {
            for file in table.files.iter_mut() {
                file.source_offset = offset("file offset", position)?;
                position = position
                    .checked_add(file.size())
                    .ok_or_else(|| Error::InvalidField {
                        field: "file size",
                        reason: format!("{} bytes overflows the archive", file.size()),
                    })?;
            }
        }

        debug!(tables = tables.len(), size = position, "laid out archive");

        Ok(Archive {
            header: Header {
                first_file_offset,
                ..header
            },
            tables,
            recorded_file_size: position as u64,
        })
    }
}
