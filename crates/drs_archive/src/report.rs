//! Human readable listings of archive contents.
//!
//! Formatting an [`Archive`] prints its header followed by every table. The
//! alternate flag (`{:#}`) also lists the files of each table.

use std::fmt::{self, Display};

use crate::types::{Archive, FileEntry, Header, Table};

fn field(
    f: &mut fmt::Formatter<'_>,
    indent: &str,
    label: &str,
    value: impl Display,
) -> fmt::Result {
    writeln!(f, "{indent}{label:>20}  {value}")
}

fn header_text(f: &mut fmt::Formatter<'_>, header: &Header) -> fmt::Result {
    field(f, "", "Copyright info:", header.copyright.as_str())?;
    field(f, "", "File version:", header.version.as_str())?;
    field(f, "", "Archive type:", header.archive_type.as_str())
}

fn first_file_offset(f: &mut fmt::Formatter<'_>, header: &Header) -> fmt::Result {
    field(f, "", "1st file offset:", format_args!("{:#X}", header.first_file_offset))
}

impl Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        header_text(f, self)?;
        first_file_offset(f, self)
    }
}

impl Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        field(f, "\t\t", "File ID:", format_args!("{:04}", self.id))?;
        field(f, "\t\t", "File Offset:", format_args!("{:#X}", self.source_offset))?;
        field(f, "\t\t", "File Size:", format_args!("{:>11}", self.size()))
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printable = if self.file_type.is_ascii_graphic() || self.file_type == b' ' {
            self.file_type as char
        } else {
            '.'
        };
        field(
            f,
            "\t",
            "File type ID:",
            format_args!("{:#04X} ({printable})", self.file_type),
        )?;
        field(f, "\t", "Extension:", self.extension.as_str())?;
        field(f, "\t", "Table offset:", format_args!("{:#X}", self.table_offset))?;
        field(f, "\t", "File count:", self.file_count())?;

        if f.alternate() {
            writeln!(f)?;
            field(f, "\t", "Files:", "")?;
            for file in &self.files {
                writeln!(f)?;
                Display::fmt(file, f)?;
            }
        }
        Ok(())
    }
}

impl Display for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        header_text(f, &self.header)?;
        field(f, "", "Num. tables in file:", self.table_count())?;
        first_file_offset(f, &self.header)?;
        field(f, "", "File size:", self.recorded_file_size)?;

        for (index, table) in self.tables.iter().enumerate() {
            writeln!(f, "\nTABLE {index}:\n")?;
            Display::fmt(table, f)?;
        }
        Ok(())
    }
}
