//! This library handles reading from and creating **DRS** files used by *Age of Empires*.
//!
//! # DRS Archive Format Documentation
//!
//! This crate provides utilities to read, extract and rebuild the **DRS** resource archives used
//! by the asset pipeline of *Age of Empires*. A DRS file bundles many payload files, grouped into
//! tables by type, behind a fixed layout index. DRS files are typically identified with the
//! `.drs` extension.
//!
//! ## File Structure
//!
//! A DRS file consists of a header, followed by the table headers, the file index of every table,
//! and finally the payloads.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Copyright              | 40 bytes: Printable ASCII, not null terminated             |
//! | 0x0028         | Version                | 4 bytes: Format version such as "1.00"                     |
//! | 0x002C         | Archive Type           | 12 bytes: Printable ASCII such as "tribe"                  |
//! | 0x0038         | Table Count            | 4 bytes: Number of tables in the archive                   |
//! | 0x003C         | First File Offset      | 4 bytes: Offset of the first table's file index            |
//!
//! ### Header
//!
//! - **Copyright**: A 40-byte slot. The text is the run of printable ASCII (`0x20..=0x7E`) at
//!   the start of the slot, anything after the first other byte is not part of the text.
//! - **Version**: 4 bytes of text, read verbatim.
//! - **Archive Type**: A 12-byte slot following the same rules as the copyright.
//! - **Table Count**: A 4-byte signed integer.
//! - **First File Offset**: A 4-byte signed integer.
//!
//! ### Table Headers
//!
//! Directly after the header, one entry per table:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | File Type              | 1 byte: Classification tag of the table's files         |
//! | 0x0001         | Extension              | 3 bytes: File extension, stored reversed                |
//! | 0x0004         | Table Offset           | 4 bytes: Offset to the start of this table's file index |
//! | 0x0008         | File Count             | 4 bytes: Number of files in this table                  |
//!
//! The extension is stored back to front, `bin` is stored as `nib`.
//!
//! ### File Index
//!
//! At each table's offset, one entry per file:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | ID                     | 4 bytes: Identifier of the file                         |
//! | 0x0004         | Data Offset            | 4 bytes: Offset to the start of the file's data         |
//! | 0x0008         | Size                   | 4 bytes: Size of the file's data                        |
//!
//! ### Data
//!
//! The payloads follow the file index, stored as is without compression.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.drs`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod build;
pub mod cursor;
pub mod error;
pub mod extract;
pub mod read;
pub mod report;
pub mod types;
pub mod write;

pub use extract::{ExtractOptions, ExtractReport};
pub use types::{Archive, FileEntry, Header, Table};
pub use write::ArchiveWriter;
