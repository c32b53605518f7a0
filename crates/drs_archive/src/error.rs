//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// I/O failure tied to a specific path
    #[error("{action} {}", path.display())]
    Io {
        /// What was being attempted (`reading`, `writing`, `creating directory`)
        action: &'static str,
        /// The path the call was made against
        path: PathBuf,
        /// The underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is an invalid drs archive
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    /// unable to reserve memory for {what}
    #[error("unable to reserve memory for {count} {what}")]
    AllocationError {
        /// The collection that could not be reserved
        what: &'static str,
        /// The number of elements requested
        count: usize,
    },

    /// archive size does not match the size it was loaded with
    #[error("archive size mismatched, expected {expected} ({expected:#X}) got {actual} ({actual:#X})")]
    #[diagnostic(help("the archive was modified after loading without updating its recorded size"))]
    SizeMismatch {
        /// The size recorded when the archive was loaded
        expected: u64,
        /// The size computed from the current contents
        actual: u64,
    },

    /// first table offset does not follow the table headers
    #[error("table offset mismatched, expected {expected:#010X} got {actual:#010X}")]
    OffsetMismatch {
        /// The position directly after the table header block
        expected: u64,
        /// The offset recorded on the first table
        actual: u64,
    },

    /// archive has no tables
    #[error("archive has no tables")]
    MissingTables,

    /// a text field cannot be stored in its fixed slot
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The header or table field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// destination path is empty
    #[error("invalid destination path {0:?}")]
    InvalidPath(PathBuf),

    /// every alternate name for an entry is already taken
    #[error("unable to find a free name for {id}.{extension}")]
    NameCollisionExhausted {
        /// Id of the skipped entry
        id: i32,
        /// Extension of the owning table
        extension: String,
    },
}

/// Error type to provide further information when the input is not a valid archive
#[derive(Error, Diagnostic, Debug, PartialEq)]
pub enum FormatError {
    /// buffer of {len} bytes is too small
    #[error("buffer of {len} bytes is too small, need more than {min}")]
    TooSmall {
        /// Length of the input
        len: usize,
        /// The fixed header size
        min: usize,
    },

    /// field lies outside the buffer
    #[error("{field} at offset {offset:#X} needs {len} bytes, only {available} available")]
    OutOfBounds {
        /// Name of the field being read or written
        field: &'static str,
        /// Absolute offset of the access
        offset: usize,
        /// Number of bytes requested
        len: usize,
        /// Number of bytes the buffer holds past `offset`
        available: usize,
    },

    /// field holds a negative count, offset or size
    #[error("{field} is negative ({value})")]
    NegativeValue {
        /// Name of the field
        field: &'static str,
        /// The decoded value
        value: i32,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
