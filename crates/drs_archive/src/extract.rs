//! Writing archive contents out to a directory

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use bon::Builder;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::types::{Archive, FileEntry, Table};

/// Alternate names tried for an entry whose plain name is taken
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Options for how an archive should be extracted
#[derive(Debug, Clone, Copy, Builder)]
pub struct ExtractOptions {
    /// How many `{id}_{attempt:03}.{ext}` names to try before skipping an entry
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Outcome of an extraction
///
/// Extraction only fails as a whole when the destination directory cannot be
/// prepared. Problems with individual entries are collected here.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Every file that was written
    pub written: Vec<PathBuf>,

    /// Entries written under an alternate name, as `(wanted, used)`
    pub renamed: Vec<(PathBuf, PathBuf)>,

    /// Entries skipped because no free name was found
    pub skipped: Vec<Error>,

    /// Entries whose file could not be written
    pub failed: Vec<Error>,
}

impl ExtractReport {
    /// Whether every entry was written
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Strip one trailing separator, rejecting names that end up empty
///
/// Drive roots such as `C:\` are kept whole, `C:` names a different directory.
fn normalize(directory: &Path) -> Result<PathBuf> {
    let drive_root = directory.parent().is_none()
        && matches!(directory.components().next(), Some(Component::Prefix(_)));

    let bytes = directory.as_os_str().as_encoded_bytes();
    let trimmed = match bytes.split_last() {
        Some((&last, rest)) if !drive_root && std::path::is_separator(char::from(last)) => {
            // SAFETY: separators are ascii, so `rest` ends on a valid boundary
            PathBuf::from(unsafe { OsStr::from_encoded_bytes_unchecked(rest) })
        }
        _ => directory.to_path_buf(),
    };

    if trimmed.as_os_str().is_empty() {
        return Err(Error::InvalidPath(directory.to_path_buf()));
    }
    Ok(trimmed)
}

enum Created {
    Plain(PathBuf, File),
    Renamed(PathBuf, PathBuf, File),
}

fn create_unique(
    directory: &Path,
    table: &Table,
    file: &FileEntry,
    max_attempts: u32,
) -> Result<Created> {
    let extension = table.extension.as_str();
    let open = |path: &Path| File::options().write(true).create_new(true).open(path);
    let io_error = |path: &Path, source| Error::Io {
        action: "creating",
        path: path.to_path_buf(),
        source,
    };

    let wanted = directory.join(format!("{}.{}", file.id, extension));
    match open(&wanted) {
        Ok(out) => return Ok(Created::Plain(wanted, out)),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
        Err(err) => return Err(io_error(&wanted, err)),
    }

    for attempt in 0..max_attempts {
        let candidate = directory.join(format!("{}_{:03}.{}", file.id, attempt, extension));
        match open(&candidate) {
            Ok(out) => return Ok(Created::Renamed(wanted, candidate, out)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(io_error(&candidate, err)),
        }
    }

    Err(Error::NameCollisionExhausted {
        id: file.id,
        extension: extension.into_owned(),
    })
}

/// Write every entry of `archive` to `directory` as `{id}.{extension}`
///
/// The directory is created when missing. Existing files are never
/// overwritten, an entry whose name is taken is written as
/// `{id}_{attempt:03}.{extension}` instead.
///
/// ```no_run
/// # fn doit() -> drs_archive::error::Result<()>
/// # {
/// use drs_archive::{extract::{extract_all, ExtractOptions}, Archive};
///
/// let drs = Archive::open("interfac.drs")?;
/// let report = extract_all(&drs, "interfac/", ExtractOptions::default())?;
/// assert!(report.is_complete());
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(directory = %directory.as_ref().display()), err)]
pub fn extract_all(
    archive: &Archive,
    directory: impl AsRef<Path>,
    options: ExtractOptions,
) -> Result<ExtractReport> {
    let directory = normalize(directory.as_ref())?;

    if !directory.is_dir() {
        debug!("creating {}", directory.display());
        std::fs::create_dir_all(&directory).map_err(|source| Error::Io {
            action: "creating directory",
            path: directory.clone(),
            source,
        })?;
    }

    let mut report = ExtractReport::default();
    for (table, file) in archive.entries() {
        let (path, mut out) = match create_unique(&directory, table, file, options.max_attempts) {
            Ok(Created::Plain(path, out)) => (path, out),
            Ok(Created::Renamed(wanted, used, out)) => {
                warn!("{} is in use, writing {} instead", wanted.display(), used.display());
                report.renamed.push((wanted, used.clone()));
                (used, out)
            }
            Err(err @ Error::NameCollisionExhausted { .. }) => {
                warn!("{err}, skipping");
                report.skipped.push(err);
                continue;
            }
            Err(err) => {
                warn!("{err}");
                report.failed.push(err);
                continue;
            }
        };

        info!("writing {}", path.display());
        match out.write_all(&file.data).and_then(|_| out.flush()) {
            Ok(()) => report.written.push(path),
            Err(source) => {
                let err = Error::Io {
                    action: "writing",
                    path,
                    source,
                };
                warn!("{err}");
                report.failed.push(err);
            }
        }
    }

    Ok(report)
}

impl Archive {
    /// Extract every entry with the default [`ExtractOptions`]
    pub fn extract_all(&self, directory: impl AsRef<Path>) -> Result<ExtractReport> {
        extract_all(self, directory, ExtractOptions::default())
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;

    use super::normalize;
    use crate::error::Error;

    #[test]
    fn normalize_strips_one_separator() {
        assert_eq!(normalize(Path::new("out/")).unwrap(), PathBuf::from("out"));
        assert_eq!(normalize(Path::new("out//")).unwrap(), PathBuf::from("out/"));
        assert_eq!(normalize(Path::new("a/b")).unwrap(), PathBuf::from("a/b"));
    }

    #[cfg(unix)]
    #[test]
    fn normalize_strips_separator_from_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let directory = Path::new(OsStr::from_bytes(b"out\xFF/"));
        assert_eq!(
            normalize(directory).unwrap(),
            PathBuf::from(OsStr::from_bytes(b"out\xFF"))
        );
    }

    #[cfg(windows)]
    #[test]
    fn normalize_keeps_drive_roots() {
        assert_eq!(normalize(Path::new("C:\\")).unwrap(), PathBuf::from("C:\\"));
        assert_eq!(normalize(Path::new("C:\\out\\")).unwrap(), PathBuf::from("C:\\out"));
    }

    #[test]
    fn normalize_rejects_empty_names() {
        assert!(matches!(normalize(Path::new("")), Err(Error::InvalidPath(_))));
        assert!(matches!(normalize(Path::new("/")), Err(Error::InvalidPath(_))));
    }
}
