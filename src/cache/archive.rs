//! Archive extraction
//!
//! Artifacts are gzip-compressed tarballs. Malformed bytes and disallowed
//! entries surface as `CorruptArchive`; failures writing to the local disk
//! surface as `Io`.

use crate::error::{ArtifactError, ArtifactResult};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io;
use std::path::{Component, Path};
use tar::EntryType;
use tracing::debug;

/// Unpack a `.tgz` archive into `dest`, preserving its internal structure.
///
/// Entries with absolute paths or `..` components are rejected, as are
/// device and FIFO entries. Pax headers carry no content and are skipped.
pub fn unpack(archive_path: &Path, dest: &Path) -> ArtifactResult<usize> {
    let corrupt = |reason: String| ArtifactError::corrupt(archive_path, reason);

    let file = File::open(archive_path).map_err(|e| {
        ArtifactError::io(format!("opening archive {}", archive_path.display()), e)
    })?;
    std::fs::create_dir_all(dest)
        .map_err(|e| ArtifactError::io(format!("creating {}", dest.display()), e))?;

    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut unpacked = 0;

    for entry in archive
        .entries()
        .map_err(|e| corrupt(format!("reading entries: {}", e)))?
    {
        let mut entry = entry.map_err(|e| corrupt(format!("reading entry: {}", e)))?;
        let entry_type = entry.header().entry_type();
        match entry_type {
            EntryType::XGlobalHeader | EntryType::XHeader => continue,
            EntryType::Char | EntryType::Block | EntryType::Fifo => {
                return Err(corrupt(format!(
                    "unsupported entry type {:?} for {}",
                    entry_type,
                    String::from_utf8_lossy(&entry.path_bytes())
                )))
            }
            _ => {}
        }

        let entry_path = entry
            .path()
            .map_err(|e| corrupt(format!("invalid entry path: {}", e)))?
            .into_owned();
        validate_entry_path(&entry_path).map_err(corrupt)?;

        let placed = entry.unpack_in(dest).map_err(|e| {
            let context = format!("extracting {}", entry_path.display());
            if is_local_failure(e.kind()) {
                ArtifactError::io(format!("{} into {}", context, dest.display()), e)
            } else {
                corrupt(format!("{}: {}", context, e))
            }
        })?;
        if !placed {
            return Err(corrupt(format!(
                "entry {} escapes the extraction directory",
                entry_path.display()
            )));
        }
        unpacked += 1;
    }

    debug!(
        "Unpacked {} entries from {} into {}",
        unpacked,
        archive_path.display(),
        dest.display()
    );
    Ok(unpacked)
}

/// Error kinds that point at the local disk rather than the archive bytes
fn is_local_failure(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::PermissionDenied
            | io::ErrorKind::StorageFull
            | io::ErrorKind::ReadOnlyFilesystem
    )
}

fn validate_entry_path(path: &Path) -> Result<(), String> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(format!("entry {} contains '..'", path.display()));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("entry {} is absolute", path.display()));
            }
        }
    }
    Ok(())
}
