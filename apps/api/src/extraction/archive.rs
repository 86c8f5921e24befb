//! Archive expansion: unpacks a ZIP upload into a private scratch directory
//! and lists the resume documents inside it.
//!
//! Only document members are written out. A member that cannot be unpacked is
//! reported on its own and never fails the rest of the archive.
//! The scratch directory lives exactly as long as the returned `ExpandedArchive`.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::reader::DocumentKind;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// A document found inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Final path component of the entry, used as the record's `file_name`.
    pub name: String,
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// A document entry that could not be unpacked (corrupt, encrypted, oversized).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedMember {
    pub name: String,
    pub detail: String,
}

/// Extracted archive contents. Dropping it removes the scratch directory.
#[derive(Debug)]
pub struct ExpandedArchive {
    scratch: TempDir,
    members: Vec<ArchiveMember>,
    rejected: Vec<RejectedMember>,
}

impl ExpandedArchive {
    pub fn members(&self) -> &[ArchiveMember] {
        &self.members
    }

    pub fn rejected(&self) -> &[RejectedMember] {
        &self.rejected
    }

    #[cfg(test)]
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }
}

/// Extracts the PDF/DOCX entries of `archive_bytes` into a fresh scratch
/// directory under `scratch_root` and returns them in archive order.
///
/// Members larger than `max_member_bytes` once decompressed are rejected.
/// Only an unreadable central directory fails the whole archive.
pub fn expand_archive(
    archive_bytes: &[u8],
    scratch_root: &Path,
    max_member_bytes: u64,
) -> Result<ExpandedArchive, ArchiveError> {
    let mut archive = zip::ZipArchive::new(io::Cursor::new(archive_bytes))?;
    let scratch = tempfile::Builder::new()
        .prefix("resumelens-")
        .tempdir_in(scratch_root)?;
    let mut members = Vec::new();
    let mut rejected = Vec::new();

    for i in 0..archive.len() {
        let raw_name = archive.name_for_index(i).unwrap_or_default().to_string();
        let Some((name, kind)) = document_entry(Path::new(&raw_name)) else {
            debug!("Ignoring archive entry '{raw_name}'");
            continue;
        };

        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot open archive member '{raw_name}': {e}");
                rejected.push(RejectedMember {
                    name,
                    detail: e.to_string(),
                });
                continue;
            }
        };

        // Sanitize path (avoid ../)
        let Some(relative) = entry.enclosed_name() else {
            debug!("Skipping unsafe archive entry '{raw_name}'");
            continue;
        };
        if entry.is_dir() {
            continue;
        }
        if entry.size() > max_member_bytes {
            rejected.push(RejectedMember {
                name,
                detail: oversized(entry.size(), max_member_bytes),
            });
            continue;
        }

        let outpath = scratch.path().join(&relative);
        match write_member(&mut entry, &outpath, max_member_bytes) {
            Ok(()) => members.push(ArchiveMember {
                name,
                path: outpath,
                kind,
            }),
            Err(detail) => {
                warn!("Cannot unpack archive member '{raw_name}': {detail}");
                let _ = fs::remove_file(&outpath);
                rejected.push(RejectedMember { name, detail });
            }
        }
    }

    debug!(
        "Expanded archive into {:?}: {} document member(s), {} rejected",
        scratch.path(),
        members.len(),
        rejected.len()
    );

    Ok(ExpandedArchive {
        scratch,
        members,
        rejected,
    })
}

/// Name and kind of an entry worth unpacking, or `None` for everything else.
fn document_entry(path: &Path) -> Option<(String, DocumentKind)> {
    if is_resource_fork(path) {
        return None;
    }
    let name = path.file_name()?.to_str()?;
    let kind = DocumentKind::from_file_name(name)?;
    Some((name.to_string(), kind))
}

/// Copies at most `limit` bytes of a member to `outpath`; the CRC is checked at EOF.
fn write_member(entry: &mut impl Read, outpath: &Path, limit: u64) -> Result<(), String> {
    if let Some(parent) = outpath.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let mut outfile = fs::File::create(outpath).map_err(|e| e.to_string())?;
    let written = io::copy(&mut entry.take(limit + 1), &mut outfile).map_err(|e| e.to_string())?;
    if written > limit {
        return Err(oversized(written, limit));
    }
    Ok(())
}

fn oversized(size: u64, limit: u64) -> String {
    format!("member expands to more than {limit} bytes ({size})")
}

/// macOS archive metadata: `__MACOSX/...` and AppleDouble `._name` files.
fn is_resource_fork(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "__MACOSX")
        || path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("._"))
}
