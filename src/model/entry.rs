use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use super::size::apparent_size;

/// One filesystem node exposed by the data source.
///
/// Entries are derived from a `symlink_metadata` call at query time and are
/// never cached; a later query may see a different size or type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Full path to the file or directory
    pub path: PathBuf,

    /// Entry name (last component of path)
    pub name: String,

    /// True if this is a directory (symlinks to directories are not)
    pub is_dir: bool,

    /// True if this is a symbolic link
    pub is_symlink: bool,

    /// True for regular files; fifos, sockets and devices are neither files
    /// nor directories
    pub is_file: bool,

    /// Byte length for regular files, 0 otherwise
    pub direct_size: u64,

    /// Last modification time
    #[serde(skip)]
    pub modified: Option<SystemTime>,
}

impl Entry {
    /// Build an entry from already-fetched (non-following) metadata.
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let direct_size = if file_type.is_file() {
            apparent_size(metadata)
        } else {
            0
        };

        Self {
            name: entry_name(&path),
            is_dir: file_type.is_dir(),
            is_symlink: file_type.is_symlink(),
            is_file: file_type.is_file(),
            direct_size,
            modified: metadata.modified().ok(),
            path,
        }
    }

    /// Stat `path` without following symlinks.
    pub fn stat(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::symlink_metadata(path)?;
        Ok(Self::from_metadata(path.to_path_buf(), &metadata))
    }

    /// Create a directory entry without touching the filesystem.
    pub fn new_dir(path: PathBuf) -> Self {
        Self {
            name: entry_name(&path),
            is_dir: true,
            is_symlink: false,
            is_file: false,
            direct_size: 0,
            modified: None,
            path,
        }
    }

    /// Create a file entry without touching the filesystem.
    pub fn new_file(path: PathBuf, size: u64) -> Self {
        Self {
            name: entry_name(&path),
            is_dir: false,
            is_symlink: false,
            is_file: true,
            direct_size: size,
            modified: None,
            path,
        }
    }

    /// Lowercased extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
