use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use super::entry::Entry;

/// Result of summing a directory subtree at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SizeReport {
    /// Sum of regular-file sizes below the directory
    pub bytes: u64,

    /// Number of regular files counted
    pub files: u64,

    /// Number of subdirectories visited (recursive)
    pub dirs: u64,

    /// Nodes that could not be stat'ed or listed; they contributed nothing
    pub skipped: u64,
}

impl SizeReport {
    /// Bytes as the signed count the formatter expects.
    pub fn signed_bytes(&self) -> i64 {
        i64::try_from(self.bytes).unwrap_or(i64::MAX)
    }
}

/// Read the immediate children of `path`.
///
/// Hidden entries are included. `read_dir` never yields `.` or `..`.
/// Children whose metadata can't be read are dropped and counted in the
/// second tuple field; failing to open `path` itself is an error.
pub fn read_entries(path: &Path) -> io::Result<(Vec<Entry>, u64)> {
    let mut entries = Vec::new();
    let mut skipped = 0;

    for dir_entry in fs::read_dir(path)? {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "Skipping unreadable entry");
                skipped += 1;
                continue;
            }
        };

        let child_path = dir_entry.path();
        match fs::symlink_metadata(&child_path) {
            Ok(metadata) => entries.push(Entry::from_metadata(child_path, &metadata)),
            Err(err) => {
                tracing::debug!(path = %child_path.display(), %err, "Skipping entry without metadata");
                skipped += 1;
            }
        }
    }

    Ok((entries, skipped))
}

/// Sum the sizes of all regular files below `path`.
///
/// Never fails: unreadable directories and vanished entries count as zero
/// and are reported through [`SizeReport::skipped`].
pub fn directory_size(path: &Path) -> SizeReport {
    directory_size_until(path, || false).unwrap_or_default()
}

/// Like [`directory_size`], but checks `cancelled` before each directory and
/// returns `None` as soon as it reports true.
///
/// The walk uses an explicit stack so arbitrarily deep trees don't grow the
/// call stack. Symlinks are never followed.
pub fn directory_size_until<F>(path: &Path, cancelled: F) -> Option<SizeReport>
where
    F: Fn() -> bool,
{
    sum_tree(path, read_entries, cancelled)
}

fn sum_tree<L, F>(path: &Path, list: L, cancelled: F) -> Option<SizeReport>
where
    L: Fn(&Path) -> io::Result<(Vec<Entry>, u64)>,
    F: Fn() -> bool,
{
    let mut report = SizeReport::default();
    let mut pending = vec![path.to_path_buf()];

    while let Some(dir) = pending.pop() {
        if cancelled() {
            return None;
        }

        let (entries, skipped) = match list(&dir) {
            Ok(listing) => listing,
            Err(err) => {
                tracing::debug!(path = %dir.display(), %err, "Cannot list directory, counting as empty");
                report.skipped += 1;
                continue;
            }
        };
        report.skipped += skipped;

        for entry in entries {
            if entry.is_dir {
                report.dirs += 1;
                pending.push(entry.path);
            } else if entry.is_file {
                report.files += 1;
                report.bytes = report.bytes.saturating_add(entry.direct_size);
            }
        }
    }

    Some(report)
}
