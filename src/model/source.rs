//! Filterable hierarchical data source over a filesystem root.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};

use super::cache::SizeCache;
use super::entry::Entry;
use super::size::{format_bytes, format_size};
use super::walker::{directory_size_until, read_entries, SizeReport};

/// Columns a tree view can ask the data source for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Column {
    #[default]
    Name,
    Size,
    Kind,
    Modified,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Name, Column::Size, Column::Kind, Column::Modified];

    pub fn title(self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Size => "Size",
            Column::Kind => "Type",
            Column::Modified => "Date Modified",
        }
    }

    /// Next column in display order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Column::Name => Column::Size,
            Column::Size => Column::Kind,
            Column::Kind => Column::Modified,
            Column::Modified => Column::Name,
        }
    }

    /// Parse a config/CLI name (`name`, `size`, `type`/`kind`, `modified`/`mtime`).
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(Column::Name),
            "size" => Some(Column::Size),
            "type" | "kind" => Some(Column::Kind),
            "modified" | "mtime" | "date" => Some(Column::Modified),
            _ => None,
        }
    }
}

/// The mutable state of a data source: where the tree starts and which names
/// are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceState {
    pub root: PathBuf,
    pub filter: String,
}

/// Recursive sizing that can run away from the view's thread.
pub trait DirectorySizer: Send + Sync {
    /// Size of everything below `path`, or `None` once `cancelled` reports
    /// true.
    fn size_until(&self, path: &Path, cancelled: &dyn Fn() -> bool) -> Option<SizeReport>;
}

/// What a hierarchical view needs from its model.
///
/// Queries never fail. Paths that can't be read produce empty listings and
/// zero sizes.
pub trait TreeDataSource {
    /// Make `path` the top of the tree. An unusable path yields an empty tree.
    fn set_root(&mut self, path: &Path);

    fn root(&self) -> &Path;

    /// Whether the current root resolves to a readable directory.
    fn root_is_valid(&self) -> bool;

    /// Replace the substring that entry names must contain. Empty shows all.
    fn set_name_filter(&mut self, pattern: &str);

    fn name_filter(&self) -> &str;

    /// Immediate children of `path` that pass the name filter, in no
    /// particular order.
    fn list_children(&self, path: &Path) -> Vec<Entry>;

    /// Recursive size of everything below `path`.
    fn directory_size(&self, path: &Path) -> SizeReport;

    /// Shareable sizing handle for background workers. Sources without one
    /// are sized through [`TreeDataSource::directory_size`] on the caller's
    /// thread.
    fn sizer(&self) -> Option<Arc<dyn DirectorySizer>> {
        None
    }

    fn size_column_value(&self, entry: &Entry) -> String {
        if entry.is_dir {
            format_size(self.directory_size(&entry.path).signed_bytes())
        } else {
            format_bytes(entry.direct_size)
        }
    }

    fn column_value(&self, entry: &Entry, column: Column) -> String {
        match column {
            Column::Name => entry.name.clone(),
            Column::Size => self.size_column_value(entry),
            Column::Kind => kind_label(entry),
            Column::Modified => format_modified(entry.modified),
        }
    }
}

/// Case-sensitive substring match; an empty pattern matches everything.
pub fn matches_filter(name: &str, pattern: &str) -> bool {
    pattern.is_empty() || name.contains(pattern)
}

/// Human label for the Type column.
pub fn kind_label(entry: &Entry) -> String {
    if entry.is_dir {
        "Folder".to_string()
    } else if entry.is_symlink {
        "Symlink".to_string()
    } else {
        match entry.extension() {
            Some(ext) if !ext.is_empty() => format!("{} File", ext),
            _ => "File".to_string(),
        }
    }
}

/// Local `YYYY-MM-DD HH:MM`, or empty when the time is unknown.
pub fn format_modified(modified: Option<SystemTime>) -> String {
    modified
        .map(|time| {
            DateTime::<Local>::from(time)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_default()
}

/// Filesystem sizing with an optional TTL cache in front of the walk.
#[derive(Debug, Default)]
pub struct FsSizer {
    cache: SizeCache,
}

impl FsSizer {
    pub fn new(cache: SizeCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SizeCache {
        &self.cache
    }
}

impl DirectorySizer for FsSizer {
    fn size_until(&self, path: &Path, cancelled: &dyn Fn() -> bool) -> Option<SizeReport> {
        if let Some(report) = self.cache.get(path) {
            return Some(report);
        }

        let report = directory_size_until(path, cancelled)?;
        if report.skipped > 0 {
            tracing::debug!(
                path = %path.display(),
                skipped = report.skipped,
                "Some nodes were inaccessible while sizing"
            );
        }
        self.cache.insert(path, report);
        Some(report)
    }
}

/// [`TreeDataSource`] backed by the local filesystem.
#[derive(Debug)]
pub struct FsDataSource {
    state: SourceState,
    sizer: Arc<FsSizer>,
}

impl FsDataSource {
    /// Create a source rooted at `root` that recomputes sizes on every request.
    pub fn new(root: &Path) -> Self {
        let mut source = Self {
            state: SourceState::default(),
            sizer: Arc::new(FsSizer::default()),
        };
        source.set_root(root);
        source
    }

    /// Remember directory sizes for `ttl`. A zero TTL keeps caching off.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.sizer = Arc::new(FsSizer::new(SizeCache::new(ttl)));
        self
    }

    pub fn state(&self) -> &SourceState {
        &self.state
    }

    pub fn cache(&self) -> &SizeCache {
        self.sizer.cache()
    }
}

impl TreeDataSource for FsDataSource {
    fn set_root(&mut self, path: &Path) {
        let root = path.canonicalize().unwrap_or_else(|err| {
            tracing::debug!(path = %path.display(), %err, "Root does not resolve");
            path.to_path_buf()
        });
        tracing::debug!(root = %root.display(), "Setting root");
        self.state.root = root;
        self.sizer.cache().clear();
    }

    fn root(&self) -> &Path {
        &self.state.root
    }

    fn root_is_valid(&self) -> bool {
        fs::metadata(&self.state.root)
            .map(|m| m.is_dir())
            .unwrap_or(false)
            && fs::read_dir(&self.state.root).is_ok()
    }

    fn set_name_filter(&mut self, pattern: &str) {
        tracing::trace!(pattern, "Name filter changed");
        self.state.filter = pattern.to_string();
    }

    fn name_filter(&self) -> &str {
        &self.state.filter
    }

    fn list_children(&self, path: &Path) -> Vec<Entry> {
        let entries = match read_entries(path) {
            Ok((entries, _)) => entries,
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "Cannot list children");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter(|e| matches_filter(&e.name, &self.state.filter))
            .collect()
    }

    fn directory_size(&self, path: &Path) -> SizeReport {
        self.sizer.size_until(path, &|| false).unwrap_or_default()
    }

    fn sizer(&self) -> Option<Arc<dyn DirectorySizer>> {
        let sizer: Arc<dyn DirectorySizer> = self.sizer.clone();
        Some(sizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn names(entries: &[Entry]) -> BTreeSet<String> {
        entries.iter().map(|e| e.name.clone()).collect()
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("Report.txt"), vec![0u8; 2048]).unwrap();
        fs::write(root.join("report-old.txt"), vec![0u8; 10]).unwrap();
        fs::write(root.join(".profile"), b"x").unwrap();
        fs::create_dir(root.join("reports")).unwrap();
        fs::write(root.join("reports/q1.csv"), vec![0u8; 1024]).unwrap();
        dir
    }

    #[test]
    fn test_list_children_unfiltered_includes_hidden() {
        let dir = fixture();
        let source = FsDataSource::new(dir.path());
        let children = source.list_children(source.root());

        let expected: BTreeSet<String> = ["Report.txt", "report-old.txt", ".profile", "reports"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names(&children), expected);
        assert!(!children.iter().any(|e| e.name == "." || e.name == ".."));
    }

    #[test]
    fn test_filter_is_case_sensitive_substring() {
        let dir = fixture();
        let mut source = FsDataSource::new(dir.path());

        source.set_name_filter("report");
        let expected: BTreeSet<String> = ["report-old.txt", "reports"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names(&source.list_children(dir.path())), expected);

        source.set_name_filter("Report");
        assert_eq!(
            names(&source.list_children(dir.path())),
            BTreeSet::from(["Report.txt".to_string()])
        );
    }

    #[test]
    fn test_empty_filter_restores_full_listing() {
        let dir = fixture();
        let mut source = FsDataSource::new(dir.path());
        source.set_name_filter("zzz");
        assert!(source.list_children(dir.path()).is_empty());

        source.set_name_filter("");
        assert_eq!(source.list_children(dir.path()).len(), 4);
    }

    #[test]
    fn test_size_column_value() {
        let dir = fixture();
        let source = FsDataSource::new(dir.path());
        let children = source.list_children(source.root());

        let file = children.iter().find(|e| e.name == "Report.txt").unwrap();
        assert_eq!(source.size_column_value(file), "2.00 KB");

        let sub = children.iter().find(|e| e.name == "reports").unwrap();
        assert_eq!(source.column_value(sub, Column::Size), "1.00 KB");

        let hidden = children.iter().find(|e| e.name == ".profile").unwrap();
        assert_eq!(source.column_value(hidden, Column::Size), "1 bytes");
    }

    #[test]
    fn test_root_size_ignores_filter() {
        let dir = fixture();
        let mut source = FsDataSource::new(dir.path());
        source.set_name_filter("nothing-matches");
        assert_eq!(source.directory_size(dir.path()).bytes, 2048 + 10 + 1 + 1024);
    }

    #[test]
    fn test_invalid_root_gives_empty_tree() {
        let source = FsDataSource::new(Path::new("/nonexistent/path/12345"));
        assert!(!source.root_is_valid());
        assert!(source.list_children(source.root()).is_empty());
    }

    #[test]
    fn test_file_root_is_invalid() {
        let dir = fixture();
        let source = FsDataSource::new(&dir.path().join("Report.txt"));
        assert!(!source.root_is_valid());
        assert!(source.list_children(source.root()).is_empty());
    }

    #[test]
    fn test_set_root_canonicalizes() {
        let dir = fixture();
        let mut source = FsDataSource::new(dir.path());
        source.set_root(&dir.path().join("reports/.."));
        assert_eq!(source.root(), dir.path().canonicalize().unwrap());
        assert!(source.root_is_valid());
    }

    #[test]
    fn test_uncached_source_sees_changes() {
        let dir = fixture();
        let source = FsDataSource::new(dir.path());
        let before = source.directory_size(&dir.path().join("reports")).bytes;
        fs::write(dir.path().join("reports/q2.csv"), vec![0u8; 100]).unwrap();
        let after = source.directory_size(&dir.path().join("reports")).bytes;
        assert_eq!(after, before + 100);
    }

    #[test]
    fn test_cached_source_is_stale_within_ttl() {
        let dir = fixture();
        let source = FsDataSource::new(dir.path()).with_cache_ttl(Duration::from_secs(600));
        let reports = dir.path().join("reports").canonicalize().unwrap();

        let before = source.directory_size(&reports).bytes;
        fs::write(reports.join("q2.csv"), vec![0u8; 100]).unwrap();
        assert_eq!(source.directory_size(&reports).bytes, before);
    }

    #[test]
    fn test_set_root_clears_cache() {
        let dir = fixture();
        let mut source =
            FsDataSource::new(dir.path()).with_cache_ttl(Duration::from_secs(600));
        source.directory_size(dir.path());
        assert_eq!(source.cache().len(), 1);
        source.set_root(dir.path());
        assert!(source.cache().is_empty());
    }

    #[test]
    fn test_shared_sizer_uses_source_cache() {
        let dir = fixture();
        let source = FsDataSource::new(dir.path()).with_cache_ttl(Duration::from_secs(600));
        let reports = dir.path().join("reports").canonicalize().unwrap();
        let sizer = source.sizer().unwrap();

        let first = sizer.size_until(&reports, &|| false).unwrap();
        assert_eq!(first.bytes, 1024);
        assert_eq!(source.cache().len(), 1);

        fs::write(reports.join("q2.csv"), vec![0u8; 100]).unwrap();
        assert_eq!(source.directory_size(&reports).bytes, 1024);
        assert!(sizer.size_until(&reports, &|| true).is_some());
    }

    #[test]
    fn test_cancelled_sizer_caches_nothing() {
        let dir = fixture();
        let source = FsDataSource::new(dir.path()).with_cache_ttl(Duration::from_secs(600));
        let sizer = source.sizer().unwrap();

        assert!(sizer.size_until(dir.path(), &|| true).is_none());
        assert!(source.cache().is_empty());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(kind_label(&Entry::new_dir(PathBuf::from("/a"))), "Folder");
        assert_eq!(kind_label(&Entry::new_file(PathBuf::from("/a.TXT"), 1)), "txt File");
        assert_eq!(kind_label(&Entry::new_file(PathBuf::from("/Makefile"), 1)), "File");
    }

    #[test]
    fn test_format_modified_unknown() {
        assert_eq!(format_modified(None), "");
        let text = format_modified(Some(SystemTime::now()));
        assert_eq!(text.len(), "2024-01-01 00:00".len());
    }

    #[test]
    fn test_column_cycle_and_parse() {
        let mut column = Column::Name;
        for _ in 0..Column::ALL.len() {
            column = column.next();
        }
        assert_eq!(column, Column::Name);
        assert_eq!(Column::from_name("SIZE"), Some(Column::Size));
        assert_eq!(Column::from_name("mtime"), Some(Column::Modified));
        assert_eq!(Column::from_name("bogus"), None);
    }
}
