//! Application state for the TUI.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::model::{
    format_size, kind_label, Column, DirectorySizer, Entry, SizeReport, SizeWorker,
    TreeDataSource,
};

use super::widgets::tree::IconStyle;

/// Shown in the size column while a directory is being summed.
pub const PENDING_SIZE: &str = "...";

/// The current UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal navigation mode.
    Normal,
    /// Editing the name filter.
    Filter,
    /// Help overlay mode.
    Help,
}

/// A visible row in the flattened tree view.
#[derive(Debug, Clone)]
pub struct Row {
    /// The filesystem entry.
    pub entry: Entry,
    /// Depth below the root (0 = direct child of the root).
    pub depth: usize,
    /// Whether this directory is expanded.
    pub is_expanded: bool,
}

/// Main application state for the TUI.
pub struct App {
    /// Where rows, sizes and the filter come from.
    pub source: Box<dyn TreeDataSource>,

    /// Background sizing; `None` sums directories inline during rebuilds.
    /// Also inline when the source offers no shareable sizer.
    worker: Option<SizeWorker>,

    /// Flattened visible rows (for rendering).
    pub rows: Vec<Row>,

    /// Currently selected index in rows.
    pub selected: usize,

    /// Set of expanded directory paths.
    pub expanded: HashSet<PathBuf>,

    /// Latest known directory sizes.
    pub sizes: HashMap<PathBuf, SizeReport>,

    /// Current UI mode.
    pub mode: Mode,

    /// Text typed into the filter box.
    pub filter_input: String,

    /// Column rows are ordered by (directories always come first).
    pub sort_column: Column,

    /// Reverse the column order.
    pub sort_descending: bool,

    pub icons: IconStyle,

    /// Spaces per tree level.
    pub indent: u16,

    /// Refresh period when watching the filesystem.
    pub watch: Option<Duration>,

    last_refresh: Instant,

    /// Application should quit.
    pub should_quit: bool,

    /// Status message to display.
    pub status_message: Option<String>,
}

impl App {
    /// Create an App that sums directories inline whenever rows are rebuilt.
    pub fn new(source: Box<dyn TreeDataSource>) -> Self {
        Self::build(source, None)
    }

    /// Create an App that sizes directories on `worker` and shows a
    /// placeholder until each result arrives.
    pub fn with_worker(source: Box<dyn TreeDataSource>, worker: SizeWorker) -> Self {
        let mut app = Self::build(source, Some(worker));
        app.request_sizes();
        app
    }

    fn build(source: Box<dyn TreeDataSource>, worker: Option<SizeWorker>) -> Self {
        let mut app = Self {
            source,
            worker,
            rows: Vec::new(),
            selected: 0,
            expanded: HashSet::new(),
            sizes: HashMap::new(),
            mode: Mode::Normal,
            filter_input: String::new(),
            sort_column: Column::Name,
            sort_descending: false,
            icons: IconStyle::Custom,
            indent: 2,
            watch: None,
            last_refresh: Instant::now(),
            should_quit: false,
            status_message: None,
        };
        app.filter_input = app.source.name_filter().to_string();
        if !app.source.root_is_valid() {
            app.status_message = Some(format!("Cannot open {}", app.source.root().display()));
        }
        app.rebuild_rows();
        app
    }

    pub fn with_icons(mut self, icons: IconStyle) -> Self {
        self.icons = icons;
        self
    }

    pub fn with_indent(mut self, indent: u16) -> Self {
        self.indent = indent.max(1);
        self
    }

    pub fn with_watch(mut self, interval: Option<Duration>) -> Self {
        self.watch = interval;
        self
    }

    pub fn with_sort(mut self, column: Column) -> Self {
        self.sort_column = column;
        self.rebuild_rows();
        self
    }

    pub fn root(&self) -> &Path {
        self.source.root()
    }

    /// Get the currently selected row, if any.
    pub fn selected_row(&self) -> Option<&Row> {
        self.rows.get(self.selected)
    }

    /// Total size of the root, if known.
    pub fn root_size(&self) -> Option<SizeReport> {
        self.sizes.get(self.source.root()).copied()
    }

    /// Text for the size column of `entry`.
    pub fn size_text(&self, entry: &Entry) -> String {
        if !entry.is_dir {
            return self.source.size_column_value(entry);
        }
        match self.sizes.get(&entry.path) {
            Some(report) => format_size(report.signed_bytes()),
            None => PENDING_SIZE.to_string(),
        }
    }

    /// Re-list every expanded level and re-sort.
    pub fn rebuild_rows(&mut self) {
        let selected_path = self.selected_row().map(|r| r.entry.path.clone());

        let root = self.source.root().to_path_buf();
        let mut rows = Vec::new();
        self.push_children(&root, 0, &mut rows);
        self.rows = rows;

        self.selected = selected_path
            .and_then(|path| self.rows.iter().position(|r| r.entry.path == path))
            .unwrap_or(self.selected)
            .min(self.rows.len().saturating_sub(1));

        if self.background_sizer().is_none() {
            self.compute_sizes_inline();
        }
    }

    fn background_sizer(&self) -> Option<Arc<dyn DirectorySizer>> {
        self.worker.as_ref().and_then(|_| self.source.sizer())
    }

    fn push_children(&self, dir: &Path, depth: usize, rows: &mut Vec<Row>) {
        let mut children = self.source.list_children(dir);
        sort_entries(&mut children, self.sort_column, self.sort_descending, &self.sizes);

        for entry in children {
            let is_expanded = entry.is_dir && self.expanded.contains(&entry.path);
            let path = entry.path.clone();
            rows.push(Row {
                entry,
                depth,
                is_expanded,
            });
            if is_expanded {
                self.push_children(&path, depth + 1, rows);
            }
        }
    }

    fn visible_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.source.root().to_path_buf()];
        dirs.extend(
            self.rows
                .iter()
                .filter(|r| r.entry.is_dir)
                .map(|r| r.entry.path.clone()),
        );
        dirs
    }

    fn compute_sizes_inline(&mut self) {
        for dir in self.visible_dirs() {
            let report = self.source.directory_size(&dir);
            self.sizes.insert(dir, report);
        }
    }

    fn request_sizes(&mut self) {
        let (Some(worker), Some(sizer)) = (&self.worker, self.background_sizer()) else {
            return;
        };
        for dir in self.visible_dirs() {
            worker.request(&dir, Arc::clone(&sizer));
        }
    }

    /// Fold finished background results into `sizes`.
    ///
    /// Returns true if anything changed.
    pub fn apply_size_results(&mut self) -> bool {
        let Some(worker) = &self.worker else {
            return false;
        };
        let results = worker.poll();
        if results.is_empty() {
            return false;
        }
        for result in results {
            self.sizes.insert(result.path, result.report);
        }
        if self.sort_column == Column::Size {
            self.rebuild_rows();
        }
        true
    }

    /// Background requests still running.
    pub fn pending_sizes(&self) -> usize {
        self.worker.as_ref().map(|w| w.pending()).unwrap_or(0)
    }

    /// Re-read the visible tree and recompute every visible size.
    pub fn refresh(&mut self) {
        tracing::debug!(root = %self.source.root().display(), "Refreshing");
        self.last_refresh = Instant::now();
        self.rebuild_rows();
        self.request_sizes();
    }

    /// Periodic work: pick up finished sizes and refresh when watching.
    pub fn tick(&mut self) {
        self.apply_size_results();
        if let Some(interval) = self.watch {
            if self.last_refresh.elapsed() >= interval {
                self.refresh();
            }
        }
    }

    /// Move selection by `delta` rows, clamped to the list.
    pub fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.rows.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    pub fn expand_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.entry.is_dir && !row.is_expanded {
            let path = row.entry.path.clone();
            self.expanded.insert(path);
            self.rebuild_rows();
            self.request_sizes();
        }
    }

    /// Collapse the selected directory, or jump to its parent row.
    pub fn collapse_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };

        if row.is_expanded {
            let path = row.entry.path.clone();
            self.expanded.retain(|p| !p.starts_with(&path));
            self.rebuild_rows();
            return;
        }

        if row.depth == 0 {
            return;
        }
        if let Some(parent) = row.entry.path.parent() {
            if let Some(idx) = self.rows.iter().position(|r| r.entry.path == parent) {
                self.selected = idx;
            }
        }
    }

    pub fn toggle_selected(&mut self) {
        match self.selected_row() {
            Some(row) if row.is_expanded => self.collapse_selected(),
            Some(_) => self.expand_selected(),
            None => {}
        }
    }

    /// Make the selected directory the new root.
    pub fn enter_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.entry.is_dir {
            let path = row.entry.path.clone();
            self.set_root(&path);
        }
    }

    /// Make the root's parent the new root.
    pub fn go_up(&mut self) {
        let current = self.source.root().to_path_buf();
        if let Some(parent) = current.parent() {
            self.set_root(parent);
            if let Some(idx) = self.rows.iter().position(|r| r.entry.path == current) {
                self.selected = idx;
            }
        }
    }

    /// Switch the root. An unusable path leaves the previous root in place.
    pub fn set_root(&mut self, path: &Path) -> bool {
        let previous = self.source.root().to_path_buf();
        self.source.set_root(path);

        if !self.source.root_is_valid() {
            tracing::warn!(path = %path.display(), "Cannot open directory, keeping previous root");
            self.source.set_root(&previous);
            self.status_message = Some(format!("Cannot open {}", path.display()));
            return false;
        }

        if let Some(worker) = &self.worker {
            worker.cancel_all();
        }
        self.expanded.clear();
        self.sizes.clear();
        self.selected = 0;
        self.status_message = None;
        self.rows.clear();
        self.refresh();
        true
    }

    /// Push the filter box text to the data source.
    pub fn apply_filter(&mut self) {
        self.source.set_name_filter(&self.filter_input);
        self.rebuild_rows();
        self.request_sizes();
    }

    pub fn cycle_sort_column(&mut self) {
        self.sort_column = self.sort_column.next();
        self.status_message = Some(format!("Sorted by {}", self.sort_column.title()));
        self.rebuild_rows();
    }

    pub fn reverse_sort(&mut self) {
        self.sort_descending = !self.sort_descending;
        self.rebuild_rows();
    }

    /// Filesystem usage for the root: (total, used, available) bytes.
    pub fn get_disk_usage(&self) -> Option<(u64, u64, u64)> {
        let stat = nix::sys::statvfs::statvfs(self.source.root()).ok()?;
        let block_size = stat.fragment_size() as u64;
        let total = stat.blocks() as u64 * block_size;
        let free = stat.blocks_free() as u64 * block_size;
        let available = stat.blocks_available() as u64 * block_size;
        Some((total, total.saturating_sub(free), available))
    }
}

/// Order entries for display: directories first, then by `column`, with the
/// name as tie-breaker. `descending` flips the column order only.
pub fn sort_entries(
    entries: &mut [Entry],
    column: Column,
    descending: bool,
    sizes: &HashMap<PathBuf, SizeReport>,
) {
    let size_of = |e: &Entry| {
        if e.is_dir {
            sizes.get(&e.path).map(|r| r.bytes).unwrap_or(0)
        } else {
            e.direct_size
        }
    };

    entries.sort_by(|a, b| {
        let by_column = match column {
            Column::Name => Ordering::Equal,
            Column::Size => size_of(a).cmp(&size_of(b)),
            Column::Kind => kind_label(a).cmp(&kind_label(b)),
            Column::Modified => a.modified.cmp(&b.modified),
        }
        .then_with(|| a.name.cmp(&b.name));
        let by_column = if descending {
            by_column.reverse()
        } else {
            by_column
        };

        b.is_dir.cmp(&a.is_dir).then(by_column)
    });
}
