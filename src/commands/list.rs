//! One-shot listing of a directory's children with their sizes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::cli::Cli;
use crate::error::{BrowserError, Result};
use crate::model::{format_size, Column, FsDataSource, SizeReport, TreeDataSource};

/// A listing is a single snapshot, so each directory is walked at most once
/// per run whatever `[browser] size_cache_ttl_secs` says.
const SNAPSHOT_TTL: Duration = Duration::MAX;

/// Everything printed by `--list`.
#[derive(Debug, Serialize)]
pub struct Listing {
    pub root: PathBuf,
    pub filter: String,
    pub total: SizeReport,
    pub total_size: String,
    pub entries: Vec<ListedEntry>,
}

#[derive(Debug, Serialize)]
pub struct ListedEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub bytes: u64,
    pub size: String,
    pub kind: String,
    pub modified: String,
}

/// Run list mode
pub fn run(cli: &Cli) -> Result<()> {
    let root = cli.root()?;
    let mut source = FsDataSource::new(&root).with_cache_ttl(SNAPSHOT_TTL);
    if !source.root_is_valid() {
        return Err(BrowserError::InvalidRoot(root));
    }
    source.set_name_filter(&cli.filter);

    tracing::info!(root = %source.root().display(), filter = %cli.filter, "Listing directory");

    let progress = if cli.quiet {
        ProgressBar::hidden()
    } else {
        spinner()
    };
    let listing = build_listing(&source, &progress);
    progress.finish_and_clear();

    let output = if cli.json {
        serde_json::to_string_pretty(&listing)?
    } else {
        format_listing(&listing)
    };
    println!("{}", output);

    Ok(())
}

fn spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} Sizing {msg}") {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Collect the filtered children of the source's root, directories first and
/// then by name, sizing each directory as it goes.
///
/// Cell text comes from the source; a source without a size cache walks each
/// directory twice, once for the byte count and once for the size cell.
pub fn build_listing(source: &dyn TreeDataSource, progress: &ProgressBar) -> Listing {
    let root = source.root().to_path_buf();
    let mut children = source.list_children(&root);
    children.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    let entries = children
        .iter()
        .map(|entry| {
            progress.set_message(entry.name.clone());
            let bytes = if entry.is_dir {
                source.directory_size(&entry.path).bytes
            } else {
                entry.direct_size
            };
            ListedEntry {
                name: entry.name.clone(),
                path: entry.path.clone(),
                is_dir: entry.is_dir,
                bytes,
                size: source.size_column_value(entry),
                kind: source.column_value(entry, Column::Kind),
                modified: source.column_value(entry, Column::Modified),
            }
        })
        .collect();

    progress.set_message(root.display().to_string());
    let total = source.directory_size(&root);

    Listing {
        total_size: format_size(total.signed_bytes()),
        filter: source.name_filter().to_string(),
        root,
        total,
        entries,
    }
}

/// Plain-text table of a listing.
pub fn format_listing(listing: &Listing) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", display_root(&listing.root)));
    for entry in &listing.entries {
        let name = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        output.push_str(&format!(
            "{:>12}  {:<12}  {:<16}  {}\n",
            entry.size, entry.kind, entry.modified, name
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "Total: {} in {} files, {} directories",
        listing.total_size, listing.total.files, listing.total.dirs
    ));
    if listing.total.skipped > 0 {
        output.push_str(&format!(" ({} inaccessible)", listing.total.skipped));
    }

    output
}

fn display_root(root: &Path) -> String {
    let display = root.display().to_string();
    if display.ends_with('/') {
        display
    } else {
        format!("{}/", display)
    }
}
