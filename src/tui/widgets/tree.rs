//! Rendering of a single tree row.

use ratatui::{
    style::{Color, Style, Stylize},
    text::{Line, Span},
};

use crate::model::Entry;

/// How entries are marked in the name column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconStyle {
    /// Per-type glyphs.
    #[default]
    Custom,
    /// ASCII markers only.
    Plain,
}

impl IconStyle {
    pub fn from_enabled(custom: bool) -> Self {
        if custom {
            IconStyle::Custom
        } else {
            IconStyle::Plain
        }
    }
}

const ARCHIVE_EXTS: &[&str] = &["zip", "tar", "gz", "xz", "bz2", "zst", "7z", "rar"];
const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp"];
const TEXT_EXTS: &[&str] = &["txt", "md", "rst", "log", "toml", "json", "yaml", "yml"];

/// Two-column marker shown before the name.
pub fn icon_for(entry: &Entry, expanded: bool, style: IconStyle) -> &'static str {
    match style {
        IconStyle::Plain => {
            if entry.is_dir {
                if expanded {
                    "- "
                } else {
                    "+ "
                }
            } else if entry.is_symlink {
                "@ "
            } else {
                "  "
            }
        }
        IconStyle::Custom => {
            if entry.is_dir {
                return if expanded { "▾ " } else { "▸ " };
            }
            if entry.is_symlink {
                return "↪ ";
            }
            match entry.extension().as_deref() {
                Some(ext) if ARCHIVE_EXTS.contains(&ext) => "▤ ",
                Some(ext) if IMAGE_EXTS.contains(&ext) => "▣ ",
                Some(ext) if TEXT_EXTS.contains(&ext) => "≡ ",
                _ => "• ",
            }
        }
    }
}

/// Widths of the fixed columns to the right of the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub size: usize,
    pub kind: usize,
    pub modified: usize,
}

impl ColumnWidths {
    /// Drop the optional columns when the area is too narrow.
    pub fn for_width(width: u16) -> Self {
        let width = width as usize;
        if width >= 70 {
            Self {
                size: 12,
                kind: 12,
                modified: 16,
            }
        } else if width >= 40 {
            Self {
                size: 12,
                kind: 12,
                modified: 0,
            }
        } else {
            Self {
                size: 12,
                kind: 0,
                modified: 0,
            }
        }
    }

    /// Characters taken by the fixed columns, including separators.
    pub fn total(&self) -> usize {
        [self.size, self.kind, self.modified]
            .iter()
            .filter(|w| **w > 0)
            .map(|w| w + 2)
            .sum()
    }
}

/// Cell texts for one row, already computed by the caller.
pub struct RowCells<'a> {
    pub entry: &'a Entry,
    pub depth: usize,
    pub expanded: bool,
    pub size: String,
    pub kind: String,
    pub modified: String,
}

/// Lay out a row as a single line of `width` characters.
pub fn render_row(
    cells: &RowCells<'_>,
    width: u16,
    indent: u16,
    icons: IconStyle,
    selected: bool,
) -> Line<'static> {
    let columns = ColumnWidths::for_width(width);
    let prefix = format!(
        "{}{}",
        " ".repeat(cells.depth * indent as usize),
        icon_for(cells.entry, cells.expanded, icons)
    );

    let name_width = (width as usize).saturating_sub(prefix.chars().count() + columns.total());
    let name = truncate(&cells.entry.name, name_width);
    let padding = " ".repeat(name_width.saturating_sub(name.chars().count()));

    let name_style = if cells.entry.is_dir {
        Style::default().fg(Color::Blue).bold()
    } else if cells.entry.is_symlink {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::styled(prefix, name_style),
        Span::styled(name, name_style),
        Span::raw(padding),
    ];

    if columns.size > 0 {
        spans.push(Span::styled(
            format!("  {:>width$}", cells.size, width = columns.size),
            Style::default().fg(Color::Yellow),
        ));
    }
    if columns.kind > 0 {
        spans.push(Span::styled(
            format!("  {:<width$}", truncate(&cells.kind, columns.kind), width = columns.kind),
            Style::default().fg(Color::Gray),
        ));
    }
    if columns.modified > 0 {
        spans.push(Span::styled(
            format!("  {:<width$}", cells.modified, width = columns.modified),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let line = Line::from(spans);
    if selected {
        line.style(Style::default().bg(Color::DarkGray))
    } else {
        line
    }
}

/// Cut `text` to at most `width` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    if width <= 1 {
        return text.chars().take(width).collect();
    }
    let kept: String = text.chars().take(width - 1).collect();
    format!("{}…", kept)
}
