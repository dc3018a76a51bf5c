//! UI rendering for the TUI.

use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::model::{format_bytes, format_size, Column};

use super::app::{App, Mode};
use super::widgets::tree::{render_row, ColumnWidths, RowCells};

/// Render the entire UI.
pub fn render(app: &App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Filter box
            Constraint::Min(1),    // Tree view
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    render_filter_box(app, frame, chunks[1]);
    render_tree_area(app, frame, chunks[2]);
    render_footer(app, frame, chunks[3]);

    if app.mode == Mode::Help {
        render_help_overlay(frame);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let path_display = app.root().display().to_string();
    let size_display = app
        .root_size()
        .map(|r| format_size(r.signed_bytes()))
        .unwrap_or_else(|| "...".to_string());

    let disk_info = app.get_disk_usage().map(|(total, used, avail)| {
        let percent = if total > 0 {
            (used as f64 / total as f64 * 100.0) as u32
        } else {
            0
        };
        format!(
            "Disk: {} / {} ({}% used, {} free)",
            format_bytes(used),
            format_bytes(total),
            percent,
            format_bytes(avail)
        )
    });

    let header_text = match disk_info {
        Some(disk) => format!(" {}  {}  │  {}", path_display, size_display, disk),
        None => format!(" {}  {}", path_display, size_display),
    };

    let block = Block::default()
        .title(" Dir View ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(header_text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn render_filter_box(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.mode == Mode::Filter;
    let border = if editing { Color::Yellow } else { Color::Gray };

    let block = Block::default()
        .title(" Filter ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let paragraph = if app.filter_input.is_empty() && !editing {
        Paragraph::new("Type / to filter files and folders by name")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(app.filter_input.as_str()).style(Style::default().fg(Color::White))
    };

    frame.render_widget(paragraph.block(block), area);

    if editing {
        frame.set_cursor_position(Position::new(
            area.x + 1 + app.filter_input.chars().count() as u16,
            area.y + 1,
        ));
    }
}

fn render_tree_area(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if inner_area.height == 0 {
        return;
    }

    let heading = Rect::new(inner_area.x, inner_area.y, inner_area.width, 1);
    frame.render_widget(Paragraph::new(column_heading(app, inner_area.width)), heading);

    let list_area = Rect::new(
        inner_area.x,
        inner_area.y + 1,
        inner_area.width,
        inner_area.height.saturating_sub(1),
    );

    if app.rows.is_empty() {
        let message = if !app.source.root_is_valid() {
            "Cannot open directory"
        } else if !app.filter_input.is_empty() {
            "No matches found"
        } else {
            "Empty directory"
        };

        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, list_area);
        return;
    }

    let visible_height = list_area.height as usize;
    let scroll_offset = calculate_scroll_offset(app.selected, visible_height, app.rows.len());

    for (i, row) in app
        .rows
        .iter()
        .skip(scroll_offset)
        .take(visible_height)
        .enumerate()
    {
        let cells = RowCells {
            entry: &row.entry,
            depth: row.depth,
            expanded: row.is_expanded,
            size: app.size_text(&row.entry),
            kind: app.source.column_value(&row.entry, Column::Kind),
            modified: app.source.column_value(&row.entry, Column::Modified),
        };
        let is_selected = scroll_offset + i == app.selected;
        let line = render_row(&cells, list_area.width, app.indent, app.icons, is_selected);

        let y = list_area.y + i as u16;
        frame.render_widget(Paragraph::new(line), Rect::new(list_area.x, y, list_area.width, 1));
    }
}

/// Column titles aligned with [`render_row`], marking the sort column.
fn column_heading(app: &App, width: u16) -> Line<'static> {
    let columns = ColumnWidths::for_width(width);
    let arrow = if app.sort_descending { "▼" } else { "▲" };
    let title = |column: Column| {
        if column == app.sort_column {
            format!("{} {}", column.title(), arrow)
        } else {
            column.title().to_string()
        }
    };

    let name_width = (width as usize).saturating_sub(columns.total());
    let mut text = format!("{:<width$}", title(Column::Name), width = name_width);
    if columns.size > 0 {
        text.push_str(&format!("  {:>width$}", title(Column::Size), width = columns.size));
    }
    if columns.kind > 0 {
        text.push_str(&format!("  {:<width$}", title(Column::Kind), width = columns.kind));
    }
    if columns.modified > 0 {
        text.push_str(&format!(
            "  {:<width$}",
            title(Column::Modified),
            width = columns.modified
        ));
    }

    Line::styled(text, Style::default().fg(Color::Cyan).bold())
}

fn calculate_scroll_offset(selected: usize, visible_height: usize, total: usize) -> usize {
    if total <= visible_height {
        return 0;
    }

    let padding = 3.min(visible_height / 4);

    if selected < padding {
        0
    } else if selected >= total - padding {
        total.saturating_sub(visible_height)
    } else {
        selected
            .saturating_sub(visible_height.saturating_sub(padding + 1))
            .min(total - visible_height)
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match app.mode {
        Mode::Normal => {
            "[↑↓] Navigate  [←→] Expand  [Enter] Open  [Bksp] Up  [/] Filter  [s] Sort  [?] Help  [q] Quit"
        }
        Mode::Filter => "[Enter] Keep filter  [Esc] Clear",
        Mode::Help => "[Esc] Close",
    };

    let pending = app.pending_sizes();
    let text = match (&app.status_message, pending) {
        (Some(message), _) => message.clone(),
        (None, 0) => hints.to_string(),
        (None, n) => format!("Sizing {} director{}...", n, if n == 1 { "y" } else { "ies" }),
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    let help_width = 60u16.min(area.width.saturating_sub(8));
    let help_height = 24u16.min(area.height.saturating_sub(4));
    let help_area = Rect {
        x: (area.width.saturating_sub(help_width)) / 2,
        y: (area.height.saturating_sub(help_height)) / 2,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let help_text = r#"
 NAVIGATION
 ─────────────────────────────────
 ↑/k        Move up
 ↓/j        Move down
 →/l        Expand directory
 ←/h        Collapse / Go to parent row
 Space      Toggle expand/collapse
 Enter      Open directory as root
 Bksp/u     Go up one directory
 g / G      Go to top / bottom

 VIEW
 ─────────────────────────────────
 /          Filter by name
 s          Cycle sort column
 S          Reverse sort order
 r          Refresh sizes
 ?          Toggle this help
 q/Esc      Quit
"#;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FsDataSource;
    use crate::tui::app::App;
    use ratatui::backend::TestBackend;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn draw(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut output = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                output.push_str(buffer[(x, y)].symbol());
            }
            output.push('\n');
        }
        output
    }

    #[test]
    fn test_render_does_not_panic_on_invalid_root() {
        let app = App::new(Box::new(FsDataSource::new(Path::new("/nonexistent/12345"))));
        let output = draw(&app, 80, 24);
        assert!(output.contains("Cannot open"));
    }

    #[test]
    fn test_render_rows_with_sizes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("music")).unwrap();
        fs::write(dir.path().join("music/song.mp3"), vec![0u8; 3 * 1024]).unwrap();

        let app = App::new(Box::new(FsDataSource::new(dir.path())));
        let output = draw(&app, 100, 24);
        assert!(output.contains("music"));
        assert!(output.contains("3.00 KB"));
        assert!(output.contains("Folder"));
        assert!(output.contains("Name ▲"));
    }

    #[test]
    fn test_render_small_terminal() {
        let dir = TempDir::new().unwrap();
        let app = App::new(Box::new(FsDataSource::new(dir.path())));
        draw(&app, 20, 5);
    }

    #[test]
    fn test_render_filter_and_help() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(Box::new(FsDataSource::new(dir.path())));
        app.mode = Mode::Filter;
        app.filter_input = "abc".to_string();
        app.apply_filter();
        let output = draw(&app, 80, 24);
        assert!(output.contains("abc"));
        assert!(output.contains("No matches found"));

        app.mode = Mode::Help;
        let output = draw(&app, 80, 30);
        assert!(output.contains("NAVIGATION"));
    }

    #[test]
    fn test_calculate_scroll_offset() {
        // No scroll needed when list fits in view
        assert_eq!(calculate_scroll_offset(0, 20, 10), 0);
        assert_eq!(calculate_scroll_offset(5, 20, 10), 0);

        // At the top
        assert_eq!(calculate_scroll_offset(0, 10, 100), 0);
        assert_eq!(calculate_scroll_offset(2, 10, 100), 0);

        // In the middle the selection stays on screen
        let offset = calculate_scroll_offset(50, 10, 100);
        assert!(offset <= 50);
        assert!(offset + 10 > 50);

        // At the bottom
        assert_eq!(calculate_scroll_offset(99, 10, 100), 90);
    }
}
