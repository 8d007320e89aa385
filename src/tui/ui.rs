//! UI rendering for the TUI.

use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
};

use super::app::{App, Mode, Phase};
use crate::batch::JobOutcome;
use crate::project::{Disposition, ProjectRecord};

/// Render the entire UI.
pub fn render(app: &App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Progress
            Constraint::Min(1),    // Project list
            Constraint::Length(2), // Footer
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    render_progress(app, frame, chunks[1]);
    match app.phase {
        Phase::Done => render_summary(app, frame, chunks[2]),
        _ => render_list(app, frame, chunks[2]),
    }
    render_footer(app, frame, chunks[3]);

    // Render overlays based on mode
    match app.mode {
        Mode::Confirm => render_confirm_dialog(app, frame),
        Mode::Help => render_help_overlay(frame),
        Mode::Normal => {}
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let counts = app.store.counts();
    let header_text = format!(
        " {}  │  {} projects  │  {} archive  {} delete",
        app.root.display(),
        app.store.len(),
        counts.archive,
        counts.delete
    );

    let block = Block::default()
        .title(" Unity Sweeper ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(header_text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn render_progress(app: &App, frame: &mut Frame, area: Rect) {
    let (title, ratio, label) = match app.phase {
        Phase::Scanning => {
            let latest = app.scan.latest.as_deref().unwrap_or("-");
            (
                " Scanning ",
                app.scan.progress / 100.0,
                format!("{:.0}%  ({} found, latest: {})", app.scan.progress, app.scan.found, latest),
            )
        }
        Phase::Working => {
            let (finished, total) = app.batch_progress;
            let ratio = if total == 0 {
                1.0
            } else {
                finished as f64 / total as f64
            };
            (" Working ", ratio, format!("{}/{} jobs", finished, total))
        }
        Phase::Selecting => (" Ready ", 1.0, "Scan complete".to_string()),
        Phase::Done => (" Done ", 1.0, "Batch complete".to_string()),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        )
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);

    frame.render_widget(gauge, area);
}

fn render_list(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    if app.store.is_empty() {
        let message = if app.phase == Phase::Scanning {
            "Scanning..."
        } else {
            "No Unity projects found"
        };

        let paragraph = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));

        frame.render_widget(paragraph, area);
        return;
    }

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let visible_height = inner_area.height as usize;

    // Calculate scroll offset to keep selection visible
    let scroll_offset = calculate_scroll_offset(app.selected, visible_height, app.store.len());

    for (i, record) in app
        .store
        .iter()
        .skip(scroll_offset)
        .take(visible_height)
        .enumerate()
    {
        let y = inner_area.y + i as u16;
        let is_selected = scroll_offset + i == app.selected;
        let area = Rect::new(inner_area.x, y, inner_area.width, 1);

        frame.render_widget(Paragraph::new(record_line(record, area.width, is_selected)), area);
    }
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
        selected.saturating_sub(padding)
    }
}

fn disposition_color(disposition: Disposition) -> Color {
    match disposition {
        Disposition::None => Color::DarkGray,
        Disposition::Archive => Color::Yellow,
        Disposition::Delete => Color::Red,
    }
}

fn record_line(record: &ProjectRecord, width: u16, is_selected: bool) -> Line<'static> {
    let disposition = record.disposition();
    let tag = format!("[{:^7}] ", disposition);
    let name = record.name();

    // Path gets whatever the tag and name leave over
    let path = record.path().display().to_string();
    let used = tag.chars().count() + name.chars().count() + 2;
    let path_width = (width as usize).saturating_sub(used);
    let path_count = path.chars().count();
    let path_display = if path_count > path_width && path_width > 1 {
        let tail: String = path.chars().skip(path_count - (path_width - 1)).collect();
        format!("…{}", tail)
    } else {
        path
    };

    let mut line = Line::from(vec![
        Span::styled(tag, Style::default().fg(disposition_color(disposition))),
        Span::styled(name, Style::default().fg(Color::Blue).bold()),
        Span::raw("  "),
        Span::styled(path_display, Style::default().fg(Color::DarkGray)),
    ]);

    if is_selected {
        line = line.style(Style::default().bg(Color::DarkGray));
    }

    line
}

fn render_summary(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Summary ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let mut lines = Vec::new();
    if let Some(summary) = &app.summary {
        lines.push(Line::from(format!(
            "Archived: {} ({})",
            summary.archived_count,
            humansize::format_size(summary.archive_bytes, humansize::BINARY)
        )));
        lines.push(Line::from(format!("Deleted:  {}", summary.deleted_count)));
        lines.push(Line::from(format!("Failed:   {}", summary.failed_count)));
    }

    for outcome in &app.failures {
        if let JobOutcome::Failed {
            path,
            disposition,
            error,
        } = outcome
        {
            lines.push(Line::styled(
                format!("  {} {}: {}", disposition, path.display(), error),
                Style::default().fg(Color::Red),
            ));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::styled(
        "[r] Rescan  [q] Quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match app.mode {
        Mode::Normal => match app.phase {
            Phase::Working => "Working...",
            _ => "[↑↓] Navigate  [Space] Cycle  [a/d/n] Set  [x] Run  [r] Rescan  [?] Help  [q] Quit",
        },
        Mode::Confirm => "[y] Yes  [n] No",
        Mode::Help => "[Esc] Close",
    };

    // Show status message if present, otherwise hints
    let text = app.status_message.as_deref().unwrap_or(hints);

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_confirm_dialog(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Center the dialog
    let dialog_width = 50u16.min(area.width.saturating_sub(4));
    let dialog_height = 7u16;
    let dialog_area = Rect {
        x: (area.width.saturating_sub(dialog_width)) / 2,
        y: (area.height.saturating_sub(dialog_height)) / 2,
        width: dialog_width,
        height: dialog_height,
    };

    // Clear background
    frame.render_widget(Clear, dialog_area);

    let counts = app.store.counts();
    let message = format!(
        "Archive {} and delete {} project{}?\n\nThis cannot be undone.\n[y]es  [n]o",
        counts.archive,
        counts.delete,
        if counts.delete == 1 { "" } else { "s" }
    );

    let block = Block::default()
        .title(" Run Batch ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, dialog_area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    let help_width = 60u16.min(area.width.saturating_sub(8));
    let help_height = 22u16.min(area.height.saturating_sub(4));
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
 g / G      Go to top / bottom

 DISPOSITIONS
 ─────────────────────────────────
 Space      Cycle none/archive/delete
 a / d / n  Archive / delete / none
 A / D / N  Same, for every project

 ACTIONS
 ─────────────────────────────────
 x          Run the batch
 r          Rescan
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
    use crate::config::Config;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn app_with(paths: &[&str]) -> App {
        let mut app = App::new(PathBuf::from("/test"), &Config::default()).unwrap();
        for p in paths {
            app.store.push(ProjectRecord::new(PathBuf::from(p)));
        }
        app
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_render_does_not_panic() {
        let app = app_with(&[]);
        draw(&app, 80, 24);
    }

    #[test]
    fn test_render_lists_projects() {
        let mut app = app_with(&["/test/Alpha", "/test/Beta"]);
        app.store.set_disposition_at(1, Disposition::Delete);

        let screen = draw(&app, 80, 24);

        assert!(screen.contains("Alpha"));
        assert!(screen.contains("Beta"));
        assert!(screen.contains("delete"));
    }

    #[test]
    fn test_render_scanning_gauge() {
        let mut app = app_with(&[]);
        app.phase = Phase::Scanning;
        app.scan.progress = 42.0;

        let screen = draw(&app, 80, 24);

        assert!(screen.contains("Scanning"));
        assert!(screen.contains("42%"));
    }

    #[test]
    fn test_render_confirm_dialog() {
        let mut app = app_with(&["/test/Alpha"]);
        app.store.set_disposition_at(0, Disposition::Archive);
        app.mode = Mode::Confirm;

        let screen = draw(&app, 80, 24);
        assert!(screen.contains("Run Batch"));
    }

    #[test]
    fn test_render_help_overlay() {
        let mut app = app_with(&[]);
        app.mode = Mode::Help;

        let screen = draw(&app, 80, 30);
        assert!(screen.contains("Help"));
    }

    #[test]
    fn test_render_tiny_terminal() {
        let app = app_with(&["/test/Alpha"]);
        draw(&app, 10, 4);
    }

    #[test]
    fn test_calculate_scroll_offset() {
        // No scroll needed when list fits in view
        assert_eq!(calculate_scroll_offset(0, 20, 10), 0);
        assert_eq!(calculate_scroll_offset(5, 20, 10), 0);

        // At the top
        assert_eq!(calculate_scroll_offset(0, 10, 100), 0);
        assert_eq!(calculate_scroll_offset(2, 10, 100), 0);

        let offset = calculate_scroll_offset(50, 10, 100);
        assert!(offset <= 50);
        assert!(offset + 10 > 50);

        // At the bottom
        assert_eq!(calculate_scroll_offset(99, 10, 100), 90);
    }

    #[test]
    fn test_record_line_truncates_path() {
        let record = ProjectRecord::new(PathBuf::from("/a/very/long/path/to/the/Game"));
        let line = record_line(&record, 30, false);
        assert!(line.width() <= 30);
    }
}
