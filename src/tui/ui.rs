//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, Focus};
use crate::{
    catalog::LANGUAGE_REFERENCE,
    orchestrator::{view::NO_VARIABLES, OutputKind, VariablesView},
    printer::variable_table,
};

const STATUS_BAR_HEIGHT: u16 = 1;

/// Rows available for program text given the full terminal height.
pub fn editor_viewport_height(total_height: u16) -> usize {
    total_height.saturating_sub(STATUS_BAR_HEIGHT + 2) as usize
}

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),                    // Editor + side panels
            Constraint::Length(STATUS_BAR_HEIGHT), // Status bar
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_layout[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Example preview
            Constraint::Length(3), // Input field
            Constraint::Min(5),    // Output
            Constraint::Min(5),    // Variables
        ])
        .split(body[1]);

    render_editor(frame, app, body[0]);
    render_example(frame, app, side[0]);
    render_input(frame, app, side[1]);
    render_output(frame, app, side[2]);
    render_variables(frame, app, side[3]);
    render_status_bar(frame, app, main_layout[1]);

    if app.show_reference {
        render_reference_overlay(frame);
    }
    if app.show_help {
        render_help_overlay(frame);
    }
    if app.indicator().busy {
        render_loading_overlay(frame);
    }
}

fn panel(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).border_style(border).title(title)
}

/// Render the program buffer with a line-number gutter
fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let height = area.height.saturating_sub(2) as usize;
    let gutter = session.line_count().to_string().len();
    let gutter_style = Style::default().fg(Color::DarkGray);

    let lines: Vec<Line> = session
        .lines()
        .iter()
        .enumerate()
        .skip(session.scroll_top())
        .take(height)
        .map(|(i, text)| {
            Line::from(vec![
                Span::styled(format!("{:>gutter$} ", i + 1), gutter_style),
                Span::raw(text.clone()),
            ])
        })
        .collect();

    let title = format!("Editor - {} lines", app.line_count());
    let focused = app.focus == Focus::Editor;
    frame.render_widget(Paragraph::new(Text::from(lines)).block(panel(title, focused)), area);

    if focused && !app.show_reference && !app.show_help {
        let (row, col) = session.cursor();
        if row >= session.scroll_top() && row < session.scroll_top() + height {
            let line = &session.lines()[row];
            let prefix: String = line.chars().take(col).collect();
            let x = area.x + 1 + gutter as u16 + 1 + prefix.width() as u16;
            let y = area.y + 1 + (row - session.scroll_top()) as u16;
            if x < area.right().saturating_sub(1) {
                frame.set_cursor_position((x, y));
            }
        }
    }
}

/// Render the selected example's title and program preview
fn render_example(frame: &mut Frame, app: &App, area: Rect) {
    let example = app.current_example();
    let mut lines = vec![Line::from(Span::styled(
        example.title,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))];
    lines.extend(example.code.lines().map(|l| Line::from(l.to_string())));

    let title = format!("Example: {} (F3/F4 switch, Ctrl+L load)", example.id);
    frame.render_widget(Paragraph::new(Text::from(lines)).block(panel(title, false)), area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Input;
    let paragraph = Paragraph::new(app.input.as_str())
        .block(panel("Input (comma separated)".to_string(), focused));
    frame.render_widget(paragraph, area);

    if focused && !app.show_reference && !app.show_help {
        let prefix: String = app.input.chars().take(app.input_cursor).collect();
        let x = area.x + 1 + prefix.width() as u16;
        if x < area.right().saturating_sub(1) {
            frame.set_cursor_position((x, area.y + 1));
        }
    }
}

fn render_output(frame: &mut Frame, app: &App, area: Rect) {
    let style = match app.output.kind {
        OutputKind::Idle => Style::default().fg(Color::DarkGray),
        OutputKind::Normal => Style::default().fg(Color::Green),
        OutputKind::Error => Style::default().fg(Color::Red),
    };
    let paragraph = Paragraph::new(app.output.text.as_str())
        .style(style)
        .block(panel("Output".to_string(), false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_variables(frame: &mut Frame, app: &App, area: Rect) {
    let text = match &app.variables {
        VariablesView::NotLoaded | VariablesView::Empty => Text::from(Line::from(Span::styled(
            NO_VARIABLES,
            Style::default().fg(Color::DarkGray),
        ))),
        VariablesView::Entries(entries) => Text::from(
            variable_table(entries)
                .into_iter()
                .map(|row| Line::from(Span::styled(row, Style::default().fg(Color::Cyan))))
                .collect::<Vec<_>>(),
        ),
    };
    frame.render_widget(Paragraph::new(text).block(panel("Variables".to_string(), false)), area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_text = format!(
        "{} | engine: {} | F5 run | F1 help",
        app.indicator().status,
        app.engine_url
    );
    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_paragraph, area);
}

fn render_loading_overlay(frame: &mut Frame) {
    let area = centered_rect(30, 20, frame.area());
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new("Executing...")
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Please wait"));
    frame.render_widget(paragraph, area);
}

fn render_reference_overlay(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);
    let lines: Vec<Line> = LANGUAGE_REFERENCE.lines().map(|l| Line::from(l.to_string())).collect();
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Reference (F2 to hide)")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let help_lines = vec![
        Line::from("Playground Help"),
        Line::from(""),
        Line::from("  F5 / Ctrl+Enter - Run program"),
        Line::from("  Ctrl+K          - Clear output"),
        Line::from("  Ctrl+D          - Clear code"),
        Line::from("  Ctrl+R          - Refresh variables"),
        Line::from("  Ctrl+X          - Reset interpreter"),
        Line::from("  Ctrl+L          - Load selected example"),
        Line::from("  F3 / F4         - Next / previous example"),
        Line::from("  F2              - Toggle language reference"),
        Line::from("  Esc / Shift+Tab - Switch editor / input"),
        Line::from("  Tab             - Indent (editor), back to editor (input)"),
        Line::from("  Ctrl+Q          - Quit"),
        Line::from("  F1              - Toggle this help"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(help_paragraph, area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
