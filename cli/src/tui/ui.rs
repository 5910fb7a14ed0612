//! TUI rendering.

use porty_core::{shorten_paths, ProcessRecord, SessionMode, SessionState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::commands::truncate;

pub fn draw(f: &mut Frame, state: &SessionState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Message
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, state, chunks[0]);
    draw_table(f, state, chunks[1]);
    draw_message(f, state, chunks[2]);
    draw_footer(f, state, chunks[3]);
}

fn draw_header(f: &mut Frame, state: &SessionState, area: Rect) {
    let title = if state.mode == SessionMode::Filtering {
        format!("porty | Search: {}_", state.filter_text)
    } else {
        let scope = if state.include_all_ports {
            "All Ports"
        } else {
            "Dev Only"
        };
        let mut title = format!("porty | {} | Found: {} processes", scope, state.filtered.len());
        if !state.filter_text.is_empty() {
            title.push_str(&format!(" | Filter: {}", state.filter_text));
        }
        if !state.selected_pids.is_empty() {
            title.push_str(&format!(" | Selected: {}", state.selected_pids.len()));
        }
        title
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(header, area);
}

fn draw_table(f: &mut Frame, state: &SessionState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Listening Ports ");

    if state.filtered.is_empty() {
        let text = if state.loading {
            "Scanning ports...".to_string()
        } else if !state.filter_text.is_empty() {
            format!("No matches for \"{}\"", state.filter_text)
        } else {
            "No processes found on listening ports".to_string()
        };
        f.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let header_cells = ["#", " ", "PID", "PORT", "PROCESS", "COMMAND"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = state.visible_rows().iter().enumerate().map(|(i, record)| {
        let index = state.scroll_offset + i;
        let marked = state.is_selected(record.pid);

        let cells = vec![
            Cell::from((index + 1).to_string()).style(Style::default().fg(Color::DarkGray)),
            Cell::from(if marked { "●" } else { " " }).style(Style::default().fg(Color::Magenta)),
            Cell::from(record.pid.to_string()).style(Style::default().fg(Color::LightMagenta)),
            Cell::from(record.port.to_string()).style(Style::default().fg(port_color(record.port)).bold()),
            Cell::from(truncate(&record.process_name, 20))
                .style(Style::default().fg(process_color(&record.process_name))),
            Cell::from(command_text(record, state.verbose, state.show_paths))
                .style(Style::default().fg(Color::Gray)),
        ];

        Row::new(cells)
    });

    let widths = [
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(20),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::Cyan).fg(Color::Black).bold());

    let mut table_state = TableState::default();
    table_state.select(Some(state.selected_index.saturating_sub(state.scroll_offset)));

    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_message(f: &mut Frame, state: &SessionState, area: Rect) {
    let mut text = state.message.clone();
    if state.escalation_pending.is_some() {
        if !text.is_empty() {
            text.push_str(" | ");
        }
        text.push_str("Waiting for admin action...");
    }

    let message = Paragraph::new(text)
        .style(Style::default().fg(message_color(state)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(message, area);
}

fn draw_footer(f: &mut Frame, state: &SessionState, area: Rect) {
    let (help, color) = match state.mode {
        SessionMode::Filtering => ("Type to filter | Enter: keep | Esc: clear", Color::DarkGray),
        SessionMode::ConfirmSingleKill { .. } | SessionMode::ConfirmMultiKill { .. } => {
            ("Confirm Kill: Enter/y to confirm | Esc/n to cancel", Color::Yellow)
        }
        SessionMode::AwaitingAdminRetry { .. } => {
            ("Admin Required: A launch admin terminal | Esc cancel", Color::Red)
        }
        SessionMode::Browsing => (
            "↑↓/jk nav | ⏎/x kill | space select | / search | c clear | r refresh | d dev/all | v verbose | p paths | q quit",
            Color::DarkGray,
        ),
    };

    let footer = Paragraph::new(help)
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );

    f.render_widget(footer, area);
}

fn command_text(record: &ProcessRecord, verbose: bool, show_paths: bool) -> String {
    let command = record.display_command(verbose);
    if show_paths {
        command.to_string()
    } else {
        shorten_paths(command)
    }
}

fn port_color(port: u16) -> Color {
    match port {
        0..=1023 => Color::LightRed,
        3000..=9999 => Color::Cyan,
        49152..=u16::MAX => Color::LightGreen,
        _ => Color::Yellow,
    }
}

fn process_color(name: &str) -> Color {
    let name = name.to_lowercase();
    if name.contains("node") || name.contains("npm") {
        Color::Green
    } else if name.contains("python") {
        Color::Blue
    } else if name.contains("java") {
        Color::LightYellow
    } else if name.contains("docker") {
        Color::LightBlue
    } else {
        Color::White
    }
}

fn message_color(state: &SessionState) -> Color {
    let message = state.message.as_str();
    if message.starts_with("Successfully") || message.starts_with("Admin kill successful") {
        Color::Green
    } else if message.starts_with("Failed") || message.starts_with("Admin kill failed") {
        Color::Red
    } else if message.starts_with("Kill") || state.escalation_pending.is_some() {
        Color::Yellow
    } else {
        Color::Cyan
    }
}
