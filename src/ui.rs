use crate::app::App;
use crate::port::Direction;
use crate::table::PortRow;
use crate::toggle::ToggleState;
use ratatui::{
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(3),      // Title
            Constraint::Min(10),        // Ports or unavailable banner
            Constraint::Length(8),      // Log
            Constraint::Length(1),      // Help
        ])
        .split(f.area());

    render_title(f, chunks[0]);
    match app.table.unavailable() {
        Some(e) => render_unavailable(f, chunks[1], &e.to_string()),
        None => render_ports(f, chunks[1], app),
    }
    render_log(f, chunks[2], app);
    render_help(f, chunks[3]);

    if app.show_help {
        render_help_popup(f, f.area());
    }
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new("MIDI Ports")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn render_unavailable(f: &mut Frame, area: Rect, reason: &str) {
    let banner = Paragraph::new(vec![
        Line::from(Span::styled(
            reason.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from("Check that a MIDI subsystem is running and accessible. Press [R] to retry."),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title("MIDI"));
    f.render_widget(banner, area);
}

fn render_ports(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_port_list(f, chunks[0], "MIDI Inputs", app, Direction::Input);
    render_port_list(f, chunks[1], "MIDI Outputs", app, Direction::Output);
}

fn render_port_list(f: &mut Frame, area: Rect, title: &str, app: &App, direction: Direction) {
    let selected_idx = app.selected_idx(direction);

    let items: Vec<ListItem> = app
        .table
        .rows(direction)
        .enumerate()
        .map(|(idx, row)| port_item(row, selected_idx == Some(idx)))
        .collect();

    let is_active = app.focus.direction() == direction;
    let border_style = if is_active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style),
    );

    f.render_widget(list, area);
}

fn port_item(row: PortRow<'_>, is_selected: bool) -> ListItem<'static> {
    let prefix = if is_selected { "> " } else { "  " };

    let button_style = match row.state {
        _ if !row.state.is_enabled() => Style::default().fg(Color::DarkGray),
        ToggleState::Connected => Style::default().fg(Color::Green),
        ToggleState::Failed(_) => Style::default().fg(Color::Red),
        _ => Style::default(),
    };

    let mut spans = vec![
        Span::raw(prefix),
        Span::styled(format!("[{}] ", row.state.button_label()), button_style),
        Span::raw(row.port.label()),
    ];
    if let Some(reason) = row.state.failure() {
        spans.push(Span::styled(format!("  ! {}", reason), Style::default().fg(Color::Red)));
    }

    let style = if is_selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    ListItem::new(Line::from(spans)).style(style)
}

fn render_log(f: &mut Frame, area: Rect, app: &App) {
    // Show the newest lines that fit
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.log_messages.len().saturating_sub(visible);
    let log_lines: Vec<Line> = app
        .log_messages
        .iter()
        .skip(skip)
        .map(|msg| Line::from(msg.clone()))
        .collect();

    let paragraph = Paragraph::new(log_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("LOG"),
    );

    f.render_widget(paragraph, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(
        "[↑↓] Navigate | [Tab] Switch Pane | [Enter/Space] Connect/Disconnect | [R] Rescan | [?] Help | [q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));

    f.render_widget(paragraph, area);
}

fn render_help_popup(f: &mut Frame, area: Rect) {
    let popup = centered(area, 60, 11);
    let text = vec![
        Line::from("Each port has its own toggle."),
        Line::from(""),
        Line::from("[Connect]         port is closed, press Enter to open it"),
        Line::from("[Disconnect]      port is open, press Enter to close it"),
        Line::from("[Connecting...]   waiting for the device, input ignored"),
        Line::from("! reason          the last request failed"),
        Line::from(""),
        Line::from("Ports are rescanned automatically. [Esc] closes this help."),
    ];
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Help"));

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
