//! # dirtsim-ui::ui::widgets::status
//!
//! Renders the status bar and the state panel.

use crate::{app::App, theme};
use ratatui::{prelude::*, widgets::*};

pub fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let connected_str = match &app.status {
        Some(status) if status.connected_to_server => "connected",
        Some(_) => "disconnected",
        None => "N/A",
    };

    let text = Line::from(vec![
        Span::styled(" DirtSim UI ", Style::new().bg(Color::Cyan).fg(Color::Black)),
        Span::raw(" | "),
        Span::styled(connected_str, Style::new().fg(Color::Green)),
        Span::raw(" | Press '?' for help, 'q' to quit"),
    ]);
    f.render_widget(Paragraph::new(text), area);
}

pub fn draw_state_panel(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" State ").borders(Borders::ALL).border_style(theme::BORDER_STYLE);

    let Some(status) = &app.status else {
        f.render_widget(block, area);
        return;
    };

    let rows = vec![
        Row::new(vec![Cell::from("UI state"), Cell::from(status.ui_state.clone())]),
        Row::new(vec![
            Cell::from("Server"),
            Cell::from(if status.connected_to_server { "connected" } else { "disconnected" })
                .style(if status.connected_to_server { Style::new().fg(Color::Green) } else { Style::new().fg(Color::Red) }),
        ]),
    ];

    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(12)])
        .header(Row::new(vec!["Field", "Value"]).style(theme::TITLE_STYLE))
        .block(block);

    f.render_widget(table, area);
}
