//! # dirtsim-ui::ui::widgets::log
//!
//! Renders the most recent telemetry events.

use crate::{app::App, theme};
use ratatui::{prelude::*, widgets::*};

pub fn draw_log_panel(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Recent Events ").borders(Borders::ALL).border_style(theme::BORDER_STYLE);

    let Some(status) = &app.status else {
        f.render_widget(block, area);
        return;
    };

    let items: Vec<ListItem> = status.recent_events.iter().rev().map(|line| ListItem::new(line.clone())).collect();
    let list = List::new(items).block(block).style(theme::TEXT_STYLE);
    f.render_widget(list, area);
}
