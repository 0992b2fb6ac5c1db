//! # dirtsim-ui::ui
//!
//! The main rendering module. It orchestrates the drawing of all UI components.

use crate::app::App;
use ratatui::{prelude::*, widgets::*};

mod help;
mod layout;
mod widgets;

/// The main draw function that renders the entire UI.
pub fn draw(f: &mut Frame, app: &App) {
    let main_layout = layout::create_main_layout(f.size());
    f.render_widget(Block::new().style(Style::new().bg(Color::Black)), f.size());

    if app.status.is_some() {
        widgets::status::draw_status_bar(f, app, main_layout[0]);
        widgets::training::draw_training_panel(f, app, main_layout[1]);

        let mid_layout = layout::create_middle_layout(main_layout[2]);
        widgets::status::draw_state_panel(f, app, mid_layout[0]);
        widgets::genomes::draw_genome_panel(f, app, mid_layout[1]);

        widgets::log::draw_log_panel(f, app, main_layout[3]);
    } else {
        let area = f.size();
        let block = Block::default().title(" DirtSim UI ").borders(Borders::ALL);
        let text = Paragraph::new("Waiting for the dispatcher to come up...").alignment(Alignment::Center).block(block);
        f.render_widget(text, area);
    }

    if app.show_help {
        help::draw_help_popup(f);
    }
}
