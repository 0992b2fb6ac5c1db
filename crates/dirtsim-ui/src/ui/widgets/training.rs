//! # dirtsim-ui::ui::widgets::training
//!
//! Renders live evolutionary training progress.

use crate::{app::App, theme};
use ratatui::{prelude::*, widgets::*};

pub fn draw_training_panel(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Training Progress ").borders(Borders::ALL).border_style(theme::BORDER_STYLE);

    let Some(status) = &app.status else {
        f.render_widget(block, area);
        return;
    };

    let (Some(generation), Some(max_generations)) = (status.generation, status.max_generations) else {
        let text = Paragraph::new("No training session is running.").alignment(Alignment::Center).block(block);
        f.render_widget(text, area);
        return;
    };

    let ratio = if max_generations == 0 { 0.0 } else { (generation as f64 / max_generations as f64).clamp(0.0, 1.0) };
    let label = match status.best_fitness {
        Some(best) => format!("generation {generation}/{max_generations}, best fitness {best:.3}"),
        None => format!("generation {generation}/{max_generations}"),
    };

    let gauge = Gauge::default().block(block).gauge_style(theme::FOCUSED_BORDER_STYLE).ratio(ratio).label(label);
    f.render_widget(gauge, area);
}
