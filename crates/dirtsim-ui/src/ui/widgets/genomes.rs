//! # dirtsim-ui::ui::widgets::genomes
//!
//! Renders the genome browser list (spec §4.9 "GenomeBrowserOpen").

use crate::{app::App, theme};
use ratatui::{prelude::*, widgets::*};

pub fn draw_genome_panel(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Genomes ").borders(Borders::ALL).border_style(theme::BORDER_STYLE);

    let Some(status) = &app.status else {
        f.render_widget(block, area);
        return;
    };

    let rows = status.genomes.iter().map(|record| {
        Row::new(vec![
            Cell::from(record.id.to_string()),
            Cell::from(format!("{:.3}", record.metadata.fitness)),
            Cell::from(record.metadata.generation.to_string()),
            Cell::from(record.metadata.display_name.clone()),
        ])
    });

    let table = Table::new(rows, [Constraint::Length(8), Constraint::Length(10), Constraint::Length(6), Constraint::Min(16)])
        .header(Row::new(vec!["ID", "Fitness", "Gen", "Name"]).style(theme::TITLE_STYLE))
        .block(block);

    f.render_widget(table, area);
}
