//! # dirtsim-ui::ui::layout
//!
//! Defines the `ratatui` layout structures for the dashboard.

use ratatui::prelude::*;
use std::rc::Rc;

/// Creates the main layout with four vertical chunks.
pub fn create_main_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // Status bar
            Constraint::Percentage(40), // Training progress
            Constraint::Percentage(30), // Middle row (state + genomes)
            Constraint::Min(10),        // Recent events
        ])
        .split(area)
}

/// Creates the middle layout with two horizontal chunks.
pub fn create_middle_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50), // State panel
            Constraint::Percentage(50), // Genome browser
        ])
        .split(area)
}
