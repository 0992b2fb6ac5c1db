//! # dirtsim-ui::input
//!
//! Handles user keyboard input and maps it to actions within the dashboard.

use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent};

/// Handles a key press event and updates the app state accordingly.
pub fn handle_key_press(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('?') => {
            app.toggle_help();
        }
        KeyCode::Char('r') => {
            app.sim_run();
        }
        KeyCode::Char('p') => {
            app.sim_pause();
        }
        KeyCode::Char('x') => {
            app.sim_stop();
        }
        KeyCode::Char('t') => {
            app.training_start();
        }
        KeyCode::Char('s') => {
            app.result_save();
        }
        KeyCode::Char('d') => {
            app.result_discard();
        }
        KeyCode::Char('g') => {
            app.genome_browser_open();
        }
        KeyCode::Tab => {
            app.cycle_focus();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use dirtsim_engine::events::EventQueue;

    fn create_test_app() -> App {
        let queue = EventQueue::bounded(64);
        App::new(queue.sender())
    }

    #[test]
    fn test_help_key() {
        let mut app = create_test_app();
        assert!(!app.show_help);

        let key = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::empty());
        handle_key_press(key, &mut app);
        assert!(app.show_help);

        handle_key_press(key, &mut app);
        assert!(!app.show_help);
    }

    #[test]
    fn test_tab_key() {
        let mut app = create_test_app();
        assert_eq!(app.focused_panel, 0);

        let key = KeyEvent::new(KeyCode::Tab, KeyModifiers::empty());
        handle_key_press(key, &mut app);
        assert_eq!(app.focused_panel, 1);

        handle_key_press(key, &mut app);
        assert_eq!(app.focused_panel, 2);

        handle_key_press(key, &mut app);
        assert_eq!(app.focused_panel, 3);

        handle_key_press(key, &mut app);
        assert_eq!(app.focused_panel, 0);
    }

    #[test]
    fn test_all_keys_handled() {
        let mut app = create_test_app();

        let keys = vec![
            KeyEvent::new(KeyCode::Char('?'), KeyModifiers::empty()),
            KeyEvent::new(KeyCode::Char('r'), KeyModifiers::empty()),
            KeyEvent::new(KeyCode::Char('p'), KeyModifiers::empty()),
            KeyEvent::new(KeyCode::Char('x'), KeyModifiers::empty()),
            KeyEvent::new(KeyCode::Char('t'), KeyModifiers::empty()),
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::empty()),
            KeyEvent::new(KeyCode::Char('d'), KeyModifiers::empty()),
            KeyEvent::new(KeyCode::Char('g'), KeyModifiers::empty()),
            KeyEvent::new(KeyCode::Tab, KeyModifiers::empty()),
            // an unhandled key
            KeyEvent::new(KeyCode::Char('z'), KeyModifiers::empty()),
        ];

        for key in keys {
            handle_key_press(key, &mut app);
        }
    }
}
