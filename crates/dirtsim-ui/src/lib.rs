//! # dirtsim-ui
//!
//! The UI process: a terminal dashboard plus its own command surface and
//! state machine (spec §4.9, §6). It forwards authoritative mutations to
//! the Server over an `OutboundClient` and reacts to the Server's
//! broadcasts the same way it reacts to its own local commands.

#![forbid(unsafe_code)]

use crate::app::App;
use crate::dispatcher::UiStatusSnapshot;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dirtsim_engine::events::EventSender;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    time::{Duration, Instant},
};

pub mod app;
pub mod commands;
pub mod dispatcher;
pub mod input;
pub mod state;
mod theme;
mod ui;
pub mod wiring;

/// The main entry point for running the dashboard. Takes a receiver for
/// `UiStatusSnapshot` updates from the dispatcher and the sender keypresses
/// are turned into `CommandInvocation`s on.
pub fn run_tui(status_rx: crossbeam_channel::Receiver<UiStatusSnapshot>, event_sender: EventSender) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(event_sender);
    let res = run_app(&mut terminal, &mut app, status_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("UI error: {err:?}")
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    status_rx: crossbeam_channel::Receiver<UiStatusSnapshot>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if key.code == KeyCode::Char('q') {
                    app.exit();
                    return Ok(());
                }
                input::handle_key_press(key, app);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        while let Ok(status) = status_rx.try_recv() {
            app.update_status(status);
        }
    }
}
