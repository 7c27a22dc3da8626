//! Full-screen terminal implementation of the [`Operator`] port.
//!
//! Every prompt takes over the terminal (raw mode, alternate screen) and
//! restores it before returning, so log output and `show_playlist` stay
//! visible between prompts.

pub mod app;
pub mod input;
pub mod ui;
pub mod widgets;

use std::cell::RefCell;
use std::io::{self, Stdout};

use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::error;

use crate::operator_tui::app::{PickerState, RatingKeyState};
use crate::operator_tui::input::{handle_picker_key, handle_rating_key_key};
use crate::ports::operator::{Operator, PrematchAction, ScoredTrack, Selection};
use crate::ports::spotify::{RemoteTrack, SpotifyApiPlaylist};

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Default)]
pub struct TerminalOperator {
    /// Prompt closed with a save, reopened for the same track.
    saved_prompt: RefCell<Option<RatingKeyState>>,
}

impl TerminalOperator {
    pub fn new() -> Self {
        Self::default()
    }
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Draw and feed key presses to the state until `done` yields an answer.
fn run_modal<S, T>(
    state: &mut S,
    draw: impl Fn(&mut Frame, &S),
    on_key: impl Fn(&mut S, KeyEvent),
    done: impl Fn(&mut S) -> Option<T>,
) -> Result<T> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, state, &draw, &on_key, &done);
    restore_terminal(&mut terminal)?;
    result
}

fn event_loop<S, T>(
    terminal: &mut Tui,
    state: &mut S,
    draw: &impl Fn(&mut Frame, &S),
    on_key: &impl Fn(&mut S, KeyEvent),
    done: &impl Fn(&mut S) -> Option<T>,
) -> Result<T> {
    loop {
        terminal.draw(|f| draw(f, &*state))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            on_key(state, key);
            if let Some(answer) = done(state) {
                return Ok(answer);
            }
        }
    }
}

impl Operator for TerminalOperator {
    fn show_playlist(&self, playlist: &SpotifyApiPlaylist) {
        println!();
        println!("Playlist: {}", playlist.name);
        if let Some(description) = &playlist.description {
            println!("  {}", description);
        }
        if let Some(cover_url) = &playlist.cover_url {
            println!("  Cover: {}", cover_url);
        }
    }

    fn request_manual_resolution(
        &self,
        remote: &RemoteTrack,
        candidates: &[ScoredTrack],
    ) -> Selection {
        let mut state = PickerState::new(remote.clone(), candidates.to_vec());

        run_modal(
            &mut state,
            ui::render_picker,
            handle_picker_key,
            |s| s.outcome,
        )
        .unwrap_or_else(|e| {
            error!("Candidate picker failed, aborting run: {:#}", e);
            Selection::Abort
        })
    }

    fn prompt_rating_key(&self, remote: &RemoteTrack) -> PrematchAction {
        let saved = self.saved_prompt.borrow_mut().take();
        let mut state = RatingKeyState::resume(saved, remote.clone());

        let action = run_modal(
            &mut state,
            ui::render_rating_key,
            handle_rating_key_key,
            |s| s.outcome.clone(),
        )
        .unwrap_or_else(|e| {
            error!("Rating key prompt failed, closing: {:#}", e);
            PrematchAction::SaveAndClose
        });

        if action == PrematchAction::Save {
            *self.saved_prompt.borrow_mut() = Some(state);
        }
        action
    }
}
