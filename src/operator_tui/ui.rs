use ratatui::{
    prelude::*,
    widgets::{Block, List, ListState, Paragraph},
};

use crate::operator_tui::app::{PickerState, RatingKeyState};
use crate::operator_tui::widgets;

const PANEL_HEIGHT: u16 = 10;

fn help_line(text: &str) -> Paragraph<'_> {
    Paragraph::new(text).style(Style::default().fg(Color::DarkGray))
}

pub fn render_picker(frame: &mut Frame, state: &PickerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(PANEL_HEIGHT), // Spotify track
            Constraint::Min(0),               // Candidates
            Constraint::Length(1),            // Help text
        ])
        .split(frame.area());

    frame.render_widget(widgets::track_panel(&state.remote), chunks[0]);

    let items: Vec<_> = state
        .candidates
        .iter()
        .map(widgets::candidate_item)
        .collect();
    let list = List::new(items)
        .block(Block::bordered().title(format!(
            "Plex candidates ({})",
            state.candidates.len()
        )))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(list, chunks[1], &mut list_state);

    frame.render_widget(
        help_line("[↑↓/jk: Navigate] [Enter: Choose] [s: Skip] [q/Esc: Abort run]"),
        chunks[2],
    );
}

pub fn render_rating_key(frame: &mut Frame, state: &RatingKeyState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(PANEL_HEIGHT), // Spotify track
            Constraint::Length(3),            // Rating key input
            Constraint::Min(0),               // Status
            Constraint::Length(1),            // Help text
        ])
        .split(frame.area());

    frame.render_widget(widgets::track_panel(&state.remote), chunks[0]);
    widgets::render_input_field(frame, chunks[1], "Plex rating key", &state.input);

    if let Some(status) = &state.status_message {
        frame.render_widget(
            Paragraph::new(status.as_str()).style(Style::default().fg(Color::Green)),
            chunks[2],
        );
    }

    frame.render_widget(
        help_line("[Enter: Submit] [Tab: Skip] [Ctrl-S: Save] [Esc: Save and close]"),
        chunks[3],
    );
}
