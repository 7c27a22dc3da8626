use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::operator_tui::app::{PickerState, RatingKeyState};
use crate::ports::operator::{PrematchAction, Selection};

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

pub fn handle_picker_key(state: &mut PickerState, key: KeyEvent) {
    if is_ctrl(&key, 'c') {
        state.finish(Selection::Abort);
        return;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => state.select_next(),
        KeyCode::Enter => state.choose(),
        KeyCode::Char('s') => state.finish(Selection::Skip),
        KeyCode::Char('q') | KeyCode::Esc => state.finish(Selection::Abort),
        _ => {}
    }
}

pub fn handle_rating_key_key(state: &mut RatingKeyState, key: KeyEvent) {
    if is_ctrl(&key, 'c') {
        state.finish(PrematchAction::SaveAndClose);
        return;
    }
    if is_ctrl(&key, 's') {
        state.finish(PrematchAction::Save);
        return;
    }

    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => state.input.push(c),
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Enter => state.submit(),
        KeyCode::Tab => state.finish(PrematchAction::Skip),
        KeyCode::Esc => state.finish(PrematchAction::SaveAndClose),
        _ => {}
    }
}
