use crate::ports::operator::{PrematchAction, ScoredTrack, Selection};
use crate::ports::spotify::RemoteTrack;

/// State of the candidate picker shown when no match was good enough.
#[derive(Debug, Clone)]
pub struct PickerState {
    pub remote: RemoteTrack,
    pub candidates: Vec<ScoredTrack>,
    pub selected: usize,
    pub outcome: Option<Selection>,
}

impl PickerState {
    pub fn new(remote: RemoteTrack, candidates: Vec<ScoredTrack>) -> Self {
        Self {
            remote,
            candidates,
            selected: 0,
            outcome: None,
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.candidates.len() {
            self.selected += 1;
        }
    }

    pub fn choose(&mut self) {
        if self.selected < self.candidates.len() {
            self.outcome = Some(Selection::Chosen(self.selected));
        }
    }

    pub fn finish(&mut self, selection: Selection) {
        self.outcome = Some(selection);
    }
}

/// State of the pre-match rating key prompt.
#[derive(Debug, Clone)]
pub struct RatingKeyState {
    pub remote: RemoteTrack,
    pub input: String,
    pub outcome: Option<PrematchAction>,
    /// Shown under the input after a save.
    pub status_message: Option<String>,
}

const SAVED_MESSAGE: &str = "Saved matches";

impl RatingKeyState {
    pub fn new(remote: RemoteTrack) -> Self {
        Self {
            remote,
            input: String::new(),
            outcome: None,
            status_message: None,
        }
    }

    /// Prompt for `remote`, carrying over the input of a prompt that was
    /// closed with a save for the same track.
    pub fn resume(saved: Option<RatingKeyState>, remote: RemoteTrack) -> Self {
        match saved {
            Some(saved) if saved.remote.id == remote.id => Self {
                remote,
                input: saved.input,
                outcome: None,
                status_message: Some(SAVED_MESSAGE.to_string()),
            },
            _ => Self::new(remote),
        }
    }

    pub fn submit(&mut self) {
        self.outcome = Some(PrematchAction::Submit(self.input.clone()));
    }

    pub fn finish(&mut self, action: PrematchAction) {
        self.outcome = Some(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::remote_track;

    fn track(id: &str) -> RemoteTrack {
        remote_track(id, "Yesterday", &["The Beatles"], "Help!", None)
    }

    #[test]
    fn test_resume_after_save_keeps_input_and_shows_status() {
        let mut saved = RatingKeyState::new(track("sp1"));
        saved.input = "12".into();
        saved.finish(PrematchAction::Save);

        let state = RatingKeyState::resume(Some(saved), track("sp1"));
        assert_eq!(state.input, "12");
        assert_eq!(state.outcome, None);
        assert_eq!(state.status_message.as_deref(), Some(SAVED_MESSAGE));
    }

    #[test]
    fn test_resume_for_other_track_starts_fresh() {
        let mut saved = RatingKeyState::new(track("sp1"));
        saved.input = "12".into();

        let state = RatingKeyState::resume(Some(saved), track("sp2"));
        assert!(state.input.is_empty());
        assert_eq!(state.status_message, None);
    }
}
