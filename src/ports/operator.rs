use crate::plex_rs::track::PlexTrack;
use crate::ports::spotify::{RemoteTrack, SpotifyApiPlaylist};

/// A ranked library track offered to the operator.
#[derive(Debug, Clone)]
pub struct ScoredTrack {
    pub track: PlexTrack,
    pub score: f64,
}

/// Operator answer to a manual match request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Index into the offered candidates.
    Chosen(usize),
    /// Leave this track unmatched and move on.
    Skip,
    /// Stop the run. Remaining tracks are not processed.
    Abort,
}

/// Operator answer in the pre-match tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrematchAction {
    /// Rating key typed by the operator, unvalidated.
    Submit(String),
    Skip,
    /// Flush the cache and ask about the same track again.
    Save,
    /// Flush the cache and stop the current playlist.
    SaveAndClose,
}

/// The human in the loop. Every call blocks until the operator answers.
///
/// Implementations live in `operator_tui` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
pub trait Operator {
    /// Show which playlist is being worked on.
    fn show_playlist(&self, playlist: &SpotifyApiPlaylist);

    /// Choose one of `candidates` for `remote`, best first, or cancel.
    fn request_manual_resolution(&self, remote: &RemoteTrack, candidates: &[ScoredTrack])
    -> Selection;

    fn prompt_rating_key(&self, remote: &RemoteTrack) -> PrematchAction;
}
