use color_eyre::eyre::{Result, WrapErr};
use tracing::{error, info, instrument, warn};

use crate::match_cache::{MatchCache, Matches};
use crate::ports::operator::{Operator, PrematchAction};
use crate::ports::spotify::SpotifyClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrematchSummary {
    pub recorded: usize,
    pub skipped: usize,
    pub already_matched: usize,
    /// The operator chose save-and-close before the end of the playlist.
    pub closed_early: bool,
}

/// Lets the operator type Plex rating keys for tracks that have no cached match yet.
pub struct PrematchService<S: SpotifyClient, O: Operator> {
    spotify: S,
    operator: O,
    cache: MatchCache,
}

impl<S: SpotifyClient, O: Operator> PrematchService<S, O> {
    pub fn new(spotify: S, operator: O, cache: MatchCache) -> Self {
        Self {
            spotify,
            operator,
            cache,
        }
    }

    #[instrument(skip(self, matches))]
    pub async fn prematch_playlist(
        &self,
        playlist_id: &str,
        matches: &mut Matches,
    ) -> Result<PrematchSummary> {
        let playlist = self
            .spotify
            .playlist(playlist_id)
            .await
            .wrap_err("Failed to fetch playlist from Spotify")?;
        let tracks = self
            .spotify
            .playlist_tracks(playlist_id)
            .await
            .wrap_err("Failed to fetch playlist tracks from Spotify")?;

        info!(playlist = %playlist.name, tracks = tracks.len(), "Pre-matching playlist");
        self.operator.show_playlist(&playlist);

        let mut summary = PrematchSummary::default();
        'tracks: for remote in &tracks {
            if matches.contains(&remote.id) {
                summary.already_matched += 1;
                continue;
            }

            loop {
                match self.operator.prompt_rating_key(remote) {
                    PrematchAction::Submit(input) => {
                        let input = input.trim();
                        if is_rating_key(input) {
                            matches.record(remote.id.clone(), input);
                            summary.recorded += 1;
                            info!(rating_key = input, "Recorded match for '{}'", remote.title);
                        } else {
                            warn!(input, "Invalid rating key for '{}', not recorded", remote.title);
                            summary.skipped += 1;
                        }
                        continue 'tracks;
                    }
                    PrematchAction::Skip => {
                        summary.skipped += 1;
                        continue 'tracks;
                    }
                    PrematchAction::Save => self.flush(matches),
                    PrematchAction::SaveAndClose => {
                        summary.closed_early = true;
                        break 'tracks;
                    }
                }
            }
        }

        self.flush(matches);
        info!(
            recorded = summary.recorded,
            skipped = summary.skipped,
            already_matched = summary.already_matched,
            "Finished pre-matching"
        );
        Ok(summary)
    }

    fn flush(&self, matches: &Matches) {
        if let Err(e) = self.cache.save(matches) {
            error!("{}", e);
        }
    }
}

/// Plex rating keys are positive integers.
fn is_rating_key(input: &str) -> bool {
    !input.is_empty() && input.chars().all(|c| c.is_ascii_digit())
}
