use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::match_cache::{MatchCache, Matches};
use crate::matching::{self, DEFAULT_THRESHOLD};
use crate::plex_rs::track::PlexTrack;
use crate::ports::operator::{Operator, ScoredTrack, Selection};
use crate::ports::plex::PlexClient;
use crate::ports::spotify::{RemoteTrack, SpotifyApiPlaylist, SpotifyClient};
use crate::services::report;

/// Driver settings, built once from the config.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub threshold: f64,
    /// Upper bound for resolving a cached rating key.
    pub fetch_timeout: Duration,
    /// Flush the cache after every manual choice, not only at the end of a pass.
    pub save_after_manual: bool,
    /// Where JSON reports go. `None` disables them.
    pub report_dir: Option<PathBuf>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            fetch_timeout: Duration::from_secs(10),
            save_after_manual: true,
            report_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Cached,
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchedTrack {
    pub remote: RemoteTrack,
    pub plex: PlexTrack,
    pub source: MatchSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistStatus {
    Synced,
    /// Matching finished but the Plex playlist could not be updated.
    Failed,
    /// The operator stopped the run. The Plex playlist was left alone.
    Aborted,
}

#[derive(Debug, Clone)]
pub struct PlaylistSyncResult {
    pub playlist: SpotifyApiPlaylist,
    pub user: String,
    pub matched: Vec<MatchedTrack>,
    pub unmatched: Vec<RemoteTrack>,
    pub status: PlaylistStatus,
}

impl PlaylistSyncResult {
    /// Matched rating keys in playlist order, each key once.
    pub fn rating_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(self.matched.len());
        for m in &self.matched {
            if !keys.contains(&m.plex.rating_key) {
                keys.push(m.plex.rating_key.clone());
            }
        }
        keys
    }
}

enum Resolution {
    Matched(MatchedTrack),
    Unmatched,
    Abort,
}

/// Syncs Spotify playlists onto Plex playlists for one Plex user at a time.
pub struct SyncService<S: SpotifyClient, O: Operator> {
    spotify: S,
    operator: O,
    cache: MatchCache,
    options: SyncOptions,
}

impl<S: SpotifyClient, O: Operator> SyncService<S, O> {
    pub fn new(spotify: S, operator: O, cache: MatchCache, options: SyncOptions) -> Self {
        Self {
            spotify,
            operator,
            cache,
            options,
        }
    }

    /// One sync pass: match every remote track, flush the cache, write the
    /// report, then reconcile the Plex playlist unless the operator aborted.
    ///
    /// Only a failure to read the Spotify playlist is returned as an error.
    #[instrument(skip(self, plex, matches))]
    pub async fn sync_playlist<P: PlexClient>(
        &self,
        plex: &P,
        user: &str,
        playlist_id: &str,
        matches: &mut Matches,
    ) -> Result<PlaylistSyncResult> {
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

        info!(
            playlist = %playlist.name,
            tracks = tracks.len(),
            "Starting sync"
        );
        self.operator.show_playlist(&playlist);

        let mut result = PlaylistSyncResult {
            playlist,
            user: user.to_string(),
            matched: Vec::new(),
            unmatched: Vec::new(),
            status: PlaylistStatus::Synced,
        };

        let total = tracks.len();
        let mut remaining = tracks.into_iter().enumerate();
        for (idx, remote) in remaining.by_ref() {
            info!(
                "{}/{} Matching '{}' by {}",
                idx + 1,
                total,
                remote.title,
                remote.primary_artist()
            );

            match self.resolve_track(plex, &remote, matches).await {
                Resolution::Matched(matched) => {
                    info!(
                        rating_key = %matched.plex.rating_key,
                        source = ?matched.source,
                        "Matched '{}' by {}",
                        remote.title,
                        remote.artists.join(" & ")
                    );
                    result.matched.push(matched);
                }
                Resolution::Unmatched => {
                    info!(
                        "Could not match '{}' by {}",
                        remote.title,
                        remote.artists.join(" & ")
                    );
                    result.unmatched.push(remote);
                }
                Resolution::Abort => {
                    warn!("Run aborted by operator at track {}/{}", idx + 1, total);
                    result.status = PlaylistStatus::Aborted;
                    break;
                }
            }
        }
        debug!(skipped = remaining.count(), "Finished matching");

        self.flush(matches);

        if result.status == PlaylistStatus::Aborted {
            info!(playlist = %result.playlist.name, "Skipping Plex playlist update after abort");
        } else if let Err(e) = self.reconcile(plex, &result).await {
            error!(playlist = %result.playlist.name, "Failed to update Plex playlist: {:#}", e);
            result.status = PlaylistStatus::Failed;
        }

        self.write_report(&result);

        info!(
            playlist = %result.playlist.name,
            matched = result.matched.len(),
            unmatched = result.unmatched.len(),
            status = ?result.status,
            "Finished sync"
        );
        Ok(result)
    }

    async fn resolve_track<P: PlexClient>(
        &self,
        plex: &P,
        remote: &RemoteTrack,
        matches: &mut Matches,
    ) -> Resolution {
        if let Some(rating_key) = matches.lookup(&remote.id) {
            if let Some(track) = self.fetch_cached(plex, rating_key).await {
                return Resolution::Matched(MatchedTrack {
                    remote: remote.clone(),
                    plex: track,
                    source: MatchSource::Cached,
                });
            }
            // Stale entries stay in the cache until a new match overwrites them
            debug!(rating_key, "Cached match did not resolve, matching again");
        }

        let candidates = match plex.search_tracks(&remote.title).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Plex search for '{}' failed: {:#}", remote.title, e);
                Vec::new()
            }
        };
        info!(
            "Found {} potential matches for '{}'",
            candidates.len(),
            remote.title
        );

        if let Some(track) = matching::match_one(&candidates, remote, self.options.threshold) {
            matches.record(remote.id.clone(), track.rating_key.clone());
            return Resolution::Matched(MatchedTrack {
                remote: remote.clone(),
                plex: track.clone(),
                source: MatchSource::Automatic,
            });
        }

        let ranked: Vec<ScoredTrack> = matching::rank(&candidates, remote)
            .into_iter()
            .map(|r| ScoredTrack {
                track: r.candidate.clone(),
                score: r.score,
            })
            .collect();
        if ranked.is_empty() {
            return Resolution::Unmatched;
        }

        match self.operator.request_manual_resolution(remote, &ranked) {
            Selection::Chosen(index) => {
                let Some(chosen) = ranked.into_iter().nth(index) else {
                    warn!(index, "Operator chose a candidate that was not offered");
                    return Resolution::Unmatched;
                };
                matches.record(remote.id.clone(), chosen.track.rating_key.clone());
                if self.options.save_after_manual {
                    self.flush(matches);
                }
                Resolution::Matched(MatchedTrack {
                    remote: remote.clone(),
                    plex: chosen.track,
                    source: MatchSource::Manual,
                })
            }
            Selection::Skip => Resolution::Unmatched,
            Selection::Abort => Resolution::Abort,
        }
    }

    /// Resolve a cached rating key, bounded by the fetch timeout. Any failure is a miss.
    async fn fetch_cached<P: PlexClient>(&self, plex: &P, rating_key: &str) -> Option<PlexTrack> {
        match tokio::time::timeout(self.options.fetch_timeout, plex.fetch_track(rating_key)).await
        {
            Ok(Ok(Some(track))) => Some(track),
            Ok(Ok(None)) => {
                warn!(rating_key, "Previously matched track no longer exists in Plex");
                None
            }
            Ok(Err(e)) => {
                error!(rating_key, "Error fetching previously matched track: {:#}", e);
                None
            }
            Err(_) => {
                error!(
                    rating_key,
                    timeout = ?self.options.fetch_timeout,
                    "Timed out fetching previously matched track"
                );
                None
            }
        }
    }

    async fn reconcile<P: PlexClient>(&self, plex: &P, result: &PlaylistSyncResult) -> Result<()> {
        let title = &result.playlist.name;
        let rating_keys = result.rating_keys();

        let playlist = match plex.find_playlist(title).await? {
            Some(existing) => {
                info!(playlist = %title, "Replacing items of existing Plex playlist");
                plex.replace_playlist_items(&existing.rating_key, &rating_keys)
                    .await?;
                existing
            }
            None if rating_keys.is_empty() => {
                info!(playlist = %title, "Nothing matched, not creating an empty Plex playlist");
                return Ok(());
            }
            None => {
                info!(playlist = %title, "Creating Plex playlist");
                plex.create_playlist(title, &rating_keys).await?
            }
        };

        if let Some(summary) = &result.playlist.description {
            plex.set_playlist_summary(&playlist.rating_key, summary)
                .await?;
        }
        if let Some(cover_url) = &result.playlist.cover_url {
            plex.set_playlist_poster(&playlist.rating_key, cover_url)
                .await?;
        }

        Ok(())
    }

    fn flush(&self, matches: &Matches) {
        if let Err(e) = self.cache.save(matches) {
            error!("{}", e);
        }
    }

    fn write_report(&self, result: &PlaylistSyncResult) {
        let Some(dir) = &self.options.report_dir else {
            return;
        };
        match report::write_report(dir, result, chrono::Local::now()) {
            Ok(path) => info!(path = %path.display(), "Wrote sync report"),
            Err(e) => warn!("Failed to write sync report: {:#}", e),
        }
    }
}
