use color_eyre::eyre::Result;

use crate::plex_rs::playlist::PlexPlaylist;
use crate::plex_rs::track::PlexTrack;

/// Port trait wrapping the Plex API capabilities used by business logic.
///
/// Implementations live in `services::plex::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlexClient: Send + Sync {
    /// Library tracks whose title matches `title`.
    async fn search_tracks(&self, title: &str) -> Result<Vec<PlexTrack>>;

    /// A track by rating key, `None` when the item no longer exists.
    async fn fetch_track(&self, rating_key: &str) -> Result<Option<PlexTrack>>;

    /// The audio playlist titled `title`, if any.
    async fn find_playlist(&self, title: &str) -> Result<Option<PlexPlaylist>>;

    async fn create_playlist(&self, title: &str, rating_keys: &[String]) -> Result<PlexPlaylist>;

    async fn replace_playlist_items(&self, playlist_id: &str, rating_keys: &[String])
    -> Result<()>;

    async fn set_playlist_summary(&self, playlist_id: &str, summary: &str) -> Result<()>;

    async fn set_playlist_poster(&self, playlist_id: &str, poster_url: &str) -> Result<()>;
}
