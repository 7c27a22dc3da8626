use color_eyre::eyre::Result;
use serde::Serialize;

/// Decoupled representation of a Spotify playlist from the API.
#[derive(Debug, Clone, Default)]
pub struct SpotifyApiPlaylist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
}

/// A playlist entry as fetched from Spotify. Immutable once fetched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemoteTrack {
    pub id: String,
    pub title: String,
    /// Ordered, the primary artist comes first. Never empty.
    pub artists: Vec<String>,
    pub album: String,
    pub duration_ms: Option<u64>,
    pub release_year: Option<String>,
    pub external_url: Option<String>,
    pub preview_url: Option<String>,
    pub cover_url: Option<String>,
}

impl RemoteTrack {
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or_default()
    }
}

/// Port trait wrapping the Spotify API capabilities used by business logic.
///
/// Implementations live in `services::spotify::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpotifyClient: Send + Sync {
    async fn playlist(&self, playlist_id: &str) -> Result<SpotifyApiPlaylist>;

    /// All well-formed tracks of the playlist, in playlist order.
    ///
    /// Paging stops at the first failed page, so the list may be truncated.
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<RemoteTrack>>;
}
