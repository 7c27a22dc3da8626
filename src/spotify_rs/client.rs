use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::ports::spotify::RemoteTrack;
use crate::spotify_rs::auth::AppToken;
use crate::spotify_rs::types::{SpotifyPage, SpotifyPlaylist, SpotifyPlaylistItem};

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const PAGE_SIZE: u32 = 100;

/// Spotify API client
pub struct SpotifyWebClient {
    token: AppToken,
    client: reqwest::Client,
}

impl SpotifyWebClient {
    pub fn new(client: reqwest::Client, token: AppToken) -> Self {
        Self { token, client }
    }

    async fn send_authorized(&self, url: &str) -> Result<reqwest::Response> {
        let access_token = self.token.access_token().await?;
        Ok(self
            .client
            .get(url)
            .bearer_auth(access_token)
            .timeout(Duration::from_secs(10))
            .send()
            .await?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut response = self.send_authorized(url).await?;
        // Tokens can be revoked before they expire, retry once with a new one
        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Spotify rejected the app token, requesting a new one");
            self.token.invalidate().await;
            response = self.send_authorized(url).await?;
        }

        Ok(response.error_for_status()?.json().await?)
    }

    /// Get playlist name, description and images
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<SpotifyPlaylist> {
        let url = format!(
            "{}/playlists/{}?fields=id,name,description,images",
            SPOTIFY_API_URL, playlist_id
        );
        self.get_json(&url)
            .await
            .wrap_err_with(|| format!("Failed to fetch Spotify playlist {}", playlist_id))
    }

    /// Get all well-formed tracks in a playlist, in playlist order.
    ///
    /// The first page must succeed. A later page failing ends paging and the
    /// tracks fetched so far are returned.
    pub async fn get_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<RemoteTrack>> {
        let mut all_tracks = Vec::new();
        let mut next_url = Some(format!(
            "{}/playlists/{}/tracks?limit={}",
            SPOTIFY_API_URL, playlist_id, PAGE_SIZE
        ));
        let mut first_page = true;

        while let Some(url) = next_url {
            let page: SpotifyPage<SpotifyPlaylistItem> = match self.get_json(&url).await {
                Ok(page) => page,
                Err(e) if first_page => {
                    return Err(e).wrap_err_with(|| {
                        format!("Failed to fetch tracks of Spotify playlist {}", playlist_id)
                    });
                }
                Err(e) => {
                    warn!(
                        playlist_id,
                        fetched = all_tracks.len(),
                        "Spotify paging failed, track list is truncated: {:#}",
                        e
                    );
                    break;
                }
            };

            debug!(
                playlist_id,
                items = page.items.len(),
                total = ?page.total,
                "Fetched Spotify playlist page"
            );
            collect_items(page.items, &mut all_tracks);
            next_url = page.next;
            first_page = false;
        }

        Ok(all_tracks)
    }
}

/// Convert a page of playlist items, skipping empty and malformed ones.
fn collect_items(items: Vec<SpotifyPlaylistItem>, tracks: &mut Vec<RemoteTrack>) {
    for item in items {
        let Some(track) = item.track else {
            warn!("Skipping playlist item without a track");
            continue;
        };

        match RemoteTrack::try_from(track) {
            Ok(remote) => tracks.push(remote),
            Err(e) => warn!("Skipping malformed Spotify track: {}", e),
        }
    }
}
