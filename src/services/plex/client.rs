use color_eyre::eyre::Result;
use reqwest::Client;
use tokio::sync::OnceCell;
use url::Url;

use crate::plex_rs::playlist::{
    PlexPlaylist, add_items_to_playlist, clear_playlist, create_music_playlist,
    edit_playlist_summary, get_machine_identifier, get_playlists, is_music_playlist,
    library_items_uri, upload_playlist_poster,
};
use crate::plex_rs::track::{PlexTrack, get_track, search_tracks};
use crate::ports::plex::PlexClient;

/// Production implementation of [`PlexClient`] bound to one server and one user token.
pub struct PlexHttpAdapter {
    client: Client,
    server_url: Url,
    token: String,
    machine_identifier: OnceCell<String>,
}

impl PlexHttpAdapter {
    pub fn new(client: Client, server_url: Url, token: String) -> Self {
        Self {
            client,
            server_url,
            token,
            machine_identifier: OnceCell::new(),
        }
    }

    async fn machine_identifier(&self) -> Result<&str> {
        let id = self
            .machine_identifier
            .get_or_try_init(|| get_machine_identifier(&self.client, &self.server_url, &self.token))
            .await?;
        Ok(id.as_str())
    }
}

#[async_trait::async_trait]
impl PlexClient for PlexHttpAdapter {
    async fn search_tracks(&self, title: &str) -> Result<Vec<PlexTrack>> {
        search_tracks(&self.client, &self.server_url, &self.token, title).await
    }

    async fn fetch_track(&self, rating_key: &str) -> Result<Option<PlexTrack>> {
        get_track(&self.client, &self.server_url, &self.token, rating_key).await
    }

    async fn find_playlist(&self, title: &str) -> Result<Option<PlexPlaylist>> {
        let playlists = get_playlists(&self.client, &self.server_url, &self.token).await?;
        Ok(playlists
            .into_iter()
            .find(|p| is_music_playlist(p) && p.title == title))
    }

    async fn create_playlist(&self, title: &str, rating_keys: &[String]) -> Result<PlexPlaylist> {
        let uri = if rating_keys.is_empty() {
            None
        } else {
            Some(library_items_uri(self.machine_identifier().await?, rating_keys))
        };

        create_music_playlist(
            &self.client,
            &self.server_url,
            &self.token,
            title,
            uri.as_deref(),
        )
        .await
    }

    async fn replace_playlist_items(
        &self,
        playlist_id: &str,
        rating_keys: &[String],
    ) -> Result<()> {
        // Resolve the uri first, a failed identity lookup must leave the playlist untouched
        let uri = if rating_keys.is_empty() {
            None
        } else {
            Some(library_items_uri(self.machine_identifier().await?, rating_keys))
        };

        clear_playlist(&self.client, &self.server_url, &self.token, playlist_id).await?;
        match uri {
            Some(uri) => {
                add_items_to_playlist(&self.client, &self.server_url, &self.token, playlist_id, &uri)
                    .await
            }
            None => Ok(()),
        }
    }

    async fn set_playlist_summary(&self, playlist_id: &str, summary: &str) -> Result<()> {
        edit_playlist_summary(
            &self.client,
            &self.server_url,
            &self.token,
            playlist_id,
            summary,
        )
        .await
    }

    async fn set_playlist_poster(&self, playlist_id: &str, poster_url: &str) -> Result<()> {
        upload_playlist_poster(
            &self.client,
            &self.server_url,
            &self.token,
            playlist_id,
            poster_url,
        )
        .await
    }
}
