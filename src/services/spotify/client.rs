use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;

use crate::ports::spotify::{RemoteTrack, SpotifyApiPlaylist, SpotifyClient};
use crate::spotify_rs::auth::{AppToken, ClientCredentials};
use crate::spotify_rs::client::SpotifyWebClient;

#[derive(Debug, Clone)]
pub struct SpotifyApiCredentials {
    client_id: String,
    client_secret: String,
}

impl SpotifyApiCredentials {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }
}

/// Production implementation of [`SpotifyClient`] on top of the Web API.
pub struct SpotifyHttpAdapter {
    client: SpotifyWebClient,
}

impl SpotifyHttpAdapter {
    /// Authenticate with the client-credentials flow. The app token is
    /// renewed on demand for the rest of the run.
    pub async fn connect(credentials: &SpotifyApiCredentials) -> Result<Self> {
        let http = Client::new();
        let token = AppToken::new(ClientCredentials::new(
            http.clone(),
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
        ));
        // Fail early on bad credentials
        token
            .access_token()
            .await
            .wrap_err("Failed to authenticate with Spotify")?;

        Ok(Self {
            client: SpotifyWebClient::new(http, token),
        })
    }
}

#[async_trait::async_trait]
impl SpotifyClient for SpotifyHttpAdapter {
    async fn playlist(&self, playlist_id: &str) -> Result<SpotifyApiPlaylist> {
        let playlist = self.client.get_playlist(playlist_id).await?;
        let cover_url = playlist.cover_url().map(str::to_string);

        Ok(SpotifyApiPlaylist {
            id: playlist.id,
            name: playlist.name,
            description: playlist.description.filter(|d| !d.trim().is_empty()),
            cover_url,
        })
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<RemoteTrack>> {
        self.client.get_playlist_tracks(playlist_id).await
    }
}
