use serde::Deserialize;

use crate::ports::spotify::RemoteTrack;

/// Spotify client-credentials token response
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

/// Spotify playlist from API
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<SpotifyImage>>,
}

impl SpotifyPlaylist {
    /// Spotify lists the largest image first.
    pub fn cover_url(&self) -> Option<&str> {
        self.images
            .as_deref()
            .and_then(|images| images.first())
            .map(|image| image.url.as_str())
    }
}

/// Spotify track from API.
///
/// Every field is optional so one odd item (local files, removed tracks,
/// podcast episodes) never fails a whole page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyTrack {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub album: Option<SpotifyAlbum>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub external_urls: Option<SpotifyExternalUrls>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyArtist {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

/// One entry of `GET /playlists/{id}/tracks`
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistItem {
    #[serde(default)]
    pub track: Option<SpotifyTrack>,
}

/// A paging object
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPage<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedTrack {
    #[error("track has no id")]
    MissingId,
    #[error("track {id} has no title")]
    MissingTitle { id: String },
    #[error("track {id} has no artist")]
    MissingArtist { id: String },
    #[error("track {id} has no album")]
    MissingAlbum { id: String },
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<SpotifyTrack> for RemoteTrack {
    type Error = MalformedTrack;

    fn try_from(track: SpotifyTrack) -> Result<Self, Self::Error> {
        let id = non_empty(track.id).ok_or(MalformedTrack::MissingId)?;
        let title = non_empty(track.name).ok_or_else(|| MalformedTrack::MissingTitle {
            id: id.clone(),
        })?;

        let artists: Vec<String> = track
            .artists
            .into_iter()
            .filter_map(|artist| non_empty(artist.name))
            .collect();
        if artists.is_empty() {
            return Err(MalformedTrack::MissingArtist { id });
        }

        let album = track.album.unwrap_or_default();
        let Some(album_title) = non_empty(album.name) else {
            return Err(MalformedTrack::MissingAlbum { id });
        };

        Ok(RemoteTrack {
            id,
            title,
            artists,
            album: album_title,
            duration_ms: track.duration_ms,
            release_year: album
                .release_date
                .and_then(|date| date.get(..4).map(str::to_string)),
            external_url: track.external_urls.and_then(|urls| urls.spotify),
            preview_url: track.preview_url,
            cover_url: album.images.into_iter().next().map(|image| image.url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM_JSON: &str = r#"{
        "track": {
            "id": "3BQHpFgAp4l80e1XslIjNI",
            "name": "Yesterday",
            "artists": [{"name": "The Beatles"}],
            "album": {
                "name": "Help!",
                "release_date": "1965-08-06",
                "images": [{"url": "https://i.scdn.co/image/help-640", "height": 640, "width": 640}]
            },
            "duration_ms": 125666,
            "external_urls": {"spotify": "https://open.spotify.com/track/3BQHpFgAp4l80e1XslIjNI"},
            "preview_url": null
        }
    }"#;

    #[test]
    fn test_well_formed_item_converts() {
        let item: SpotifyPlaylistItem = serde_json::from_str(ITEM_JSON).unwrap();
        let remote = RemoteTrack::try_from(item.track.unwrap()).unwrap();

        assert_eq!(remote.id, "3BQHpFgAp4l80e1XslIjNI");
        assert_eq!(remote.primary_artist(), "The Beatles");
        assert_eq!(remote.album, "Help!");
        assert_eq!(remote.duration_ms, Some(125666));
        assert_eq!(remote.release_year.as_deref(), Some("1965"));
        assert_eq!(
            remote.cover_url.as_deref(),
            Some("https://i.scdn.co/image/help-640")
        );
        assert_eq!(remote.preview_url, None);
    }

    #[test]
    fn test_null_track_item() {
        let item: SpotifyPlaylistItem = serde_json::from_str(r#"{"track": null}"#).unwrap();
        assert!(item.track.is_none());
    }

    #[test]
    fn test_local_file_without_id_is_malformed() {
        let track = SpotifyTrack {
            name: Some("Demo".into()),
            ..Default::default()
        };
        assert_eq!(
            RemoteTrack::try_from(track).unwrap_err(),
            MalformedTrack::MissingId
        );
    }

    #[test]
    fn test_blank_artists_are_malformed() {
        let track = SpotifyTrack {
            id: Some("x".into()),
            name: Some("Demo".into()),
            artists: vec![SpotifyArtist {
                name: Some("  ".into()),
            }],
            ..Default::default()
        };
        assert_eq!(
            RemoteTrack::try_from(track).unwrap_err(),
            MalformedTrack::MissingArtist { id: "x".into() }
        );
    }

    #[test]
    fn test_missing_album_is_malformed() {
        let track = SpotifyTrack {
            id: Some("x".into()),
            name: Some("Demo".into()),
            artists: vec![SpotifyArtist {
                name: Some("Someone".into()),
            }],
            ..Default::default()
        };
        assert!(matches!(
            RemoteTrack::try_from(track),
            Err(MalformedTrack::MissingAlbum { .. })
        ));
    }

    #[test]
    fn test_playlist_cover_url() {
        let json = r#"{"id": "p1", "name": "Mix", "description": "", "images": [{"url": "https://img/1"}]}"#;
        let playlist: SpotifyPlaylist = serde_json::from_str(json).unwrap();
        assert_eq!(playlist.cover_url(), Some("https://img/1"));

        let json = r#"{"id": "p1", "name": "Mix", "images": null}"#;
        let playlist: SpotifyPlaylist = serde_json::from_str(json).unwrap();
        assert_eq!(playlist.cover_url(), None);
    }
}
