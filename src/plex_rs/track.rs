use color_eyre::eyre::{Result, WrapErr};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::matching::Candidate;
use crate::plex_rs::PlexResponse;

/// A music track (`type=10`) from the Plex library.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlexTrack {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,

    pub title: String,

    #[serde(rename = "grandparentTitle", default)]
    pub artist: Option<String>,

    #[serde(rename = "parentTitle", default)]
    pub album: Option<String>,

    #[serde(rename = "index", default)]
    pub track_number: Option<u32>,

    /// Milliseconds.
    #[serde(default)]
    pub duration: Option<u64>,

    #[serde(rename = "Media", default)]
    pub media: Vec<PlexMedia>,
}

/// Media element containing Part information with file paths
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlexMedia {
    #[serde(rename = "audioChannels", default)]
    pub audio_channels: Option<u32>,

    #[serde(rename = "Part", default)]
    pub parts: Vec<PlexPart>,
}

/// Part element containing the actual file path
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlexPart {
    /// Absolute path to the media file on disk
    pub file: String,
}

impl PlexTrack {
    /// File path of the first media part, if Plex reported one.
    pub fn file_path(&self) -> Option<&str> {
        self.media
            .first()
            .and_then(|media| media.parts.first())
            .map(|part| part.file.as_str())
    }
}

impl Candidate for PlexTrack {
    fn title(&self) -> &str {
        &self.title
    }

    fn primary_artist(&self) -> &str {
        self.artist.as_deref().unwrap_or_default()
    }

    fn album(&self) -> &str {
        self.album.as_deref().unwrap_or_default()
    }

    fn duration_ms(&self) -> Option<u64> {
        self.duration
    }
}

/// Search the whole library for tracks by title.
///
/// Endpoint
/// - `GET /library/all?type=10&title={title}`
///
/// Plex matches `title` as a case-insensitive substring.
pub async fn search_tracks(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    title: &str,
) -> Result<Vec<PlexTrack>> {
    let mut url = base_url.join("library/all")?;
    url.query_pairs_mut()
        .append_pair("type", "10")
        .append_pair("title", title);

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexResponse<PlexTrack>>()
        .await
        .wrap_err("Failed to deserialize track search response")?;

    Ok(res.media_container.metadata)
}

/// Fetch a single item by rating key.
///
/// Endpoint
/// - `GET /library/metadata/{rating_key}`
///
/// Returns `None` on 404, which is how Plex reports a deleted item.
pub async fn get_track(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    rating_key: &str,
) -> Result<Option<PlexTrack>> {
    let url = base_url.join(&format!("library/metadata/{}", rating_key))?;

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    let res = response
        .error_for_status()?
        .json::<PlexResponse<PlexTrack>>()
        .await
        .wrap_err("Failed to deserialize library metadata response")?;

    Ok(res.media_container.metadata.into_iter().next())
}
