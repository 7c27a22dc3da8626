use color_eyre::eyre::{OptionExt, Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::plex_rs::PlexResponse;

/* ---------- Identity (machineIdentifier) ---------- */

#[derive(Debug, Clone, Deserialize)]
struct PlexIdentityResponse {
    #[serde(rename = "MediaContainer")]
    media_container: PlexIdentity,
}

#[derive(Debug, Clone, Deserialize)]
struct PlexIdentity {
    #[serde(rename = "machineIdentifier")]
    machine_identifier: String,
}

/// Endpoint
/// - `GET /identity`
pub async fn get_machine_identifier(
    client: &Client,
    base_url: &Url,
    user_token: &str,
) -> Result<String> {
    let url = base_url.join("identity")?;

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexIdentityResponse>()
        .await
        .wrap_err("Failed to deserialize Plex identity response")?;

    Ok(res.media_container.machine_identifier)
}

/// Library uri Plex expects when adding items to a playlist.
///
/// Several rating keys are joined with commas into one uri.
pub fn library_items_uri(machine_identifier: &str, rating_keys: &[String]) -> String {
    format!(
        "server://{}/com.plexapp.plugins.library/library/metadata/{}",
        machine_identifier,
        rating_keys.join(",")
    )
}

/* ---------- Playlists ---------- */

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlexPlaylist {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,

    pub title: String,

    #[serde(rename = "playlistType")]
    pub playlist_type: String,

    #[serde(default)]
    pub smart: Option<bool>,

    #[serde(rename = "leafCount", default)]
    pub leaf_count: Option<u32>,

    #[serde(default)]
    pub summary: Option<String>,
}

/// Endpoint
/// - `GET /playlists?playlistType=audio`
pub async fn get_playlists(
    client: &Client,
    base_url: &Url,
    user_token: &str,
) -> Result<Vec<PlexPlaylist>> {
    let mut url = base_url.join("playlists")?;
    url.query_pairs_mut().append_pair("playlistType", "audio");

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexResponse<PlexPlaylist>>()
        .await
        .wrap_err("Failed to deserialize Plex playlists response")?;

    Ok(res.media_container.metadata)
}

/* ---------- Create playlist ---------- */

/// Create an audio playlist. When `items_uri` is given the playlist starts with those items.
///
/// Endpoint
/// - `POST /playlists?title=..&type=audio&smart=0[&uri=..]`
pub async fn create_music_playlist(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    title: &str,
    items_uri: Option<&str>,
) -> Result<PlexPlaylist> {
    let mut url = base_url.join("playlists")?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("title", title)
            .append_pair("type", "audio")
            .append_pair("smart", "0");
        if let Some(uri) = items_uri {
            query.append_pair("uri", uri);
        }
    }

    let res = client
        .post(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexResponse<PlexPlaylist>>()
        .await
        .wrap_err("Failed to deserialize create playlist response")?;

    res.media_container
        .metadata
        .into_iter()
        .next()
        .ok_or_eyre("Create playlist response had no Metadata")
}

/* ---------- Items ---------- */

/// Endpoint
/// - `PUT /playlists/{id}/items?uri=..`
pub async fn add_items_to_playlist(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    playlist_id: &str,
    items_uri: &str,
) -> Result<()> {
    let mut url = base_url.join(&format!("playlists/{}/items", playlist_id))?;
    url.query_pairs_mut().append_pair("uri", items_uri);

    client
        .put(url)
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()
        .wrap_err("Failed to add items to playlist")?;

    Ok(())
}

/// Endpoint
/// - `DELETE /playlists/{id}/items`
pub async fn clear_playlist(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    playlist_id: &str,
) -> Result<()> {
    let url = base_url.join(&format!("playlists/{}/items", playlist_id))?;

    client
        .delete(url)
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()
        .wrap_err("Failed to clear playlist")?;

    Ok(())
}

/* ---------- Metadata ---------- */

/// Endpoint
/// - `PUT /playlists/{id}?summary=..`
pub async fn edit_playlist_summary(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    playlist_id: &str,
    summary: &str,
) -> Result<()> {
    let mut url = base_url.join(&format!("playlists/{}", playlist_id))?;
    url.query_pairs_mut().append_pair("summary", summary);

    client
        .put(url)
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()
        .wrap_err("Failed to edit playlist summary")?;

    Ok(())
}

/// Plex downloads the image itself.
///
/// Endpoint
/// - `POST /library/metadata/{id}/posters?url=..`
pub async fn upload_playlist_poster(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    playlist_id: &str,
    poster_url: &str,
) -> Result<()> {
    let mut url = base_url.join(&format!("library/metadata/{}/posters", playlist_id))?;
    url.query_pairs_mut().append_pair("url", poster_url);

    client
        .post(url)
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()
        .wrap_err("Failed to upload playlist poster")?;

    Ok(())
}

pub fn is_music_playlist(p: &PlexPlaylist) -> bool {
    p.playlist_type == "audio"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_items_uri_joins_keys() {
        let uri = library_items_uri("abc123", &["1".to_string(), "22".to_string()]);
        assert_eq!(
            uri,
            "server://abc123/com.plexapp.plugins.library/library/metadata/1,22"
        );
    }

    #[test]
    fn test_deserialize_identity() {
        let json = r#"{"MediaContainer": {"size": 0, "machineIdentifier": "abc123", "version": "1.40"}}"#;
        let identity: PlexIdentityResponse = serde_json::from_str(json).unwrap();
        assert_eq!(identity.media_container.machine_identifier, "abc123");
    }

    #[test]
    fn test_deserialize_playlists() {
        let json = r#"{
            "MediaContainer": {
                "size": 2,
                "Metadata": [
                    {"ratingKey": "10", "title": "Road Trip", "playlistType": "audio", "smart": false, "leafCount": 12},
                    {"ratingKey": "11", "title": "Movies", "playlistType": "video"}
                ]
            }
        }"#;
        let res: PlexResponse<PlexPlaylist> = serde_json::from_str(json).unwrap();
        let playlists = res.media_container.metadata;

        assert_eq!(playlists.len(), 2);
        assert!(is_music_playlist(&playlists[0]));
        assert!(!is_music_playlist(&playlists[1]));
        assert_eq!(playlists[0].leaf_count, Some(12));
    }
}
