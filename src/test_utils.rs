use crate::plex_rs::track::PlexTrack;
use crate::ports::spotify::{RemoteTrack, SpotifyApiPlaylist};

pub fn plex_track(
    rating_key: &str,
    title: &str,
    artist: &str,
    album: &str,
    duration: Option<u64>,
) -> PlexTrack {
    PlexTrack {
        rating_key: rating_key.to_string(),
        title: title.to_string(),
        artist: Some(artist.to_string()),
        album: Some(album.to_string()),
        duration,
        ..Default::default()
    }
}

pub fn remote_track(
    id: &str,
    title: &str,
    artists: &[&str],
    album: &str,
    duration_ms: Option<u64>,
) -> RemoteTrack {
    RemoteTrack {
        id: id.to_string(),
        title: title.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        album: album.to_string(),
        duration_ms,
        external_url: Some(format!("https://open.spotify.com/track/{}", id)),
        ..Default::default()
    }
}

pub fn remote_playlist(id: &str, name: &str) -> SpotifyApiPlaylist {
    SpotifyApiPlaylist {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        cover_url: None,
    }
}
