//! Minimal Spotify Web API client for reading public playlists.

pub mod auth;
pub mod client;
pub mod types;
