//! Thin wrappers over the Plex Media Server HTTP API.
//!
//! Docs:
//! https://developer.plex.tv/pms/#section/API-Info/Authenticating-with-Plex

use serde::Deserialize;

pub mod playlist;
pub mod track;

/* ---------- Shared container ---------- */

/// A minimal Plex JSON envelope for list style endpoints that return `MediaContainer.Metadata`.
///
/// Notes
/// - Plex responses are wrapped in a top level `MediaContainer`.
/// - Many fields are optional or omitted depending on endpoint and server version.
/// - `metadata` defaults to an empty vec when missing.
#[derive(Debug, Clone, Deserialize)]
pub struct PlexResponse<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: PlexMediaContainer<T>,
}

/// The inner Plex MediaContainer payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PlexMediaContainer<T> {
    #[serde(rename = "Metadata", default = "Vec::new")]
    pub metadata: Vec<T>,
}
