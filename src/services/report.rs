use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;

use crate::ports::spotify::RemoteTrack;
use crate::services::sync::{MatchedTrack, PlaylistStatus, PlaylistSyncResult};

#[derive(Debug, Serialize)]
struct SyncReport<'a> {
    playlist_id: &'a str,
    playlist: &'a str,
    user: &'a str,
    generated_at: String,
    status: PlaylistStatus,
    matched: &'a [MatchedTrack],
    unmatched: &'a [RemoteTrack],
}

/// Write `<dir>/<user>/<playlist>_<timestamp>.json` and return its path.
pub fn write_report<Tz: TimeZone>(
    dir: &Path,
    result: &PlaylistSyncResult,
    now: DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    let user_dir = dir.join(file_name_safe(&result.user));
    std::fs::create_dir_all(&user_dir)
        .wrap_err_with(|| format!("Failed to create report directory {}", user_dir.display()))?;

    let path = user_dir.join(format!(
        "{}_{}.json",
        file_name_safe(&result.playlist.name),
        now.format("%Y%m%d_%H%M%S")
    ));

    let report = SyncReport {
        playlist_id: &result.playlist.id,
        playlist: &result.playlist.name,
        user: &result.user,
        generated_at: now.to_rfc3339(),
        status: result.status,
        matched: &result.matched,
        unmatched: &result.unmatched,
    };

    let json = serde_json::to_string_pretty(&report).wrap_err("Failed to serialize report")?;
    std::fs::write(&path, json)
        .wrap_err_with(|| format!("Failed to write report {}", path.display()))?;

    Ok(path)
}

/// Replace characters that are unsafe in file names on common filesystems.
fn file_name_safe(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
