//! Durable `remote id -> Plex rating key` store.
//!
//! The file is a flat JSON object. Rating keys are written as numbers when
//! they are numeric, and both numbers and strings are accepted on load.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to read match cache {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Match cache {path} is not a JSON object: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to write match cache {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to replace match cache {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// Confirmed matches. One rating key per remote id, later writes win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    entries: BTreeMap<String, String>,
}

impl Matches {
    pub fn lookup(&self, remote_id: &str) -> Option<&str> {
        self.entries.get(remote_id).map(String::as_str)
    }

    pub fn contains(&self, remote_id: &str) -> bool {
        self.entries.contains_key(remote_id)
    }

    /// Returns the rating key previously stored for `remote_id`.
    /// An empty rating key is ignored and leaves the existing entry as is.
    pub fn record(
        &mut self,
        remote_id: impl Into<String>,
        rating_key: impl Into<String>,
    ) -> Option<String> {
        let (remote_id, rating_key) = (remote_id.into(), rating_key.into());
        if rating_key.is_empty() {
            warn!(remote_id = %remote_id, "Ignoring empty rating key");
            return None;
        }
        self.entries.insert(remote_id, rating_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Matches {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .filter(|(_, rating_key)| !rating_key.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchCache {
    path: PathBuf,
}

impl MatchCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache, falling back to an empty one when the file is missing or unreadable.
    pub fn load(&self) -> Matches {
        match self.try_load() {
            Ok(matches) => {
                debug!(path = %self.path.display(), entries = matches.len(), "Loaded match cache");
                matches
            }
            Err(CacheError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!(path = %self.path.display(), "No match cache yet, starting empty");
                Matches::default()
            }
            Err(e) => {
                warn!("{}, starting with an empty cache", e);
                Matches::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<Matches, CacheError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| CacheError::Read {
            path: self.path.clone(),
            source,
        })?;

        let raw: Map<String, Value> =
            serde_json::from_str(&contents).map_err(|source| CacheError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let mut matches = Matches::default();
        for (remote_id, value) in raw {
            match value {
                Value::String(key) => {
                    matches.record(remote_id, key);
                }
                Value::Number(key) => {
                    matches.record(remote_id, key.to_string());
                }
                other => warn!(remote_id = %remote_id, value = %other, "Ignoring unusable match cache entry"),
            }
        }

        Ok(matches)
    }

    /// Write the whole mapping. The file is replaced atomically.
    pub fn save(&self, matches: &Matches) -> Result<(), CacheError> {
        let write_err = |source: std::io::Error| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(write_err)?;

        let raw: Map<String, Value> = matches
            .iter()
            .map(|(remote_id, key)| (remote_id.to_string(), rating_key_value(key)))
            .collect();

        let mut file = NamedTempFile::new_in(parent).map_err(write_err)?;
        serde_json::to_writer_pretty(&mut file, &raw).map_err(|e| write_err(e.into()))?;
        file.flush().map_err(write_err)?;
        file.persist(&self.path)
            .map_err(|source| CacheError::Persist {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), entries = matches.len(), "Saved match cache");
        Ok(())
    }
}

fn rating_key_value(key: &str) -> Value {
    match key.parse::<u64>() {
        Ok(n) if n.to_string() == key => Value::from(n),
        _ => Value::from(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matches {
        [
            ("3BQHpFgAp4l80e1XslIjNI".to_string(), "4521".to_string()),
            ("6dGnYIeXmHdcikdzNNDMm2".to_string(), "88".to_string()),
            ("0aym2LBJBk9DAYuHHutrIl".to_string(), "custom-key".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchCache::new(dir.path().join("matched_tracks.json"));

        cache.save(&sample()).unwrap();

        assert_eq!(cache.load(), sample());
    }

    #[test]
    fn test_numeric_keys_are_written_as_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchCache::new(dir.path().join("matched_tracks.json"));
        cache.save(&sample()).unwrap();

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(raw["3BQHpFgAp4l80e1XslIjNI"], Value::from(4521u64));
        assert_eq!(raw["0aym2LBJBk9DAYuHHutrIl"], Value::from("custom-key"));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchCache::new(dir.path().join("nope.json"));
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matched_tracks.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = MatchCache::new(&path);
        assert!(matches!(cache.try_load(), Err(CacheError::Parse { .. })));
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_unusable_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matched_tracks.json");
        std::fs::write(&path, r#"{"a": 1, "b": "2", "c": null, "d": [3], "e": ""}"#).unwrap();

        let matches = MatchCache::new(&path).load();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches.lookup("a"), Some("1"));
        assert_eq!(matches.lookup("b"), Some("2"));
        assert_eq!(matches.lookup("c"), None);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchCache::new(dir.path().join("nested/deeper/matched_tracks.json"));

        cache.save(&sample()).unwrap();

        assert_eq!(cache.load().len(), 3);
    }

    #[test]
    fn test_record_overwrites_previous_key() {
        let mut matches = Matches::default();
        assert_eq!(matches.record("a", "1"), None);
        assert_eq!(matches.record("a", "2"), Some("1".to_string()));
        assert_eq!(matches.lookup("a"), Some("2"));
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_empty_rating_key_is_never_stored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchCache::new(dir.path().join("matched_tracks.json"));
        let mut matches = Matches::default();
        matches.record("a", "1");

        assert_eq!(matches.record("a", ""), None);
        assert_eq!(matches.record("b", ""), None);
        let collected: Matches = [("c".to_string(), String::new())].into_iter().collect();
        assert!(collected.is_empty());

        cache.save(&matches).unwrap();
        assert_eq!(cache.load(), matches);
        assert_eq!(matches.lookup("a"), Some("1"));
        assert!(!matches.contains("b"));
    }
}
