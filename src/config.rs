use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::matching::DEFAULT_THRESHOLD;
use crate::services::sync::SyncOptions;

const APP_DIR: &str = "plex-playlist-sync";

/// Written by `config create-default`.
pub const DEFAULT_CONFIG: &str = r#"# plex-playlist-sync configuration

[spotify]
# App credentials from https://developer.spotify.com/dashboard
client_id = "your-client-id"
client_secret = "your-client-secret"

[plex]
url = "http://localhost:32400"
# Token of the server owner, used when no --user is given
token = "your-plex-token"

# Additional Plex users to sync the same playlists for
# [[plex.users]]
# name = "alice"
# token = "alice-plex-token"

[playlists]
# Spotify playlist ids
ids = []

[matching]
# Minimum average similarity (0-100) to accept a match without asking
threshold = 80
# Seconds to wait for Plex when resolving a cached match
fetch_timeout_secs = 10
# Write the cache after every manual choice
save_after_manual = true

[paths]
# cache = "~/.local/share/plex-playlist-sync/matched_tracks.json"
# reports = "~/.local/share/plex-playlist-sync/reports"
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub plex: PlexConfig,
    #[serde(default)]
    pub playlists: PlaylistsConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    pub url: String,
    pub token: String,
    #[serde(default)]
    pub users: Vec<PlexUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexUser {
    pub name: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistsConfig {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub threshold: f64,
    pub fetch_timeout_secs: u64,
    pub save_after_manual: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            fetch_timeout_secs: 10,
            save_after_manual: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub cache: Option<String>,
    #[serde(default)]
    pub reports: Option<String>,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join(APP_DIR).join("config.toml"))
    }

    /// Write [`DEFAULT_CONFIG`] to `path`, refusing to overwrite an existing file.
    pub fn create_default(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists: {}", path.display());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, DEFAULT_CONFIG)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.matching.threshold) {
            bail!(
                "matching.threshold must be between 0 and 100, got {}",
                self.matching.threshold
            );
        }
        if self.matching.fetch_timeout_secs == 0 {
            bail!("matching.fetch_timeout_secs must be greater than 0");
        }
        let mut seen = HashSet::new();
        for user in &self.plex.users {
            if !seen.insert(user.name.as_str()) {
                bail!("Plex user {} is configured more than once", user.name);
            }
        }
        Ok(())
    }

    /// Token for the named Plex user, or the server token when `name` is `None`.
    pub fn user_token(&self, name: Option<&str>) -> Result<&str> {
        match name {
            None => Ok(&self.plex.token),
            Some(name) => self
                .plex
                .users
                .iter()
                .find(|u| u.name == name)
                .map(|u| u.token.as_str())
                .ok_or_else(|| eyre!("Unknown Plex user: {}", name)),
        }
    }

    /// Plex server url, always with a trailing slash so relative joins keep any base path.
    pub fn plex_url(&self) -> Result<Url> {
        let mut raw = self.plex.url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).wrap_err_with(|| format!("Invalid Plex url: {}", self.plex.url))
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        match &self.paths.cache {
            Some(path) => Ok(expand_path(path)),
            None => Ok(data_dir()?.join("matched_tracks.json")),
        }
    }

    pub fn reports_dir(&self) -> Result<PathBuf> {
        match &self.paths.reports {
            Some(path) => Ok(expand_path(path)),
            None => Ok(data_dir()?.join("reports")),
        }
    }

    /// Options handed to the sync driver.
    pub fn sync_options(&self) -> Result<SyncOptions> {
        Ok(SyncOptions {
            threshold: self.matching.threshold,
            fetch_timeout: Duration::from_secs(self.matching.fetch_timeout_secs),
            save_after_manual: self.matching.save_after_manual,
            report_dir: Some(self.reports_dir()?),
        })
    }
}

fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| eyre!("Could not determine the data directory"))
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [spotify]
        client_id = "id"
        client_secret = "secret"

        [plex]
        url = "http://nas:32400"
        token = "owner"
    "#;

    fn parse(toml_str: &str) -> Config {
        let config: Config = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse(MINIMAL);

        assert_eq!(config.matching.threshold, 80.0);
        assert_eq!(config.matching.fetch_timeout_secs, 10);
        assert!(config.matching.save_after_manual);
        assert!(config.playlists.ids.is_empty());
        assert!(config.plex.users.is_empty());
    }

    #[test]
    fn test_default_template_parses() {
        let config = parse(DEFAULT_CONFIG);
        assert_eq!(config.plex.url, "http://localhost:32400");
    }

    #[test]
    fn test_user_token_lookup() {
        let config = parse(&format!(
            "{MINIMAL}\n[[plex.users]]\nname = \"alice\"\ntoken = \"alice-token\"\n"
        ));

        assert_eq!(config.user_token(None).unwrap(), "owner");
        assert_eq!(config.user_token(Some("alice")).unwrap(), "alice-token");
        assert!(config.user_token(Some("bob")).is_err());
    }

    #[test]
    fn test_duplicate_users_are_rejected() {
        let toml_str = format!(
            "{MINIMAL}\n[[plex.users]]\nname = \"a\"\ntoken = \"1\"\n[[plex.users]]\nname = \"a\"\ntoken = \"2\"\n"
        );
        let config: Config = toml::from_str(&toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let config: Config =
            toml::from_str(&format!("{MINIMAL}\n[matching]\nthreshold = 120\n")).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_plex_url_keeps_base_path() {
        let mut config = parse(MINIMAL);
        config.plex.url = "https://example.com/plex".into();

        let url = config.plex_url().unwrap();
        assert_eq!(
            url.join("library/all").unwrap().as_str(),
            "https://example.com/plex/library/all"
        );
    }

    #[test]
    fn test_explicit_paths_are_expanded() {
        let mut config = parse(MINIMAL);
        config.paths.cache = Some("/tmp/cache.json".into());
        config.paths.reports = Some("~/reports".into());

        assert_eq!(config.cache_path().unwrap(), PathBuf::from("/tmp/cache.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.reports_dir().unwrap(), home.join("reports"));
        }
    }

    #[test]
    fn test_sync_options() {
        let mut config = parse(MINIMAL);
        config.matching.fetch_timeout_secs = 3;
        config.paths.reports = Some("/tmp/reports".into());

        let options = config.sync_options().unwrap();
        assert_eq!(options.fetch_timeout, Duration::from_secs(3));
        assert_eq!(options.report_dir, Some(PathBuf::from("/tmp/reports")));
    }

    #[test]
    fn test_create_default_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/config.toml");

        Config::create_default(&path).unwrap();
        assert!(Config::from_file(&path).is_ok());
        assert!(Config::create_default(&path).is_err());
    }
}
