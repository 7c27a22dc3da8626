mod config;
mod logging;
mod match_cache;
mod matching;
mod operator_tui;
mod plex_rs;
mod ports;
mod services;
mod spotify_rs;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{WrapErr, bail, eyre},
};
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    logging::init_tracing,
    match_cache::MatchCache,
    operator_tui::TerminalOperator,
    services::{
        plex::client::PlexHttpAdapter,
        prematch::PrematchService,
        spotify::client::{SpotifyApiCredentials, SpotifyHttpAdapter},
        sync::{PlaylistStatus, SyncService},
    },
};

/// Plex user label used for reports when syncing with the server token.
const OWNER: &str = "owner";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLEX_PLAYLIST_SYNC_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Console log level (default: off)
    #[arg(long, default_value = "off", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: String,

    /// Path to log file
    #[arg(long, env = "PLEX_PLAYLIST_SYNC_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// OTLP gRPC endpoint to export traces to
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync Spotify playlists to Plex
    Sync {
        /// Spotify playlist id, repeatable (default: [playlists] ids from the config)
        #[arg(short, long = "playlist")]
        playlists: Vec<String>,

        /// Plex user from [[plex.users]], repeatable (default: the server token)
        #[arg(short, long = "user")]
        users: Vec<String>,
    },
    /// Enter Plex rating keys for playlist tracks by hand
    Prematch {
        /// Spotify playlist id, repeatable (default: [playlists] ids from the config)
        #[arg(short, long = "playlist")]
        playlists: Vec<String>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn playlist_ids(config: &Config, from_args: Vec<String>) -> Result<Vec<String>> {
    let ids = if from_args.is_empty() {
        config.playlists.ids.clone()
    } else {
        from_args
    };
    if ids.is_empty() {
        bail!("No playlists to process. Pass --playlist or set [playlists] ids in the config");
    }
    Ok(ids)
}

async fn connect_spotify(config: &Config) -> Result<SpotifyHttpAdapter> {
    SpotifyHttpAdapter::connect(&SpotifyApiCredentials::new(
        config.spotify.client_id.clone(),
        config.spotify.client_secret.clone(),
    ))
    .await
}

async fn run_sync(config: Config, playlists: Vec<String>, users: Vec<String>) -> Result<()> {
    let playlist_ids = playlist_ids(&config, playlists)?;
    let users: Vec<Option<String>> = if users.is_empty() {
        vec![None]
    } else {
        users.into_iter().map(Some).collect()
    };
    // Fail on unknown users before anything is prompted
    for user in &users {
        config.user_token(user.as_deref())?;
    }

    let server_url = config.plex_url()?;
    let cache = MatchCache::new(config.cache_path()?);
    let mut matches = cache.load();
    info!(entries = matches.len(), path = %cache.path().display(), "Loaded match cache");

    let service = SyncService::new(
        connect_spotify(&config).await?,
        TerminalOperator::new(),
        cache,
        config.sync_options()?,
    );
    let http = reqwest::Client::new();

    let mut failed = 0;
    'users: for user in &users {
        let label = user.as_deref().unwrap_or(OWNER);
        let token = config.user_token(user.as_deref())?;
        let plex = PlexHttpAdapter::new(http.clone(), server_url.clone(), token.to_string());

        for playlist_id in &playlist_ids {
            match service
                .sync_playlist(&plex, label, playlist_id, &mut matches)
                .await
            {
                Ok(result) => {
                    println!(
                        "{} ({}): {} matched, {} unmatched, {:?}",
                        result.playlist.name,
                        label,
                        result.matched.len(),
                        result.unmatched.len(),
                        result.status
                    );
                    match result.status {
                        PlaylistStatus::Synced => {}
                        PlaylistStatus::Failed => failed += 1,
                        PlaylistStatus::Aborted => {
                            warn!("Run aborted, remaining playlists are not processed");
                            break 'users;
                        }
                    }
                }
                Err(e) => {
                    error!(playlist_id = %playlist_id, user = label, "Sync failed: {:#}", e);
                    eprintln!("Failed to sync {} for {}: {:#}", playlist_id, label, e);
                    failed += 1;
                }
            }
        }
    }

    if failed > 0 {
        bail!("{} playlist sync(s) failed", failed);
    }
    Ok(())
}

async fn run_prematch(config: Config, playlists: Vec<String>) -> Result<()> {
    let playlist_ids = playlist_ids(&config, playlists)?;

    let cache = MatchCache::new(config.cache_path()?);
    let mut matches = cache.load();
    let service = PrematchService::new(connect_spotify(&config).await?, TerminalOperator::new(), cache);

    for playlist_id in &playlist_ids {
        match service.prematch_playlist(playlist_id, &mut matches).await {
            Ok(summary) => println!(
                "{}: {} recorded, {} skipped, {} already matched",
                playlist_id, summary.recorded, summary.skipped, summary.already_matched
            ),
            Err(e) => {
                error!(playlist_id = %playlist_id, "Pre-match failed: {:#}", e);
                eprintln!("Failed to pre-match {}: {:#}", playlist_id, e);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let _tracing = init_tracing(
        env!("CARGO_PKG_NAME"),
        args.otlp_endpoint.as_deref(),
        &args.log_level,
        args.log_file.as_deref(),
        &args.log_file_level,
    )?;

    debug!("Plex playlist sync starting");

    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path().ok_or_else(|| eyre!("Could not determine the config directory"))?,
    };

    match args.command {
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                debug!("Creating default config");
                Config::create_default(&config_path)?;
                println!("Created {}", config_path.display());
            }
            ConfigCommands::Path => println!("{}", config_path.display()),
        },
        Commands::Sync { playlists, users } => {
            let config = Config::from_file(&config_path)
                .wrap_err("Failed to load plex-playlist-sync config")?;
            run_sync(config, playlists, users).await?;
        }
        Commands::Prematch { playlists } => {
            let config = Config::from_file(&config_path)
                .wrap_err("Failed to load plex-playlist-sync config")?;
            run_prematch(config, playlists).await?;
        }
    }

    Ok(())
}
