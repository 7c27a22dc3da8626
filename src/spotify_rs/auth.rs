use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::spotify_rs::types::SpotifyTokenResponse;

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Tokens this close to expiry are renewed before use.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum SpotifyAuthError {
    #[error("Spotify rejected the client credentials: {reason}")]
    Rejected { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Request an app token with the client-credentials flow.
/// https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow
///
/// The token reads public playlists only and expires after an hour.
pub async fn request_client_token(
    client: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
) -> Result<SpotifyTokenResponse, SpotifyAuthError> {
    let response = client
        .post(SPOTIFY_TOKEN_URL)
        // Serialized as x-www-form-urlencoded, as required by Spotify
        .form(&[("grant_type", "client_credentials")])
        .basic_auth(client_id, Some(client_secret))
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(SpotifyAuthError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(SpotifyAuthError::Rejected {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    response
        .json()
        .await
        .map_err(SpotifyAuthError::FailedToParseResponse)
}

/// Something that can hand out a fresh app token.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn request_token(&self) -> Result<SpotifyTokenResponse, SpotifyAuthError>;
}

/// Client-credentials token source backed by the Spotify accounts service.
pub struct ClientCredentials {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(client: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self {
            client,
            client_id,
            client_secret,
        }
    }
}

#[async_trait::async_trait]
impl TokenSource for ClientCredentials {
    async fn request_token(&self) -> Result<SpotifyTokenResponse, SpotifyAuthError> {
        request_client_token(&self.client, &self.client_id, &self.client_secret).await
    }
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// App token that is requested lazily and renewed when it is about to expire
/// or after the API rejected it.
pub struct AppToken {
    source: Box<dyn TokenSource>,
    current: Mutex<Option<CachedToken>>,
}

impl AppToken {
    pub fn new(source: impl TokenSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            current: Mutex::new(None),
        }
    }

    /// A token valid for at least [`EXPIRY_MARGIN`].
    pub async fn access_token(&self) -> Result<String, SpotifyAuthError> {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref()
            && Instant::now() + EXPIRY_MARGIN < token.expires_at
        {
            return Ok(token.access_token.clone());
        }

        let response = self.source.request_token().await?;
        debug!(expires_in = response.expires_in, "Obtained Spotify app token");
        let token = CachedToken {
            expires_at: Instant::now() + Duration::from_secs(response.expires_in),
            access_token: response.access_token,
        };
        let access_token = token.access_token.clone();
        *current = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next call requests a new one.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(access_token: &str, expires_in: u64) -> SpotifyTokenResponse {
        SpotifyTokenResponse {
            access_token: access_token.to_string(),
            expires_in,
        }
    }

    #[tokio::test]
    async fn test_app_token_is_reused_while_valid() {
        let mut source = MockTokenSource::new();
        source
            .expect_request_token()
            .times(1)
            .returning(|| Ok(token("first", 3600)));

        let app_token = AppToken::new(source);
        assert_eq!(app_token.access_token().await.unwrap(), "first");
        assert_eq!(app_token.access_token().await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_app_token_near_expiry_is_renewed() {
        let mut source = MockTokenSource::new();
        let mut seq = mockall::Sequence::new();
        source
            .expect_request_token()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(token("short-lived", 30)));
        source
            .expect_request_token()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(token("renewed", 3600)));

        let app_token = AppToken::new(source);
        assert_eq!(app_token.access_token().await.unwrap(), "short-lived");
        assert_eq!(app_token.access_token().await.unwrap(), "renewed");
    }

    #[tokio::test]
    async fn test_invalidated_token_is_requested_again() {
        let mut source = MockTokenSource::new();
        let mut seq = mockall::Sequence::new();
        source
            .expect_request_token()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(token("revoked", 3600)));
        source
            .expect_request_token()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(token("fresh", 3600)));

        let app_token = AppToken::new(source);
        assert_eq!(app_token.access_token().await.unwrap(), "revoked");
        app_token.invalidate().await;
        assert_eq!(app_token.access_token().await.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_failed_renewal_keeps_no_token() {
        let mut source = MockTokenSource::new();
        let mut seq = mockall::Sequence::new();
        source
            .expect_request_token()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| {
                Err(SpotifyAuthError::Rejected {
                    reason: "invalid_client".into(),
                })
            });
        source
            .expect_request_token()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(token("recovered", 3600)));

        let app_token = AppToken::new(source);
        assert!(app_token.access_token().await.is_err());
        assert_eq!(app_token.access_token().await.unwrap(), "recovered");
    }

    #[test]
    fn test_token_response_ignores_extra_fields() {
        let json = r#"{"access_token": "abc", "token_type": "Bearer", "expires_in": 3600, "scope": ""}"#;
        let token: SpotifyTokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn test_rejected_error_message() {
        let err = SpotifyAuthError::Rejected {
            reason: "invalid_client".into(),
        };
        assert_eq!(
            err.to_string(),
            "Spotify rejected the client credentials: invalid_client"
        );
    }
}
