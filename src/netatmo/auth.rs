//! OAuth2 refresh-token authentication against Netatmo.
//!
//! Netatmo rotates the refresh token on every refresh. The latest one is kept
//! in memory for the lifetime of the process and written back to the
//! credentials file it came from, so a restart picks it up.

use crate::config::NetatmoConfig;
use crate::netatmo::client::send_json;
use crate::netatmo::error::NetatmoError;
use crate::netatmo::raw::TokenResponse;
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const CLIENT_ID_KEY: &str = "CLIENT_ID";
const CLIENT_SECRET_KEY: &str = "CLIENT_SECRET";
const REFRESH_TOKEN_KEY: &str = "REFRESH_TOKEN";
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(10_800);
// Refresh a little before Netatmo expires the token
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Application credentials for the refresh-token grant.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// The credentials file the values were (partly) read from.
    pub file: Option<PathBuf>,
}

impl Credentials {
    /// Merges the credentials file with the configured values; configured
    /// values win key by key. A missing file is not an error.
    pub async fn resolve(config: &NetatmoConfig) -> Result<Self, NetatmoError> {
        let (file_values, file) = match &config.credentials_file {
            Some(path) if tokio::fs::try_exists(path).await.unwrap_or(false) => {
                (read_credentials_file(path).await?, Some(path.clone()))
            }
            _ => (Map::new(), None),
        };

        let pick = |configured: &Option<String>, key: &'static str| {
            configured
                .clone()
                .or_else(|| {
                    file_values
                        .get(key)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .filter(|v| !v.trim().is_empty())
                .ok_or(NetatmoError::MissingCredential(key))
        };

        Ok(Credentials {
            client_id: pick(&config.client_id, CLIENT_ID_KEY)?,
            client_secret: pick(&config.client_secret, CLIENT_SECRET_KEY)?,
            refresh_token: pick(&config.refresh_token, REFRESH_TOKEN_KEY)?,
            file,
        })
    }
}

async fn read_credentials_file(path: &Path) -> Result<Map<String, Value>, NetatmoError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| NetatmoError::CredentialsRead(path.to_path_buf(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| NetatmoError::CredentialsParse(path.to_path_buf(), e))
}

/// Stores a rotated refresh token, keeping every other key of the file.
pub async fn write_refresh_token(path: &Path, refresh_token: &str) -> Result<(), NetatmoError> {
    let mut values = read_credentials_file(path).await?;
    values.insert(
        REFRESH_TOKEN_KEY.to_string(),
        Value::String(refresh_token.to_string()),
    );
    let json = serde_json::to_string_pretty(&values)
        .map_err(|e| NetatmoError::CredentialsParse(path.to_path_buf(), e))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| NetatmoError::CredentialsWrite(path.to_path_buf(), e))
}

struct AccessToken {
    token: String,
    expires_at: Instant,
}

#[derive(Default)]
struct AuthState {
    rotated_refresh_token: Option<String>,
    access: Option<AccessToken>,
}

pub struct NetatmoAuth {
    http: Client,
    config: NetatmoConfig,
    state: Mutex<AuthState>,
}

impl NetatmoAuth {
    pub fn new(http: Client, config: NetatmoConfig) -> Self {
        Self {
            http,
            config,
            state: Mutex::new(AuthState::default()),
        }
    }

    fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.config.api_url)
    }

    /// Returns a valid access token, refreshing it when needed.
    pub async fn access_token(&self) -> Result<String, NetatmoError> {
        let mut state = self.state.lock().await;
        if let Some(access) = &state.access {
            if access.expires_at > Instant::now() {
                return Ok(access.token.clone());
            }
            debug!("Netatmo access token expired, refreshing");
        }

        let credentials = Credentials::resolve(&self.config).await?;
        let refresh_token = state
            .rotated_refresh_token
            .clone()
            .unwrap_or_else(|| credentials.refresh_token.clone());

        let url = self.token_url();
        let request = self.http.post(&url).form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ]);
        let response: TokenResponse = send_json(request, &url).await?;

        if let Some(new_refresh) = response
            .refresh_token
            .filter(|token| *token != refresh_token)
        {
            info!("Netatmo rotated the refresh token");
            if let Some(path) = &credentials.file {
                if let Err(e) = write_refresh_token(path, &new_refresh).await {
                    warn!("Could not store the new refresh token: {e}");
                }
            }
            state.rotated_refresh_token = Some(new_refresh);
        }

        let lifetime = response
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME)
            .saturating_sub(EXPIRY_MARGIN);
        state.access = Some(AccessToken {
            token: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }
}
