use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetatmoError {
    #[error("Netatmo credential '{0}' is not configured")]
    MissingCredential(&'static str),

    #[error("Failed to read credentials file '{0}'")]
    CredentialsRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse credentials file '{0}'")]
    CredentialsParse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to write credentials file '{0}'")]
    CredentialsWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}: {message}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },

    // Body was delivered but does not have the expected shape
    #[error("Failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Netatmo API at {url} reported an error: {message}")]
    Api { url: String, message: String },

    #[error("Unexpected data from {url}: {message}")]
    UnexpectedData { url: String, message: String },
}
