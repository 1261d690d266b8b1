use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfluxError {
    #[error("Failed to create HTTP client for InfluxDB")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}: {message}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Failed to parse query result CSV")]
    CsvParse(#[from] csv::Error),

    #[error("Query result has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("Failed to parse timestamp '{value}' from query result")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
