use crate::config::InfluxConfig;
use crate::influx::error::InfluxError;
use crate::influx::flux::{first_record_time, last_point_query};
use crate::influx::line_protocol::encode_batch;
use crate::poller::PointSink;
use crate::reconciler::CursorSource;
use crate::types::point::Point;
use crate::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};

const MAX_ERROR_BODY: usize = 200;

/// Sink Writer for InfluxDB v2.
///
/// Every operation opens its own [`InfluxSession`] and drops it before
/// returning; no connection is reused between the cursor lookups and the
/// write of a cycle.
pub struct InfluxClient {
    config: InfluxConfig,
}

impl InfluxClient {
    pub fn new(config: InfluxConfig) -> Self {
        Self { config }
    }

    fn connect(&self) -> Result<InfluxSession<'_>, InfluxError> {
        // no keep-alive pool: the session's connection dies with it
        let http = Client::builder()
            .pool_max_idle_per_host(0)
            .timeout(self.config.timeout)
            .build()
            .map_err(InfluxError::ClientBuild)?;
        debug!(
            "Connected to InfluxDB {} ({})",
            self.config.url, self.config.org
        );
        Ok(InfluxSession {
            http,
            config: &self.config,
        })
    }

    /// Timestamp of the most recent point for `series`/`field` inside the
    /// configured look-back window, `None` if there is none.
    pub async fn get_latest_timestamp(
        &self,
        series: &str,
        field: &str,
    ) -> Result<Option<DateTime<Utc>>, InfluxError> {
        let session = self.connect()?;
        let query = last_point_query(&self.config.bucket, &self.config.lookback, series, field);
        let csv = session.query(&query).await?;
        first_record_time(&csv)
    }

    /// Writes the whole batch in one request. Succeeds or fails as a whole.
    pub async fn write(&self, points: &[Point]) -> Result<usize, InfluxError> {
        let session = self.connect()?;
        info!("Writing {} records to InfluxDB", points.len());
        session.write(points).await?;
        Ok(points.len())
    }
}

#[async_trait]
impl CursorSource for InfluxClient {
    async fn latest_timestamp(
        &self,
        series: &str,
        field: &str,
    ) -> Result<Option<DateTime<Utc>>, SyncError> {
        Ok(self.get_latest_timestamp(series, field).await?)
    }
}

#[async_trait]
impl PointSink for InfluxClient {
    async fn write(&self, points: &[Point]) -> Result<usize, SyncError> {
        Ok(InfluxClient::write(self, points).await?)
    }
}

/// A single-use HTTP session against the InfluxDB API.
struct InfluxSession<'a> {
    http: Client,
    config: &'a InfluxConfig,
}

impl InfluxSession<'_> {
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Token {}", self.config.token))
    }

    async fn query(&self, flux: &str) -> Result<String, InfluxError> {
        let url = format!("{}/api/v2/query", self.config.url);
        let request = self
            .authorized(self.http.post(&url))
            .query(&[("org", self.config.org.as_str())])
            .header(CONTENT_TYPE, "application/vnd.flux")
            .header(ACCEPT, "application/csv")
            .body(flux.to_string());
        send_text(request, &url).await
    }

    async fn write(&self, points: &[Point]) -> Result<(), InfluxError> {
        let url = format!("{}/api/v2/write", self.config.url);
        let request = self
            .authorized(self.http.post(&url))
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "s"),
            ])
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(encode_batch(points));
        send_text(request, &url).await.map(|_| ())
    }
}

async fn send_text(request: RequestBuilder, url: &str) -> Result<String, InfluxError> {
    let response = request
        .send()
        .await
        .map_err(|e| InfluxError::NetworkRequest(url.to_string(), e))?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| InfluxError::NetworkRequest(url.to_string(), e))?;

    if !status.is_success() {
        let message = error_message(&text);
        warn!("HTTP error for {}: {} {}", url, status, message);
        return Err(InfluxError::HttpStatus {
            url: url.to_string(),
            status,
            message,
        });
    }
    Ok(text)
}

/// InfluxDB answers errors with `{"code": "...", "message": "..."}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect())
}
