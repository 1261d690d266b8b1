use crate::config::NetatmoConfig;
use crate::netatmo::auth::NetatmoAuth;
use crate::netatmo::error::NetatmoError;
use crate::netatmo::raw::{Envelope, ErrorEnvelope, MeasureSeries, StationsDataBody};
use crate::poller::{StationReader, StationSnapshot};
use crate::reconciler::{MeasureRequest, MeasureSource};
use crate::types::station::Station;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

const MAX_ERROR_BODY: usize = 200;

/// Sends a request and decodes the JSON answer. Non-2xx answers become
/// [`NetatmoError::HttpStatus`] carrying Netatmo's error message.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, NetatmoError> {
    let response = request
        .send()
        .await
        .map_err(|e| NetatmoError::NetworkRequest(url.to_string(), e))?;
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| NetatmoError::NetworkRequest(url.to_string(), e))?;

    if !status.is_success() {
        let message = match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
            Ok(envelope) => envelope.message(),
            Err(_) => String::from_utf8_lossy(&bytes)
                .chars()
                .take(MAX_ERROR_BODY)
                .collect(),
        };
        warn!("HTTP error for {}: {} {}", url, status, message);
        return Err(NetatmoError::HttpStatus {
            url: url.to_string(),
            status,
            message,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| NetatmoError::Decode {
        url: url.to_string(),
        source: e,
    })
}

/// Entry point to the Netatmo weather station API.
pub struct NetatmoClient {
    http: Client,
    api_url: String,
    auth: NetatmoAuth,
}

impl NetatmoClient {
    pub fn new(config: NetatmoConfig) -> Result<Self, NetatmoError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(NetatmoError::ClientBuild)?;
        Ok(Self {
            api_url: config.api_url.clone(),
            auth: NetatmoAuth::new(http.clone(), config),
            http,
        })
    }

    /// Authenticates and reads the topology and dashboards of every station
    /// the account can see.
    ///
    /// Returns a [`WeatherStationData`] handle that also serves the historical
    /// `getmeasure` queries for those stations. Any failure (credentials,
    /// transport, malformed payload) is returned as an error and never
    /// retried here.
    pub async fn read_station_info(&self) -> Result<WeatherStationData, NetatmoError> {
        let access_token = self.auth.access_token().await?;
        let session = NetatmoSession {
            http: self.http.clone(),
            api_url: self.api_url.clone(),
            access_token,
        };
        let stations = session.get_stations_data().await?;

        info!("Reading from Netatmo station(s):");
        for station in &stations {
            info!(
                "  {} in {}",
                station.name,
                station.place.city.as_deref().unwrap_or("unknown place")
            );
        }

        Ok(WeatherStationData { stations, session })
    }
}

/// An authenticated connection to the API for the duration of one cycle.
struct NetatmoSession {
    http: Client,
    api_url: String,
    access_token: String,
}

impl NetatmoSession {
    async fn get_stations_data(&self) -> Result<Vec<Station>, NetatmoError> {
        let url = format!("{}/api/getstationsdata", self.api_url);
        let request = self.http.get(&url).bearer_auth(&self.access_token);
        let envelope: Envelope<StationsDataBody> = send_json(request, &url).await?;
        check_status(&envelope, &url)?;

        let body = envelope.body.ok_or_else(|| NetatmoError::UnexpectedData {
            url: url.clone(),
            message: "response has no body".to_string(),
        })?;
        Ok(body.devices.into_iter().map(Station::from).collect())
    }

    async fn get_measure(
        &self,
        request: &MeasureRequest,
    ) -> Result<Option<MeasureSeries>, NetatmoError> {
        let url = format!("{}/api/getmeasure", self.api_url);
        let query = [
            ("device_id", request.device_id.clone()),
            ("module_id", request.module_id.clone()),
            ("scale", "max".to_string()),
            ("type", request.measurement.to_string()),
            ("date_begin", request.date_begin.timestamp().to_string()),
            ("date_end", request.date_end.timestamp().to_string()),
            ("optimize", "false".to_string()),
            ("real_time", "false".to_string()),
        ];
        debug!("Requesting {} with {:?}", url, query);

        let builder = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&query);
        let envelope: Envelope<Value> = send_json(builder, &url).await?;
        check_status(&envelope, &url)?;

        match envelope.body {
            None | Some(Value::Null) => Ok(None),
            Some(body) => MeasureSeries::from_body(&body, &url).map(Some),
        }
    }
}

fn check_status<T>(envelope: &Envelope<T>, url: &str) -> Result<(), NetatmoError> {
    match envelope.status.as_deref() {
        None | Some("ok") => Ok(()),
        Some(other) => Err(NetatmoError::Api {
            url: url.to_string(),
            message: format!("status '{other}'"),
        }),
    }
}

/// Result of [`NetatmoClient::read_station_info`]: the station topology plus
/// the session used to read historical series for it.
pub struct WeatherStationData {
    pub stations: Vec<Station>,
    session: NetatmoSession,
}

#[async_trait]
impl MeasureSource for WeatherStationData {
    async fn get_measure(
        &self,
        request: &MeasureRequest,
    ) -> Result<Option<MeasureSeries>, NetatmoError> {
        self.session.get_measure(request).await
    }
}

impl StationSnapshot for WeatherStationData {
    fn stations(&self) -> &[Station] {
        &self.stations
    }
}

#[async_trait]
impl StationReader for NetatmoClient {
    async fn read_station_info(&self) -> Result<Box<dyn StationSnapshot>, NetatmoError> {
        let data = NetatmoClient::read_station_info(self).await?;
        Ok(Box::new(data))
    }
}
