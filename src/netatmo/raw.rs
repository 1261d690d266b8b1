//! Wire shapes of the Netatmo API and their conversion into the typed model.
//!
//! Everything here mirrors the JSON as Netatmo sends it; nothing outside this
//! module sees these structs.

use crate::netatmo::error::NetatmoError;
use crate::types::station::{Dashboard, DashboardValue, LatLon, Module, Place, Station};
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Envelope shared by every `/api/*` response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub body: Option<T>,
    pub status: Option<String>,
}

/// Error document returned with non-2xx responses. `error` is either an
/// object (`{"code": 2, "message": "..."}`) or a bare string for OAuth errors.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Value,
    pub error_description: Option<String>,
}

impl ErrorEnvelope {
    pub fn message(&self) -> String {
        let base = match &self.error {
            Value::Object(obj) => match (obj.get("code"), obj.get("message")) {
                (Some(code), Some(Value::String(msg))) => format!("{msg} (code {code})"),
                (None, Some(Value::String(msg))) => msg.clone(),
                _ => self.error.to_string(),
            },
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match &self.error_description {
            Some(description) => format!("{base}: {description}"),
            None => base,
        }
    }
}

/// Response of `POST /oauth2/token`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StationsDataBody {
    #[serde(default)]
    pub devices: Vec<RawDevice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDevice {
    #[serde(rename = "_id")]
    pub id: String,
    pub station_name: Option<String>,
    pub home_name: Option<String>,
    pub module_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub place: Option<RawPlace>,
    pub dashboard_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub data_type: Vec<String>,
    #[serde(flatten)]
    pub status: RawStatus,
    #[serde(default)]
    pub modules: Vec<RawModule>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawModule {
    #[serde(rename = "_id")]
    pub id: String,
    pub module_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub dashboard_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub data_type: Vec<String>,
    #[serde(flatten)]
    pub status: RawStatus,
}

/// Status attributes. Which ones are present depends on the hardware, so
/// every unit may carry any of them.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawStatus {
    pub battery_percent: Option<f64>,
    pub wifi_status: Option<f64>,
    pub rf_status: Option<f64>,
    pub last_seen: Option<i64>,
    pub last_status_store: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPlace {
    pub city: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
    /// `[longitude, latitude]`
    pub location: Option<Vec<f64>>,
    pub altitude: Option<f64>,
}

impl From<RawPlace> for Place {
    fn from(raw: RawPlace) -> Self {
        let location = match raw.location.as_deref() {
            Some([lon, lat, ..]) => Some(LatLon(*lat, *lon)),
            _ => None,
        };
        Place {
            city: raw.city,
            country: raw.country,
            timezone: raw.timezone,
            location,
            altitude: raw.altitude,
        }
    }
}

impl From<RawDevice> for Station {
    fn from(raw: RawDevice) -> Self {
        let name = raw
            .station_name
            .or(raw.home_name)
            .unwrap_or_else(|| raw.id.clone());
        let base = Module {
            id: raw.id.clone(),
            name: raw.module_name.unwrap_or_else(|| name.clone()),
            kind: raw.kind,
            dashboard: raw.dashboard_data.map(into_dashboard),
            data_types: raw.data_type,
            battery_percent: raw.status.battery_percent,
            wifi_status: raw.status.wifi_status,
            rf_status: raw.status.rf_status,
            last_seen: raw.status.last_seen,
            last_status_store: raw.status.last_status_store,
        };
        Station {
            id: raw.id,
            name,
            place: raw.place.map(Place::from).unwrap_or_default(),
            base,
            modules: raw.modules.into_iter().map(Module::from).collect(),
        }
    }
}

impl From<RawModule> for Module {
    fn from(raw: RawModule) -> Self {
        Module {
            name: raw.module_name.unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            kind: raw.kind,
            dashboard: raw.dashboard_data.map(into_dashboard),
            data_types: raw.data_type,
            battery_percent: raw.status.battery_percent,
            wifi_status: raw.status.wifi_status,
            rf_status: raw.status.rf_status,
            last_seen: raw.status.last_seen,
            last_status_store: raw.status.last_status_store,
        }
    }
}

fn into_dashboard(map: Map<String, Value>) -> Dashboard {
    let mut dashboard = Dashboard::default();
    for (key, value) in map {
        if key == "time_utc" {
            dashboard.time_utc = value.as_i64();
            continue;
        }
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_f64() {
                    dashboard.values.push((key, DashboardValue::Number(v)));
                }
            }
            Value::String(s) => dashboard.values.push((key, DashboardValue::Text(s))),
            other => debug!("Ignoring dashboard entry {key}={other}"),
        }
    }
    dashboard
}

/// One `(epoch, value)` pair of a `getmeasure` series.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureSample {
    pub epoch: i64,
    pub value: SampleValue,
}

/// The primary value of a sample as Netatmo delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Number(f64),
    Text(String),
    Missing,
}

impl From<&Value> for SampleValue {
    fn from(value: &Value) -> Self {
        match value {
            // Netatmo wraps values in a list, one entry per requested type
            Value::Array(items) => items.first().map(SampleValue::from).unwrap_or(SampleValue::Missing),
            Value::Number(n) => n.as_f64().map(SampleValue::Number).unwrap_or(SampleValue::Missing),
            Value::String(s) => SampleValue::Text(s.clone()),
            _ => SampleValue::Missing,
        }
    }
}

/// A historical series returned by `getmeasure`, ordered by time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeasureSeries {
    pub samples: Vec<MeasureSample>,
}

impl MeasureSeries {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Parses the non-optimized `getmeasure` body, `{"<epoch>": [value], ...}`.
    /// An empty list or object is an empty series.
    pub(crate) fn from_body(body: &Value, url: &str) -> Result<Self, NetatmoError> {
        let mut samples = Vec::new();
        match body {
            Value::Object(entries) => {
                for (epoch, value) in entries {
                    let epoch = epoch.parse::<i64>().map_err(|_| NetatmoError::UnexpectedData {
                        url: url.to_string(),
                        message: format!("measure key '{epoch}' is not an epoch timestamp"),
                    })?;
                    samples.push(MeasureSample {
                        epoch,
                        value: SampleValue::from(value),
                    });
                }
            }
            Value::Array(items) if items.is_empty() => {}
            other => {
                return Err(NetatmoError::UnexpectedData {
                    url: url.to_string(),
                    message: format!("unsupported measure body: {other}"),
                })
            }
        }
        samples.sort_by_key(|s| s.epoch);
        Ok(MeasureSeries { samples })
    }
}
