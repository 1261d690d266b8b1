//! Typed representation of the Netatmo weather station topology.
//!
//! These structures are built once at the Netatmo boundary (see
//! [`crate::netatmo`]) from the loosely-typed API payload, so the reconciler
//! only ever works on validated shapes.

use crate::types::measurement_type::{MeasurementType, MetadataField};

/// A geographical coordinate, latitude first.
///
/// # Examples
///
/// ```
/// use netatmo2influx::LatLon;
///
/// let berlin_center = LatLon(52.5200, 13.4050);
/// assert_eq!(berlin_center.0, 52.5200); // Latitude
/// assert_eq!(berlin_center.1, 13.4050); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// A physical Netatmo base station and the satellite modules paired with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Hardware (MAC) address of the base station, e.g. "70:ee:50:00:00:01".
    pub id: String,
    /// Display name chosen by the owner.
    pub name: String,
    /// Where the station is installed.
    pub place: Place,
    /// The base station's own sensor record. Netatmo reports the indoor
    /// measurements of the base unit on the station object itself.
    pub base: Module,
    /// Paired satellite modules (outdoor, rain, wind, additional indoor).
    pub modules: Vec<Module>,
}

impl Station {
    /// Iterates the base module first, then every satellite in API order.
    pub fn all_modules(&self) -> impl Iterator<Item = &Module> {
        std::iter::once(&self.base).chain(self.modules.iter())
    }
}

/// Installation details of a station.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Place {
    pub city: Option<String>,
    pub country: Option<String>,
    /// IANA timezone name reported by Netatmo.
    pub timezone: Option<String>,
    pub location: Option<LatLon>,
    /// Altitude in meters.
    pub altitude: Option<f64>,
}

/// A sensor-bearing unit: either a base station or a satellite module.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Module identifier (MAC address). For the base module this equals the
    /// station id.
    pub id: String,
    /// Human readable module name, used as the series name in InfluxDB.
    pub name: String,
    /// Netatmo hardware type, e.g. "NAMain", "NAModule1".
    pub kind: Option<String>,
    /// Latest values. `None` when Netatmo sent no dashboard at all, which
    /// happens for unreachable modules and relay-only base stations.
    pub dashboard: Option<Dashboard>,
    /// Data types the module advertises in `data_type`.
    pub data_types: Vec<String>,
    pub battery_percent: Option<f64>,
    pub wifi_status: Option<f64>,
    pub rf_status: Option<f64>,
    /// Epoch seconds of the last message received from a satellite module.
    pub last_seen: Option<i64>,
    /// Epoch seconds of the last status stored for a base station.
    pub last_status_store: Option<i64>,
}

impl Module {
    /// The tracked measurement types present in the dashboard, in dashboard
    /// order. Empty when there is no dashboard.
    pub fn measurement_types(&self) -> Vec<MeasurementType> {
        let Some(dashboard) = &self.dashboard else {
            return vec![];
        };
        let mut types = Vec::new();
        for (key, _) in &dashboard.values {
            if let Some(t) = MeasurementType::from_key(key) {
                if !types.contains(&t) {
                    types.push(t);
                }
            }
        }
        types
    }

    /// Value of a status attribute, if the module carries it.
    pub fn metadata(&self, field: MetadataField) -> Option<f64> {
        match field {
            MetadataField::BatteryPercent => self.battery_percent,
            MetadataField::WifiStatus => self.wifi_status,
            MetadataField::RfStatus => self.rf_status,
        }
    }

    /// Timestamp used for status points: `last_seen`, else `last_status_store`.
    pub fn status_timestamp(&self) -> Option<i64> {
        self.last_seen.or(self.last_status_store)
    }
}

/// The most recent snapshot of values reported with a module record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dashboard {
    /// Epoch seconds of the snapshot.
    pub time_utc: Option<i64>,
    /// Entries in the order Netatmo sent them. `time_utc` is not included.
    pub values: Vec<(String, DashboardValue)>,
}

/// A single dashboard entry. Netatmo mixes numbers with textual trend fields
/// such as `temp_trend: "stable"`.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardValue {
    Number(f64),
    Text(String),
}

impl DashboardValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DashboardValue::Number(v) => Some(*v),
            DashboardValue::Text(_) => None,
        }
    }
}
