//! Defines the measurement types that are synchronised from Netatmo and the
//! per-module status fields that are recorded next to them.

use std::fmt;

/// A measurement type Netatmo can deliver as a historical series.
///
/// Only these types are ever fetched. Dashboard keys outside this set (for
/// example `WindAngle` or `sum_rain_24`) are ignored by the reconciler.
///
/// # Examples
///
/// ```
/// use netatmo2influx::MeasurementType;
///
/// assert_eq!(MeasurementType::from_key("Temperature"), Some(MeasurementType::Temperature));
/// assert_eq!(MeasurementType::from_key("CO2"), Some(MeasurementType::Co2));
/// assert_eq!(MeasurementType::from_key("WindAngle"), None);
/// assert_eq!(MeasurementType::Pressure.to_string(), "pressure");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementType {
    /// Degrees Celsius.
    Temperature,
    /// Relative humidity in percent.
    Humidity,
    /// CO2 concentration in ppm.
    Co2,
    /// Barometric pressure in mbar.
    Pressure,
    /// Noise level in dB.
    Noise,
    /// Rain in mm.
    Rain,
    /// Wind strength in km/h.
    WindStrength,
}

impl MeasurementType {
    /// All supported types, in the order Netatmo documents them.
    pub const ALL: [MeasurementType; 7] = [
        MeasurementType::Temperature,
        MeasurementType::Humidity,
        MeasurementType::Co2,
        MeasurementType::Pressure,
        MeasurementType::Noise,
        MeasurementType::Rain,
        MeasurementType::WindStrength,
    ];

    /// The lower-case name used both as the `type` parameter of `getmeasure`
    /// and as the field name in InfluxDB.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::Temperature => "temperature",
            MeasurementType::Humidity => "humidity",
            MeasurementType::Co2 => "co2",
            MeasurementType::Pressure => "pressure",
            MeasurementType::Noise => "noise",
            MeasurementType::Rain => "rain",
            MeasurementType::WindStrength => "windstrength",
        }
    }

    /// Matches a dashboard key case-insensitively against the supported set.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status attributes carried by a module record that are written as points
/// alongside the measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    BatteryPercent,
    WifiStatus,
    RfStatus,
}

impl MetadataField {
    /// Order in which metadata points are emitted.
    pub const ALL: [MetadataField; 3] = [
        MetadataField::BatteryPercent,
        MetadataField::WifiStatus,
        MetadataField::RfStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataField::BatteryPercent => "battery_percent",
            MetadataField::WifiStatus => "wifi_status",
            MetadataField::RfStatus => "rf_status",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
