//! The time-series point handed from the reconciler to the InfluxDB writer.

use bon::Builder;
use chrono::DateTime;
use chrono_tz::Tz;

/// An immutable reading destined for InfluxDB.
///
/// The series is the InfluxDB measurement (the Netatmo module name), the field
/// is the measurement type or status attribute.
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use netatmo2influx::Point;
///
/// let tz = chrono_tz::Europe::Berlin;
/// let point = Point::builder()
///     .series("Outdoor")
///     .field("temperature")
///     .value(20.5)
///     .time(tz.timestamp_opt(1_700_000_000, 0).unwrap())
///     .build();
///
/// assert_eq!(point.series(), "Outdoor");
/// assert_eq!(point.value(), 20.5);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct Point {
    #[builder(into)]
    series: String,
    #[builder(into)]
    field: String,
    value: f64,
    time: DateTime<Tz>,
}

impl Point {
    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn time(&self) -> DateTime<Tz> {
        self.time
    }
}
