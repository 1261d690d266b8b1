use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Conversion into the timezone points are written in.
///
/// Netatmo reports epoch seconds, InfluxDB cursors come back as UTC; both
/// end up as `DateTime<Tz>` in the configured zone.
pub trait IntoZonedDateTime {
    fn into_zoned(self, tz: &Tz) -> Option<DateTime<Tz>>;
}

/// Epoch seconds. `None` when out of chrono's range.
impl IntoZonedDateTime for i64 {
    fn into_zoned(self, tz: &Tz) -> Option<DateTime<Tz>> {
        tz.timestamp_opt(self, 0).single()
    }
}

impl IntoZonedDateTime for DateTime<Utc> {
    fn into_zoned(self, tz: &Tz) -> Option<DateTime<Tz>> {
        Some(self.with_timezone(tz))
    }
}
