//! Flux query construction and parsing of the CSV query response.

use crate::influx::error::InfluxError;
use crate::utils::escape_flux_string;
use chrono::{DateTime, Utc};

/// Query for the most recent point of `field` in `series` within `lookback`.
pub fn last_point_query(bucket: &str, lookback: &str, series: &str, field: &str) -> String {
    format!(
        concat!(
            "from(bucket: \"{bucket}\")\n",
            "  |> range(start: -{lookback})\n",
            "  |> filter(fn: (r) => r[\"_measurement\"] == \"{series}\")\n",
            "  |> filter(fn: (r) => r[\"_field\"] == \"{field}\")\n",
            "  |> last()"
        ),
        bucket = escape_flux_string(bucket),
        lookback = lookback,
        series = escape_flux_string(series),
        field = escape_flux_string(field),
    )
}

/// Extracts `_time` of the first record of a CSV query response.
///
/// The response holds one header row per table, optional `#` annotation rows
/// and blank lines between tables. An empty response means no record.
pub fn first_record_time(csv_body: &str) -> Result<Option<DateTime<Utc>>, InfluxError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(csv_body.as_bytes());

    let mut time_column: Option<usize> = None;
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let Some(index) = time_column else {
            time_column = Some(
                record
                    .iter()
                    .position(|cell| cell == "_time")
                    .ok_or(InfluxError::MissingColumn("_time"))?,
            );
            continue;
        };

        let Some(value) = record.get(index) else {
            continue;
        };
        let parsed =
            DateTime::parse_from_rfc3339(value).map_err(|e| InfluxError::TimestampParse {
                value: value.to_string(),
                source: e,
            })?;
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(None)
}
