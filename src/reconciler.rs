//! Incremental synchronisation of Netatmo modules into time-series points.
//!
//! For every module the reconciler looks up the last stored timestamp of the
//! module's first tracked measurement type, fetches everything Netatmo has
//! published since then and turns it into [`Point`]s. Status attributes
//! (battery, wifi, rf) are appended as extra points.
//!
//! Known limitation: the cursor of the *first* tracked type bounds the fetch
//! window of every type of that module. If types drift apart (for example
//! after a partially failed write) the others re-fetch overlapping ranges or
//! keep a gap. Per-type cursors would fix this at the cost of one lookup per
//! type.

use crate::error::SyncError;
use crate::netatmo::error::NetatmoError;
use crate::netatmo::raw::{MeasureSeries, SampleValue};
use crate::types::into_zoned_trait::IntoZonedDateTime;
use crate::types::measurement_type::{MeasurementType, MetadataField};
use crate::types::point::Point;
use crate::types::station::{DashboardValue, Module, Station};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, error, info, warn};

/// Parameters of one historical `getmeasure` request.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRequest {
    /// MAC address of the base station owning the module.
    pub device_id: String,
    pub module_id: String,
    pub measurement: MeasurementType,
    pub date_begin: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
}

/// Source of historical series, implemented by the Netatmo data handle.
#[async_trait]
pub trait MeasureSource: Send + Sync {
    /// `Ok(None)` when Netatmo answers without any data structure.
    async fn get_measure(
        &self,
        request: &MeasureRequest,
    ) -> Result<Option<MeasureSeries>, NetatmoError>;
}

/// Source of sync cursors, implemented by the InfluxDB client.
#[async_trait]
pub trait CursorSource: Send + Sync {
    async fn latest_timestamp(
        &self,
        series: &str,
        field: &str,
    ) -> Result<Option<DateTime<Utc>>, SyncError>;
}

pub struct Reconciler {
    timezone: Tz,
}

impl Reconciler {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Collects every point published since the last stored one, for all
    /// modules of all stations, up to now.
    ///
    /// Points are ordered by station, then module (base station first), then
    /// measurement type, with status points last for each module.
    ///
    /// # Errors
    ///
    /// Only cursor lookups fail the call. Problems with individual Netatmo
    /// series are logged and skipped.
    pub async fn interval_points<M, C>(
        &self,
        stations: &[Station],
        source: &M,
        cursors: &C,
    ) -> Result<Vec<Point>, SyncError>
    where
        M: MeasureSource + ?Sized,
        C: CursorSource + ?Sized,
    {
        self.interval_points_until(stations, source, cursors, Utc::now())
            .await
    }

    /// [`Reconciler::interval_points`] with an explicit end of the window.
    pub async fn interval_points_until<M, C>(
        &self,
        stations: &[Station],
        source: &M,
        cursors: &C,
        now: DateTime<Utc>,
    ) -> Result<Vec<Point>, SyncError>
    where
        M: MeasureSource + ?Sized,
        C: CursorSource + ?Sized,
    {
        let mut points = Vec::new();
        for station in stations {
            for module in station.all_modules() {
                points.extend(
                    self.read_module(module, &station.id, source, cursors, now)
                        .await?,
                );
            }
        }
        Ok(points)
    }

    async fn read_module<M, C>(
        &self,
        module: &Module,
        station_id: &str,
        source: &M,
        cursors: &C,
        now: DateTime<Utc>,
    ) -> Result<Vec<Point>, SyncError>
    where
        M: MeasureSource + ?Sized,
        C: CursorSource + ?Sized,
    {
        if module.dashboard.is_none() {
            error!("No data for {}: module '{}' has no dashboard", station_id, module.name);
            debug!("{:?}", module);
            return Ok(vec![]);
        }

        let types = module.measurement_types();
        let Some(reference) = types.first().copied() else {
            info!("    {}: no supported measurement types", module.name);
            return Ok(vec![]);
        };

        let Some(cursor) = cursors
            .latest_timestamp(&module.name, reference.as_str())
            .await?
        else {
            info!(
                "    {}: nothing stored for {} yet, skipping",
                module.name, reference
            );
            return Ok(vec![]);
        };

        let names: Vec<&str> = types.iter().map(MeasurementType::as_str).collect();
        if let Some(since) = cursor.into_zoned(&self.timezone) {
            info!("    {} ({}): {:?}", module.name, since.to_rfc3339(), names);
        }

        let mut points = Vec::new();
        for measurement in types {
            let request = MeasureRequest {
                device_id: station_id.to_string(),
                module_id: module.id.clone(),
                measurement,
                date_begin: cursor,
                date_end: now,
            };
            let series = match source.get_measure(&request).await {
                Ok(Some(series)) => series,
                Ok(None) => {
                    info!("      Measurement is absent for {}", measurement);
                    continue;
                }
                Err(e) => {
                    warn!("      Reading {} of {} failed: {}", measurement, module.name, e);
                    continue;
                }
            };
            if series.is_empty() {
                info!("      No data for {}", measurement);
                continue;
            }

            for sample in series.samples {
                // the cursor itself is already stored
                if sample.epoch <= cursor.timestamp() {
                    continue;
                }
                match sample.value {
                    SampleValue::Number(value) => points.extend(self.point(
                        &module.name,
                        measurement.as_str(),
                        value,
                        sample.epoch,
                    )),
                    SampleValue::Text(text) => debug!(
                        "      Dropping textual {} value '{}' at {}",
                        measurement, text, sample.epoch
                    ),
                    SampleValue::Missing => {}
                }
            }
        }

        points.extend(self.metadata_points(module));
        Ok(points)
    }

    /// Converts the latest dashboard values of every module into points,
    /// without consulting any cursor.
    ///
    /// Field names are the lower-cased dashboard keys; textual entries and the
    /// `date_*` timestamps Netatmo embeds in dashboards are skipped.
    pub fn snapshot_points(&self, stations: &[Station]) -> Vec<Point> {
        let mut points = Vec::new();
        for module in stations.iter().flat_map(Station::all_modules) {
            match module.dashboard.as_ref().map(|d| (d, d.time_utc)) {
                Some((dashboard, Some(time_utc))) => {
                    if let Some(when) = time_utc.into_zoned(&self.timezone) {
                        info!("  {:>12}: {}", module.name, when.to_rfc3339());
                    }
                    for (key, value) in &dashboard.values {
                        let DashboardValue::Number(value) = value else {
                            continue;
                        };
                        if key.starts_with("date_") {
                            continue;
                        }
                        points.extend(self.point(&module.name, &key.to_lowercase(), *value, time_utc));
                    }
                }
                Some((_, None)) => warn!("Dashboard of '{}' has no time_utc", module.name),
                None => warn!("No dashboard data for '{}'", module.name),
            }
            points.extend(self.metadata_points(module));
        }
        points
    }

    fn metadata_points(&self, module: &Module) -> Vec<Point> {
        let mut points = Vec::new();
        for field in MetadataField::ALL {
            let Some(value) = module.metadata(field) else {
                continue;
            };
            match module.status_timestamp() {
                Some(epoch) => points.extend(self.point(&module.name, field.as_str(), value, epoch)),
                None => warn!(
                    "      {} of '{}' has neither last_seen nor last_status_store, dropping",
                    field, module.name
                ),
            }
        }
        points
    }

    fn point(&self, series: &str, field: &str, value: f64, epoch: i64) -> Option<Point> {
        // line protocol has no way to carry a line break in a name
        let line_break = |c: char| c == '\n' || c == '\r';
        if series.contains(line_break) || field.contains(line_break) {
            warn!("Dropping {:?}.{:?}: names must not contain line breaks", series, field);
            return None;
        }
        if !value.is_finite() {
            debug!("Dropping non-finite {}.{} at {}", series, field, epoch);
            return None;
        }
        let Some(time) = epoch.into_zoned(&self.timezone) else {
            warn!("Dropping {}.{}: epoch {} is out of range", series, field, epoch);
            return None;
        };
        Some(
            Point::builder()
                .series(series)
                .field(field)
                .value(value)
                .time(time)
                .build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netatmo::raw::MeasureSample;
    use crate::types::station::{Dashboard, Place};
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const T0: i64 = 1_700_000_000;
    const T1: i64 = 1_700_000_300;
    const T2: i64 = 1_700_000_600;

    /// Netatmo stand-in answering from a table keyed by (module id, type).
    #[derive(Default)]
    struct FakeNetatmo {
        series: HashMap<(String, MeasurementType), Option<MeasureSeries>>,
        failing: Vec<(String, MeasurementType)>,
        requests: Mutex<Vec<MeasureRequest>>,
    }

    impl FakeNetatmo {
        fn with(
            mut self,
            module_id: &str,
            measurement: MeasurementType,
            samples: Option<Vec<(i64, SampleValue)>>,
        ) -> Self {
            let series = samples.map(|samples| MeasureSeries {
                samples: samples
                    .into_iter()
                    .map(|(epoch, value)| MeasureSample { epoch, value })
                    .collect(),
            });
            self.series.insert((module_id.to_string(), measurement), series);
            self
        }

        fn failing(mut self, module_id: &str, measurement: MeasurementType) -> Self {
            self.failing.push((module_id.to_string(), measurement));
            self
        }

        fn requests(&self) -> Vec<MeasureRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MeasureSource for FakeNetatmo {
        async fn get_measure(
            &self,
            request: &MeasureRequest,
        ) -> Result<Option<MeasureSeries>, NetatmoError> {
            self.requests.lock().unwrap().push(request.clone());
            let key = (request.module_id.clone(), request.measurement);
            if self.failing.contains(&key) {
                return Err(NetatmoError::Api {
                    url: "https://api.netatmo.com/api/getmeasure".to_string(),
                    message: "Device not found (code 9)".to_string(),
                });
            }
            Ok(self.series.get(&key).cloned().flatten().map(|series| MeasureSeries {
                // like the API, only return samples inside the window
                samples: series
                    .samples
                    .into_iter()
                    .filter(|s| s.epoch >= request.date_begin.timestamp())
                    .collect(),
            }))
        }
    }

    /// InfluxDB stand-in holding one cursor per (series, field).
    #[derive(Default)]
    struct FakeCursors {
        cursors: HashMap<(String, String), DateTime<Utc>>,
        lookups: Mutex<Vec<(String, String)>>,
    }

    impl FakeCursors {
        fn with(mut self, series: &str, field: &str, epoch: i64) -> Self {
            self.cursors.insert(
                (series.to_string(), field.to_string()),
                Utc.timestamp_opt(epoch, 0).unwrap(),
            );
            self
        }
    }

    #[async_trait]
    impl CursorSource for FakeCursors {
        async fn latest_timestamp(
            &self,
            series: &str,
            field: &str,
        ) -> Result<Option<DateTime<Utc>>, SyncError> {
            let key = (series.to_string(), field.to_string());
            self.lookups.lock().unwrap().push(key.clone());
            Ok(self.cursors.get(&key).copied())
        }
    }

    fn dashboard(values: &[(&str, DashboardValue)]) -> Option<Dashboard> {
        Some(Dashboard {
            time_utc: Some(T2),
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        })
    }

    fn module(id: &str, name: &str, dashboard: Option<Dashboard>) -> Module {
        Module {
            id: id.to_string(),
            name: name.to_string(),
            kind: None,
            dashboard,
            data_types: vec![],
            battery_percent: None,
            wifi_status: None,
            rf_status: None,
            last_seen: None,
            last_status_store: None,
        }
    }

    /// A station whose base unit has no dashboard (relay only) and one
    /// satellite module.
    fn station_with(satellite: Module) -> Station {
        Station {
            id: "70:ee:50:00:00:01".to_string(),
            name: "Home".to_string(),
            place: Place::default(),
            base: module("70:ee:50:00:00:01", "Base", None),
            modules: vec![satellite],
        }
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(chrono_tz::Europe::Berlin)
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(T2 + 60, 0).unwrap()
    }

    fn summary(points: &[Point]) -> Vec<(String, String, f64, i64)> {
        points
            .iter()
            .map(|p| {
                (
                    p.series().to_string(),
                    p.field().to_string(),
                    p.value(),
                    p.time().timestamp(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() -> Result<(), SyncError> {
        let stations = vec![station_with(module(
            "02:00:00:00:00:01",
            "Outdoor",
            dashboard(&[
                ("Temperature", DashboardValue::Number(20.0)),
                ("Humidity", DashboardValue::Number(55.0)),
            ]),
        ))];
        let netatmo = FakeNetatmo::default()
            .with(
                "02:00:00:00:00:01",
                MeasurementType::Temperature,
                Some(vec![
                    (T1, SampleValue::Number(20.5)),
                    (T2, SampleValue::Number(20.7)),
                ]),
            )
            .with("02:00:00:00:00:01", MeasurementType::Humidity, Some(vec![]));
        let cursors = FakeCursors::default().with("Outdoor", "temperature", T0);

        let points = reconciler()
            .interval_points_until(&stations, &netatmo, &cursors, now())
            .await?;

        assert_eq!(
            summary(&points),
            vec![
                ("Outdoor".to_string(), "temperature".to_string(), 20.5, T1),
                ("Outdoor".to_string(), "temperature".to_string(), 20.7, T2),
            ]
        );
        assert_eq!(points[0].time().timezone(), chrono_tz::Europe::Berlin);

        let requests = netatmo.requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.device_id, "70:ee:50:00:00:01");
            assert_eq!(request.date_begin.timestamp(), T0);
            assert_eq!(request.date_end, now());
        }
        // only the reference type is looked up
        assert_eq!(
            *cursors.lookups.lock().unwrap(),
            vec![("Outdoor".to_string(), "temperature".to_string())]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_rerun_after_write_yields_nothing() -> Result<(), SyncError> {
        let stations = vec![station_with(module(
            "m1",
            "Outdoor",
            dashboard(&[("Temperature", DashboardValue::Number(20.0))]),
        ))];
        let netatmo = FakeNetatmo::default().with(
            "m1",
            MeasurementType::Temperature,
            Some(vec![(T1, SampleValue::Number(20.5)), (T2, SampleValue::Number(20.7))]),
        );
        // the store already holds T2
        let cursors = FakeCursors::default().with("Outdoor", "temperature", T2);

        let points = reconciler()
            .interval_points_until(&stations, &netatmo, &cursors, now())
            .await?;
        assert!(points.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_only_supported_types_are_requested() -> Result<(), SyncError> {
        let stations = vec![station_with(module(
            "m1",
            "Indoor",
            dashboard(&[
                ("Temperature", DashboardValue::Number(21.3)),
                ("Pressure", DashboardValue::Number(1.01)),
                ("UnknownSensor", DashboardValue::Text("x".to_string())),
            ]),
        ))];
        let netatmo = FakeNetatmo::default().with(
            "m1",
            MeasurementType::Pressure,
            Some(vec![(T1, SampleValue::Number(1013.0))]),
        );
        let cursors = FakeCursors::default().with("Indoor", "temperature", T0);

        let points = reconciler()
            .interval_points_until(&stations, &netatmo, &cursors, now())
            .await?;

        let requested: Vec<MeasurementType> =
            netatmo.requests().iter().map(|r| r.measurement).collect();
        assert_eq!(
            requested,
            vec![MeasurementType::Temperature, MeasurementType::Pressure]
        );
        assert!(points.iter().all(|p| p.field() != "unknownsensor"));
        assert_eq!(summary(&points), vec![("Indoor".to_string(), "pressure".to_string(), 1013.0, T1)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_textual_samples_are_dropped() -> Result<(), SyncError> {
        let stations = vec![station_with(module(
            "m1",
            "Outdoor",
            dashboard(&[("Temperature", DashboardValue::Number(20.0))]),
        ))];
        let netatmo = FakeNetatmo::default().with(
            "m1",
            MeasurementType::Temperature,
            Some(vec![
                (T1, SampleValue::Text("20.5".to_string())),
                (T2, SampleValue::Number(20.7)),
                (T2 + 10, SampleValue::Missing),
            ]),
        );
        let cursors = FakeCursors::default().with("Outdoor", "temperature", T0);

        let points = reconciler()
            .interval_points_until(&stations, &netatmo, &cursors, now())
            .await?;
        assert_eq!(
            summary(&points),
            vec![("Outdoor".to_string(), "temperature".to_string(), 20.7, T2)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_module_without_cursor_is_skipped() -> Result<(), SyncError> {
        let mut outdoor = module(
            "m1",
            "Outdoor",
            dashboard(&[("Temperature", DashboardValue::Number(20.0))]),
        );
        outdoor.battery_percent = Some(80.0);
        outdoor.last_seen = Some(T1);
        let stations = vec![station_with(outdoor)];
        let netatmo = FakeNetatmo::default().with(
            "m1",
            MeasurementType::Temperature,
            Some(vec![(T1, SampleValue::Number(20.5))]),
        );

        let points = reconciler()
            .interval_points_until(&stations, &netatmo, &FakeCursors::default(), now())
            .await?;
        assert!(points.is_empty());
        assert!(netatmo.requests().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_absent_series_does_not_stop_other_types() -> Result<(), SyncError> {
        let stations = vec![station_with(module(
            "m1",
            "Wind",
            dashboard(&[
                ("WindStrength", DashboardValue::Number(12.0)),
                ("Rain", DashboardValue::Number(0.0)),
            ]),
        ))];
        let netatmo = FakeNetatmo::default()
            .with("m1", MeasurementType::WindStrength, None)
            .with("m1", MeasurementType::Rain, Some(vec![(T1, SampleValue::Number(0.3))]));
        let cursors = FakeCursors::default().with("Wind", "windstrength", T0);

        let points = reconciler()
            .interval_points_until(&stations, &netatmo, &cursors, now())
            .await?;
        assert_eq!(
            summary(&points),
            vec![("Wind".to_string(), "rain".to_string(), 0.3, T1)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_measure_request_does_not_stop_other_types() -> Result<(), SyncError> {
        let stations = vec![station_with(module(
            "m1",
            "Outdoor",
            dashboard(&[
                ("Temperature", DashboardValue::Number(20.0)),
                ("Humidity", DashboardValue::Number(55.0)),
            ]),
        ))];
        let netatmo = FakeNetatmo::default()
            .failing("m1", MeasurementType::Temperature)
            .with("m1", MeasurementType::Humidity, Some(vec![(T1, SampleValue::Number(56.0))]));
        let cursors = FakeCursors::default().with("Outdoor", "temperature", T0);

        let points = reconciler()
            .interval_points_until(&stations, &netatmo, &cursors, now())
            .await?;
        assert_eq!(
            summary(&points),
            vec![("Outdoor".to_string(), "humidity".to_string(), 56.0, T1)]
        );
        assert_eq!(netatmo.requests().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_module_without_dashboard_yields_no_points() -> Result<(), SyncError> {
        let mut relay = module("70:ee:50:00:00:01", "Base", None);
        relay.wifi_status = Some(50.0);
        relay.last_status_store = Some(T1);
        let station = Station {
            id: "70:ee:50:00:00:01".to_string(),
            name: "Home".to_string(),
            place: Place::default(),
            base: relay,
            modules: vec![module(
                "m1",
                "Outdoor",
                dashboard(&[("Temperature", DashboardValue::Number(20.0))]),
            )],
        };
        let netatmo = FakeNetatmo::default().with(
            "m1",
            MeasurementType::Temperature,
            Some(vec![(T1, SampleValue::Number(20.5))]),
        );
        let cursors = FakeCursors::default()
            .with("Base", "temperature", T0)
            .with("Outdoor", "temperature", T0);

        let points = reconciler()
            .interval_points_until(&[station], &netatmo, &cursors, now())
            .await?;
        assert!(points.iter().all(|p| p.series() != "Base"));
        assert_eq!(
            summary(&points),
            vec![("Outdoor".to_string(), "temperature".to_string(), 20.5, T1)]
        );
        // no series was requested for the relay
        assert!(netatmo.requests().iter().all(|r| r.module_id == "m1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_metadata_uses_last_seen_first() -> Result<(), SyncError> {
        let mut outdoor = module(
            "m1",
            "Outdoor",
            dashboard(&[("Temperature", DashboardValue::Number(20.0))]),
        );
        outdoor.battery_percent = Some(80.0);
        outdoor.rf_status = Some(65.0);
        outdoor.last_seen = Some(T1);
        outdoor.last_status_store = Some(T2);
        let stations = vec![station_with(outdoor)];
        let cursors = FakeCursors::default().with("Outdoor", "temperature", T0);

        let points = reconciler()
            .interval_points_until(&stations, &FakeNetatmo::default(), &cursors, now())
            .await?;
        assert_eq!(
            summary(&points),
            vec![
                ("Outdoor".to_string(), "battery_percent".to_string(), 80.0, T1),
                ("Outdoor".to_string(), "rf_status".to_string(), 65.0, T1),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_metadata_falls_back_to_last_status_store() -> Result<(), SyncError> {
        let mut base = module(
            "70:ee:50:00:00:01",
            "Indoor",
            dashboard(&[("CO2", DashboardValue::Number(540.0))]),
        );
        base.wifi_status = Some(56.0);
        base.last_status_store = Some(T2);
        let station = Station {
            id: "70:ee:50:00:00:01".to_string(),
            name: "Home".to_string(),
            place: Place::default(),
            base,
            modules: vec![],
        };
        let cursors = FakeCursors::default().with("Indoor", "co2", T0);

        let points = reconciler()
            .interval_points_until(&[station], &FakeNetatmo::default(), &cursors, now())
            .await?;
        assert_eq!(
            summary(&points),
            vec![("Indoor".to_string(), "wifi_status".to_string(), 56.0, T2)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_order_across_modules() -> Result<(), SyncError> {
        let mut base = module(
            "base",
            "Indoor",
            dashboard(&[
                ("Temperature", DashboardValue::Number(21.0)),
                ("Noise", DashboardValue::Number(40.0)),
            ]),
        );
        base.wifi_status = Some(50.0);
        base.last_status_store = Some(T2);
        let station = Station {
            id: "base".to_string(),
            name: "Home".to_string(),
            place: Place::default(),
            base,
            modules: vec![module(
                "out",
                "Outdoor",
                dashboard(&[("Temperature", DashboardValue::Number(4.0))]),
            )],
        };
        let netatmo = FakeNetatmo::default()
            .with("base", MeasurementType::Temperature, Some(vec![(T1, SampleValue::Number(21.0))]))
            .with("base", MeasurementType::Noise, Some(vec![(T1, SampleValue::Number(40.0))]))
            .with("out", MeasurementType::Temperature, Some(vec![(T2, SampleValue::Number(4.0))]));
        let cursors = FakeCursors::default()
            .with("Indoor", "temperature", T0)
            .with("Outdoor", "temperature", T0);

        let points = reconciler()
            .interval_points_until(&[station], &netatmo, &cursors, now())
            .await?;
        let order: Vec<(&str, &str)> = points.iter().map(|p| (p.series(), p.field())).collect();
        assert_eq!(
            order,
            vec![
                ("Indoor", "temperature"),
                ("Indoor", "noise"),
                ("Indoor", "wifi_status"),
                ("Outdoor", "temperature"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_names_with_line_breaks_are_dropped() {
        let mut garden = module(
            "m",
            "Garden\nshed",
            dashboard(&[("Temperature", DashboardValue::Number(7.5))]),
        );
        garden.battery_percent = Some(90.0);
        garden.last_seen = Some(T1);
        let station = Station {
            id: "base".to_string(),
            name: "Home".to_string(),
            place: Place::default(),
            base: module("base", "Indoor", dashboard(&[("Noise", DashboardValue::Number(38.0))])),
            modules: vec![garden],
        };

        let points = reconciler().snapshot_points(&[station]);
        assert_eq!(
            summary(&points),
            vec![("Indoor".to_string(), "noise".to_string(), 38.0, T2)]
        );
    }

    #[test]
    fn test_snapshot_points() {
        let mut indoor = module(
            "base",
            "Indoor",
            dashboard(&[
                ("Temperature", DashboardValue::Number(21.3)),
                ("temp_trend", DashboardValue::Text("up".to_string())),
                ("date_max_temp", DashboardValue::Number(1_699_990_000.0)),
                ("CO2", DashboardValue::Number(540.0)),
            ]),
        );
        indoor.wifi_status = Some(56.0);
        indoor.last_status_store = Some(T1);
        let station = Station {
            id: "base".to_string(),
            name: "Home".to_string(),
            place: Place::default(),
            base: indoor,
            modules: vec![module("m", "Unreachable", None)],
        };

        let points = reconciler().snapshot_points(&[station]);
        assert_eq!(
            summary(&points),
            vec![
                ("Indoor".to_string(), "temperature".to_string(), 21.3, T2),
                ("Indoor".to_string(), "co2".to_string(), 540.0, T2),
                ("Indoor".to_string(), "wifi_status".to_string(), 56.0, T1),
            ]
        );
    }
}
