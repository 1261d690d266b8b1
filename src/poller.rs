//! The outer poll loop: read stations, reconcile, write, sleep.

use crate::config::{Config, PollConfig};
use crate::error::SyncError;
use crate::influx::client::InfluxClient;
use crate::netatmo::client::NetatmoClient;
use crate::netatmo::error::NetatmoError;
use crate::reconciler::{CursorSource, MeasureSource, Reconciler};
use crate::types::point::Point;
use crate::types::station::Station;
use async_trait::async_trait;
use bon::bon;
use log::{error, info, warn};

/// How a cycle turns station data into points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Fetch the full history since the last stored point of each module.
    #[default]
    Interval,
    /// Write only the current dashboard values.
    Latest,
}

/// Station topology plus access to its historical series.
pub trait StationSnapshot: MeasureSource {
    fn stations(&self) -> &[Station];
}

/// Produces a fresh [`StationSnapshot`] each cycle.
#[async_trait]
pub trait StationReader: Send + Sync {
    async fn read_station_info(&self) -> Result<Box<dyn StationSnapshot>, NetatmoError>;
}

/// Destination of the points, which also serves the sync cursors.
#[async_trait]
pub trait PointSink: CursorSource {
    async fn write(&self, points: &[Point]) -> Result<usize, SyncError>;
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Points written; zero when nothing new was found.
    Written(usize),
    /// The station could not be read; the cycle was skipped.
    StationUnavailable,
}

pub struct Poller<R, S> {
    reader: R,
    sink: S,
    reconciler: Reconciler,
    poll: PollConfig,
    mode: SyncMode,
}

impl Poller<NetatmoClient, InfluxClient> {
    /// Wires the Netatmo and InfluxDB clients from the configuration.
    pub fn from_config(config: Config, mode: SyncMode) -> Result<Self, SyncError> {
        Ok(Poller::builder()
            .reader(NetatmoClient::new(config.netatmo)?)
            .sink(InfluxClient::new(config.influx))
            .reconciler(Reconciler::new(config.timezone))
            .poll(config.poll)
            .mode(mode)
            .build())
    }
}

#[bon]
impl<R: StationReader, S: PointSink> Poller<R, S> {
    #[builder]
    pub fn new(
        reader: R,
        sink: S,
        reconciler: Reconciler,
        poll: PollConfig,
        mode: Option<SyncMode>,
    ) -> Self {
        Self {
            reader,
            sink,
            reconciler,
            poll,
            mode: mode.unwrap_or_default(),
        }
    }

    /// Runs one read → reconcile → write cycle.
    ///
    /// A failed station read is not an error: it is logged and reported as
    /// [`CycleOutcome::StationUnavailable`]. Store failures are returned.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, SyncError> {
        let data = match self.reader.read_station_info().await {
            Ok(data) => data,
            Err(e) => {
                error!("Reading data from Netatmo server failed: {e}");
                return Ok(CycleOutcome::StationUnavailable);
            }
        };

        let points = match self.mode {
            SyncMode::Interval => {
                self.reconciler
                    .interval_points(data.stations(), &*data, &self.sink)
                    .await?
            }
            SyncMode::Latest => self.reconciler.snapshot_points(data.stations()),
        };

        if points.is_empty() {
            info!("No new records");
            return Ok(CycleOutcome::Written(0));
        }
        let written = self.sink.write(&points).await?;
        Ok(CycleOutcome::Written(written))
    }

    /// Repeats cycles forever, waiting the poll interval between them and the
    /// cooldown after a failed station read. Returns on the first store error.
    pub async fn run(&self) -> Result<(), SyncError> {
        loop {
            let pause = match self.run_cycle().await? {
                CycleOutcome::Written(_) => self.poll.interval,
                CycleOutcome::StationUnavailable => {
                    warn!(
                        "Station unavailable, retrying in {} minutes",
                        self.poll.cooldown.as_secs() / 60
                    );
                    self.poll.cooldown
                }
            };
            tokio::time::sleep(pause).await;
        }
    }

    /// [`Poller::run`] until Ctrl-C. The cycle in flight is abandoned; the
    /// next start recomputes its cursors from the store.
    pub async fn run_until_interrupted(&self) -> Result<(), SyncError> {
        tokio::select! {
            result = self.run() => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                Ok(())
            }
        }
    }
}
