mod config;
mod error;
mod influx;
mod netatmo;
mod poller;
mod reconciler;
mod types;
mod utils;

pub use config::*;
pub use error::SyncError;
pub use poller::*;
pub use reconciler::*;

pub use influx::client::InfluxClient;
pub use influx::error::InfluxError;
pub use influx::line_protocol::{encode_batch, encode_point};
pub use netatmo::auth::Credentials;
pub use netatmo::client::{NetatmoClient, WeatherStationData};
pub use netatmo::error::NetatmoError;
pub use netatmo::raw::{MeasureSample, MeasureSeries, SampleValue};

pub use types::into_zoned_trait::IntoZonedDateTime;
pub use types::measurement_type::{MeasurementType, MetadataField};
pub use types::point::Point;
pub use types::station::*;
