use crate::config::ConfigError;
use crate::influx::error::InfluxError;
use crate::netatmo::error::NetatmoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Netatmo(#[from] NetatmoError),

    #[error(transparent)]
    Influx(#[from] InfluxError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
