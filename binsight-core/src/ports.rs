//! Traits describing telemetry backends and the forecasting seam.

use async_trait::async_trait;
use chrono::ParseError as ChronoParseError;
use chrono::{DateTime, Utc};
use reqwest::Error as ReqwestError;

use crate::model::{BinId, BinSnapshot, FleetMeta, PredictionResult, Reading};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to telemetry backends.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Failed to parse a timestamp from the backend response.
    #[error("Parse error: {0}")]
    Parse(#[from] ChronoParseError),
    /// Requested bin could not be found.
    #[error("Bin not found")]
    BinNotFound,
    /// The fleet has no registered plugin.
    #[error("Unsupported fleet")]
    UnsupportedFleet,
    /// Bin identifier is invalid for the backend.
    #[error("Invalid bin id")]
    InvalidBinId,
    /// Backend reported a sensor status the core does not know.
    #[error("Unknown sensor status: {0}")]
    UnknownStatus(String),
    /// Internal backend error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Strategy interface for overflow forecasting.
///
/// Route construction consumes forecasts only through this trait, so an
/// alternate model can be substituted without touching the planner.
pub trait Forecaster: Send + Sync {
    /// Forecast when the bin will overflow given its recent readings.
    ///
    /// `history` is expected newest first; implementations must tolerate
    /// unordered input. `now` anchors freshness filtering so identical
    /// inputs always produce identical results.
    fn predict(&self, bin_id: &BinId, history: &[Reading], now: DateTime<Utc>)
    -> PredictionResult;
}

#[async_trait]
/// Trait for backends listing the bins of a fleet.
pub trait BinPort: Send + Sync {
    /// Metadata describing the fleet handled by this port.
    fn fleet(&self) -> &FleetMeta;

    /// Fetch the latest known snapshot of every bin in the fleet.
    ///
    /// Snapshots may arrive without history attached; callers fetch
    /// readings separately through a [`HistoryPort`].
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend request fails.
    async fn bins(&self) -> Result<Vec<BinSnapshot>, PortError>;
}

#[async_trait]
/// Trait for backends serving per-bin reading history.
pub trait HistoryPort: Send + Sync {
    /// Metadata describing the fleet handled by this port.
    fn fleet(&self) -> &FleetMeta;

    /// Fetch the most recent readings for a bin, newest first, at most
    /// `limit` entries.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend request fails or the bin
    /// is unknown.
    async fn recent_readings(
        &self,
        bin_id: &BinId,
        limit: usize,
    ) -> Result<Vec<Reading>, PortError>;
}
