//! Collection policy knobs shared by the forecasting and routing engines.
//!
//! The defaults carry the fixed production values; tests construct variants
//! with different thresholds.

use crate::model::GeoPoint;

#[derive(Debug, Clone)]
/// Tuning values for linear trend extrapolation.
pub struct PredictionPolicy {
    /// Minimum number of fresh, healthy readings needed to form a trend.
    pub min_trend_readings: usize,
    /// Readings older than this many hours are ignored.
    pub freshness_window_hours: i64,
    /// Forecasts further out than this many hours are suppressed.
    pub max_horizon_hours: f64,
    /// Fill jump in percentage points treated as a dumping event rather
    /// than a filling trend...
    pub anomaly_jump_percent: f64,
    /// ...when it happened within less than this many hours.
    pub anomaly_window_hours: f64,
}

impl Default for PredictionPolicy {
    fn default() -> Self {
        Self {
            min_trend_readings: 2,
            freshness_window_hours: 48,
            max_horizon_hours: 168.0,
            anomaly_jump_percent: 30.0,
            anomaly_window_hours: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
/// Tuning values for bin triage and route construction.
pub struct RoutePolicy {
    /// Bins at or above this fill percentage are always collected.
    pub critical_fill_percent: f64,
    /// Bins forecast to overflow within this many hours are collected.
    pub overflow_lookahead_hours: i64,
    /// Fixed terminal stop of every route.
    pub disposal_station: GeoPoint,
    /// Display name of the disposal station stop.
    pub disposal_station_name: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            critical_fill_percent: 80.0,
            overflow_lookahead_hours: 24,
            disposal_station: GeoPoint {
                latitude: 15.456,
                longitude: 73.830,
            },
            disposal_station_name: String::from("Disposal Station"),
        }
    }
}
