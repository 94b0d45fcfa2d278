//! Domain data structures for bins, sensor readings, forecasts, and routes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a monitored waste bin.
pub struct BinId(pub String);

impl fmt::Display for BinId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a fleet of bins managed as one deployment.
pub struct FleetId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a fleet and its human-friendly name.
pub struct FleetMeta {
    /// Unique identifier.
    pub id: FleetId,
    /// Localized display name.
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Health state reported by a bin's fill and lid sensors.
pub enum SensorStatus {
    /// Sensor is healthy and reporting plausible values.
    Normal,
    /// Sensor has stopped reporting.
    Offline,
    /// Lid or chute is jammed; fill values are unreliable.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic position in decimal degrees.
pub struct GeoPoint {
    /// Latitude in decimal degrees, north positive.
    pub latitude: f64,
    /// Longitude in decimal degrees, east positive.
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// One timestamped fill-level observation. Immutable once recorded.
pub struct Reading {
    /// Fill level in percent, 0 to 100.
    pub fill_percent: f64,
    /// Instant the sensor recorded this value.
    pub recorded_at: DateTime<Utc>,
    /// Sensor health at recording time.
    pub status: SensorStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Latest known state of a bin plus its recent reading history.
///
/// Transient, assembled per request; the core does not persist it.
pub struct BinSnapshot {
    /// Identifier of the bin.
    pub bin_id: BinId,
    /// Latitude of the bin's location.
    pub latitude: f64,
    /// Longitude of the bin's location.
    pub longitude: f64,
    /// Most recently reported fill level in percent.
    pub current_fill_percent: f64,
    /// Current sensor health.
    pub status: SensorStatus,
    /// Optional name of the area or ward the bin belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    /// Recent readings, newest first.
    pub readings: Vec<Reading>,
}

impl BinSnapshot {
    /// Position of the bin as a [`GeoPoint`].
    #[must_use]
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Outcome taxonomy of an overflow forecast.
pub enum PredictionStatus {
    /// Too few fresh, healthy readings to form a trend.
    NotEnoughData,
    /// Newest reading reports an offline sensor; no forecast is made.
    Offline,
    /// Newest reading reports a blocked bin; no forecast is made.
    Blocked,
    /// Forecast ran; the predicted time may still be absent when the bin
    /// is flat, being emptied, or too far from overflowing.
    Valid,
    /// Upstream data fetch failed. Set by the service layer, never by the
    /// forecasting engine itself.
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Result of forecasting a single bin's overflow.
pub struct PredictionResult {
    /// Identifier of the forecast bin.
    pub bin_id: BinId,
    /// Fill level of the newest reading, in percent.
    pub current_fill: f64,
    /// Modeled linear fill rate in percentage points per hour.
    pub fill_rate_per_hour: f64,
    /// Forecast instant the bin reaches 100 percent, when one was made.
    pub predicted_overflow_at: Option<DateTime<Utc>>,
    /// Why a forecast was or was not produced.
    pub prediction_status: PredictionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Role of a stop within a generated route.
pub enum RoutePointKind {
    /// Driver's starting position.
    Start,
    /// A bin to be emptied.
    CollectionPoint,
    /// The disposal station terminating the route.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Why a bin was selected for, or excluded from, collection.
pub enum TriageReason {
    /// Fill level at or above the critical threshold.
    CriticalLevel,
    /// Forecast to overflow within the lookahead window.
    PredictedOverflow,
    /// Excluded: bin reports a blocked lid or chute.
    BlockedSensor,
    /// Excluded: sensor is offline, no trustworthy data.
    OfflineNoData,
    /// Excluded: neither critical nor forecast to overflow soon.
    NotFullEnough,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Single stop on a generated collection route.
pub struct RoutePoint {
    /// Role of this stop.
    #[serde(rename = "type")]
    pub kind: RoutePointKind,
    /// Display name: bin identifier, or a label for start/end stops.
    pub name: String,
    /// Latitude of the stop.
    pub latitude: f64,
    /// Longitude of the stop.
    pub longitude: f64,
    /// Selection reason, present on collection points only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<TriageReason>,
    /// Fill level of the bin, present on collection points only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
/// Counters summarizing a generated route.
pub struct RouteMeta {
    /// Total stops including the start and end points.
    pub total_stops: usize,
    /// Number of bins selected for collection.
    pub bins_collected: usize,
    /// Number of bins considered but not collected.
    pub bins_skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ordered collection route plus summary counters.
pub struct RouteResult {
    /// Stops in driving order, starting at the driver position and ending
    /// at the disposal station.
    pub route_points: Vec<RoutePoint>,
    /// Summary counters.
    pub meta: RouteMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_enums_serialize_screaming_snake_case() {
        let status = serde_json::to_string(&PredictionStatus::NotEnoughData).expect("serialize");
        assert_eq!(status, "\"NOT_ENOUGH_DATA\"");

        let kind = serde_json::to_string(&RoutePointKind::CollectionPoint).expect("serialize");
        assert_eq!(kind, "\"COLLECTION_POINT\"");

        let reason = serde_json::to_string(&TriageReason::OfflineNoData).expect("serialize");
        assert_eq!(reason, "\"OFFLINE_NO_DATA\"");
    }

    #[test]
    fn route_point_omits_absent_optionals() {
        let start = RoutePoint {
            kind: RoutePointKind::Start,
            name: "Start".to_owned(),
            latitude: 15.458,
            longitude: 73.834,
            reason: None,
            fill: None,
        };

        let json = serde_json::to_value(&start).expect("serialize");
        assert_eq!(json["type"], "START");
        assert!(json.get("reason").is_none(), "reason must be omitted");
        assert!(json.get("fill").is_none(), "fill must be omitted");
    }

    #[test]
    fn collection_point_carries_reason_and_fill() {
        let stop = RoutePoint {
            kind: RoutePointKind::CollectionPoint,
            name: "BIN-A".to_owned(),
            latitude: 15.46,
            longitude: 73.83,
            reason: Some(TriageReason::CriticalLevel),
            fill: Some(90.0),
        };

        let json = serde_json::to_value(&stop).expect("serialize");
        assert_eq!(json["reason"], "CRITICAL_LEVEL");
        assert_eq!(json["fill"], 90.0);
    }
}
