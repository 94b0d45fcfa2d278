//! Bin triage and greedy nearest-neighbor route construction.
//!
//! Single-vehicle, single-pass heuristic: not globally optimal, but O(n²),
//! deterministic, and independent of input order. Real road-network routing
//! is a non-goal.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::config::RoutePolicy;
use crate::model::{
    BinSnapshot, GeoPoint, RouteMeta, RoutePoint, RoutePointKind, RouteResult, SensorStatus,
    TriageReason,
};
use crate::ports::Forecaster;

const EARTH_RADIUS_KM: f64 = 6371.0;
const START_NAME: &str = "Start";

/// Great-circle distance between two points in kilometers (haversine).
#[must_use]
pub fn haversine_distance_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let from_lat = from.latitude.to_radians();
    let to_lat = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + from_lat.cos() * to_lat.cos() * (delta_lon / 2.0).sin().powi(2);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());

    EARTH_RADIUS_KM * angle
}

/// Per-bin inclusion/exclusion decision prior to route construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Triage {
    Collect(TriageReason),
    Skip(TriageReason),
}

/// Single-vehicle route builder over triaged bins.
///
/// Forecasts are consumed only through the injected [`Forecaster`], so an
/// alternate model can be swapped in without changing route construction.
pub struct RoutePlanner {
    policy: RoutePolicy,
    forecaster: Arc<dyn Forecaster>,
}

impl RoutePlanner {
    /// Create a planner with the given policy and forecasting strategy.
    #[must_use]
    pub fn new(policy: RoutePolicy, forecaster: Arc<dyn Forecaster>) -> Self {
        Self { policy, forecaster }
    }

    /// Build a collection route from the driver's position over the given
    /// bins.
    ///
    /// The result always starts with exactly one START point at `start` and
    /// ends with exactly one END point at the disposal station, however many
    /// bins qualify (including none).
    #[must_use]
    pub fn generate_route(
        &self,
        start: GeoPoint,
        bins: &[BinSnapshot],
        now: DateTime<Utc>,
    ) -> RouteResult {
        let mut selected: Vec<(&BinSnapshot, TriageReason)> = Vec::new();
        let mut bins_skipped = 0_usize;

        for bin in bins {
            match self.triage(bin, now) {
                Triage::Collect(reason) => selected.push((bin, reason)),
                Triage::Skip(_reason) => bins_skipped += 1,
            }
        }

        let bins_collected = selected.len();
        let mut route_points = Vec::with_capacity(bins_collected + 2);

        route_points.push(RoutePoint {
            kind: RoutePointKind::Start,
            name: START_NAME.to_owned(),
            latitude: start.latitude,
            longitude: start.longitude,
            reason: None,
            fill: None,
        });

        // Greedy walk: always drive to the closest unvisited bin. The first
        // minimum encountered wins under strict comparison; exact distance
        // ties are not expected with real coordinates, so the tie-break is
        // non-normative.
        let mut position = start;
        let mut remaining = selected;
        while !remaining.is_empty() {
            let mut nearest_index = 0_usize;
            let mut nearest_distance = f64::INFINITY;

            for (index, (bin, _reason)) in remaining.iter().enumerate() {
                let distance = haversine_distance_km(position, bin.location());
                if distance < nearest_distance {
                    nearest_index = index;
                    nearest_distance = distance;
                }
            }

            let (bin, reason) = remaining.remove(nearest_index);
            position = bin.location();

            route_points.push(RoutePoint {
                kind: RoutePointKind::CollectionPoint,
                name: bin.bin_id.to_string(),
                latitude: bin.latitude,
                longitude: bin.longitude,
                reason: Some(reason),
                fill: Some(bin.current_fill_percent),
            });
        }

        route_points.push(RoutePoint {
            kind: RoutePointKind::End,
            name: self.policy.disposal_station_name.clone(),
            latitude: self.policy.disposal_station.latitude,
            longitude: self.policy.disposal_station.longitude,
            reason: None,
            fill: None,
        });

        let meta = RouteMeta {
            total_stops: route_points.len(),
            bins_collected,
            bins_skipped,
        };

        RouteResult { route_points, meta }
    }

    /// Decide whether a single bin is collected on this tour.
    ///
    /// The critical-level check outranks the forecast: a bin already at the
    /// threshold is collected even when its trend alone would not qualify.
    fn triage(&self, bin: &BinSnapshot, now: DateTime<Utc>) -> Triage {
        match bin.status {
            SensorStatus::Blocked => Triage::Skip(TriageReason::BlockedSensor),
            SensorStatus::Offline => Triage::Skip(TriageReason::OfflineNoData),
            SensorStatus::Normal => {
                if bin.current_fill_percent >= self.policy.critical_fill_percent {
                    return Triage::Collect(TriageReason::CriticalLevel);
                }

                let forecast = self.forecaster.predict(&bin.bin_id, &bin.readings, now);
                let cutoff = now + Duration::hours(self.policy.overflow_lookahead_hours);

                match forecast.predicted_overflow_at {
                    Some(overflow_at) if overflow_at <= cutoff => {
                        Triage::Collect(TriageReason::PredictedOverflow)
                    }
                    _ => Triage::Skip(TriageReason::NotFullEnough),
                }
            }
        }
    }
}
