//! High-level service facade combining fleets, forecasting, and routing.

use std::sync::Arc;

use chrono::Utc;

use crate::config::{PredictionPolicy, RoutePolicy};
use crate::model::{
    BinSnapshot, FleetId, GeoPoint, PredictionResult, PredictionStatus, RouteResult,
};
use crate::plugin::FleetRegistry;
use crate::ports::{Forecaster, PortError};
use crate::predict::OverflowPredictor;
use crate::route::RoutePlanner;

/// Telemetry backends cap history fetches at this many readings per bin.
const RECENT_READING_LIMIT: usize = 10;

/// Public entry point for forecasts and collection routes.
pub struct BinsightService {
    registry: Arc<FleetRegistry>,
    forecaster: Arc<dyn Forecaster>,
    planner: RoutePlanner,
}

impl BinsightService {
    /// Create a service bound to the provided registry with default policies.
    #[must_use]
    pub fn new(registry: Arc<FleetRegistry>) -> Self {
        Self::with_policies(registry, PredictionPolicy::default(), RoutePolicy::default())
    }

    /// Create a service with explicit forecasting and routing policies.
    #[must_use]
    pub fn with_policies(
        registry: Arc<FleetRegistry>,
        prediction: PredictionPolicy,
        route: RoutePolicy,
    ) -> Self {
        let forecaster: Arc<dyn Forecaster> = Arc::new(OverflowPredictor::new(prediction));
        let planner = RoutePlanner::new(route, Arc::clone(&forecaster));
        Self {
            registry,
            forecaster,
            planner,
        }
    }

    /// List all available fleets and their display names.
    #[must_use]
    pub fn fleets(&self) -> Vec<(FleetId, String)> {
        self.registry
            .fleets()
            .into_iter()
            .map(|meta| (meta.id, meta.name))
            .collect()
    }

    /// Fetch the latest snapshot of every bin in the fleet.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the fleet is unsupported or the backend
    /// call fails.
    pub async fn bins(&self, fleet: FleetId) -> Result<Vec<BinSnapshot>, PortError> {
        let plugin = self.registry.plugin(&fleet)?;
        plugin.bin_port.bins().await
    }

    /// Forecast overflow for every bin in the fleet.
    ///
    /// A bin whose history fetch fails is reported with the `ERROR` status
    /// instead of failing the whole call; the engines themselves never
    /// produce that status.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the fleet is unsupported or the bin
    /// listing itself fails.
    pub async fn predictions(&self, fleet: FleetId) -> Result<Vec<PredictionResult>, PortError> {
        let plugin = self.registry.plugin(&fleet)?;
        let bins = plugin.bin_port.bins().await?;
        let now = Utc::now();

        let mut results = Vec::with_capacity(bins.len());
        for bin in bins {
            let forecast = match plugin
                .history_port
                .recent_readings(&bin.bin_id, RECENT_READING_LIMIT)
                .await
            {
                Ok(history) => self.forecaster.predict(&bin.bin_id, &history, now),
                Err(_fetch_error) => PredictionResult {
                    bin_id: bin.bin_id,
                    current_fill: bin.current_fill_percent,
                    fill_rate_per_hour: 0.0,
                    predicted_overflow_at: None,
                    prediction_status: PredictionStatus::Error,
                },
            };
            results.push(forecast);
        }

        Ok(results)
    }

    /// Build a collection route for the fleet from the driver's position.
    ///
    /// Snapshots arriving without history get their recent readings
    /// attached before triage.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the fleet is unsupported or a backend
    /// call fails.
    pub async fn collection_route(
        &self,
        fleet: FleetId,
        start: GeoPoint,
    ) -> Result<RouteResult, PortError> {
        let plugin = self.registry.plugin(&fleet)?;
        let mut bins = plugin.bin_port.bins().await?;

        for bin in &mut bins {
            if bin.readings.is_empty() {
                bin.readings = plugin
                    .history_port
                    .recent_readings(&bin.bin_id, RECENT_READING_LIMIT)
                    .await?;
            }
        }

        Ok(self.planner.generate_route(start, &bins, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::model::{BinId, FleetMeta, Reading, RoutePointKind, SensorStatus};
    use crate::plugin::FleetPlugin;
    use crate::ports::{BinPort, HistoryPort};

    struct StubTelemetry {
        meta: FleetMeta,
        bins: Vec<BinSnapshot>,
        failing_bin: Option<BinId>,
    }

    #[async_trait]
    impl BinPort for StubTelemetry {
        fn fleet(&self) -> &FleetMeta {
            &self.meta
        }

        async fn bins(&self) -> Result<Vec<BinSnapshot>, PortError> {
            Ok(self.bins.clone())
        }
    }

    #[async_trait]
    impl HistoryPort for StubTelemetry {
        fn fleet(&self) -> &FleetMeta {
            &self.meta
        }

        async fn recent_readings(
            &self,
            bin_id: &BinId,
            limit: usize,
        ) -> Result<Vec<Reading>, PortError> {
            if self.failing_bin.as_ref() == Some(bin_id) {
                return Err(PortError::Internal("history backend down".to_owned()));
            }

            let bin = self
                .bins
                .iter()
                .find(|snapshot| &snapshot.bin_id == bin_id)
                .ok_or(PortError::BinNotFound)?;
            Ok(bin.readings.iter().copied().take(limit).collect())
        }
    }

    fn snapshot(id: &str, fill: f64, rising_from: Option<f64>) -> BinSnapshot {
        let now = Utc::now();
        let readings = rising_from.map_or_else(Vec::new, |older_fill| {
            vec![
                Reading {
                    fill_percent: fill,
                    recorded_at: now,
                    status: SensorStatus::Normal,
                },
                Reading {
                    fill_percent: older_fill,
                    recorded_at: now - Duration::hours(10),
                    status: SensorStatus::Normal,
                },
            ]
        });

        BinSnapshot {
            bin_id: BinId(id.to_owned()),
            latitude: 15.46,
            longitude: 73.83,
            current_fill_percent: fill,
            status: SensorStatus::Normal,
            area_name: Some("Test Ward".to_owned()),
            readings,
        }
    }

    fn service(bins: Vec<BinSnapshot>, failing_bin: Option<BinId>) -> BinsightService {
        let meta = FleetMeta {
            id: FleetId("test".to_owned()),
            name: "Test Fleet".to_owned(),
        };
        let telemetry = Arc::new(StubTelemetry {
            meta: meta.clone(),
            bins,
            failing_bin,
        });
        let plugin = FleetPlugin {
            meta,
            bin_port: Arc::clone(&telemetry) as Arc<dyn BinPort>,
            history_port: telemetry,
        };
        BinsightService::new(Arc::new(FleetRegistry::new(vec![plugin])))
    }

    #[tokio::test]
    async fn unsupported_fleet_is_rejected() {
        let service = service(Vec::new(), None);

        let result = service.bins(FleetId("nowhere".to_owned())).await;

        assert!(
            matches!(result, Err(PortError::UnsupportedFleet)),
            "unknown fleet must not resolve"
        );
    }

    #[tokio::test]
    async fn history_failure_degrades_to_error_status() {
        let bins = vec![
            snapshot("OK", 60.0, Some(40.0)),
            snapshot("DOWN", 50.0, Some(30.0)),
        ];
        let service = service(bins, Some(BinId("DOWN".to_owned())));

        let results = service
            .predictions(FleetId("test".to_owned()))
            .await
            .expect("listing succeeds");

        let ok = results
            .iter()
            .find(|forecast| forecast.bin_id.0 == "OK")
            .expect("present");
        let down = results
            .iter()
            .find(|forecast| forecast.bin_id.0 == "DOWN")
            .expect("present");

        assert_eq!(ok.prediction_status, PredictionStatus::Valid);
        assert_eq!(down.prediction_status, PredictionStatus::Error);
        assert_eq!(down.current_fill, 50.0, "snapshot fill is still reported");
    }

    #[tokio::test]
    async fn collection_route_runs_end_to_end() {
        let bins = vec![snapshot("A", 90.0, None), snapshot("B", 10.0, None)];
        let service = service(bins, None);

        let route = service
            .collection_route(
                FleetId("test".to_owned()),
                GeoPoint {
                    latitude: 15.458,
                    longitude: 73.834,
                },
            )
            .await
            .expect("route generated");

        let first = route.route_points.first().expect("non-empty");
        let last = route.route_points.last().expect("non-empty");
        assert_eq!(first.kind, RoutePointKind::Start);
        assert_eq!(last.kind, RoutePointKind::End);
        assert_eq!(route.meta.bins_collected, 1, "only the critical bin");
        assert_eq!(route.meta.bins_skipped, 1);
    }
}
