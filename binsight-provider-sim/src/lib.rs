//! Simulated bin fleet with deterministic synthetic readings.
//!
//! Serves a fixed set of Panaji-area bins entirely from memory so the
//! frontend and tests can run without the sensor gateway. All readings are
//! derived from the `now` instant handed to [`plugin`], so identical inputs
//! produce identical fleets.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use binsight_core::{
    model::{BinId, BinSnapshot, FleetId, FleetMeta, Reading, SensorStatus},
    plugin::FleetPlugin,
    ports::{BinPort, HistoryPort, PortError},
};

const HISTORY_HOURS: i64 = 8;

/// Seed describing one simulated bin.
struct BinSeed {
    code: &'static str,
    ward: &'static str,
    latitude: f64,
    longitude: f64,
    fill_percent: f64,
    /// Linear fill gain per hour used to back-fill the history.
    fill_rate_per_hour: f64,
    status: SensorStatus,
}

const SEEDS: &[BinSeed] = &[
    BinSeed {
        code: "SIM-01",
        ward: "Mala",
        latitude: 15.5010,
        longitude: 73.8290,
        fill_percent: 85.0,
        fill_rate_per_hour: 1.0,
        status: SensorStatus::Normal,
    },
    BinSeed {
        code: "SIM-02",
        ward: "Fontainhas",
        latitude: 15.4975,
        longitude: 73.8315,
        fill_percent: 62.0,
        fill_rate_per_hour: 2.5,
        status: SensorStatus::Normal,
    },
    BinSeed {
        code: "SIM-03",
        ward: "Miramar",
        latitude: 15.4780,
        longitude: 73.8070,
        fill_percent: 30.0,
        fill_rate_per_hour: 0.4,
        status: SensorStatus::Normal,
    },
    BinSeed {
        code: "SIM-04",
        ward: "Campal",
        latitude: 15.4930,
        longitude: 73.8180,
        fill_percent: 55.0,
        fill_rate_per_hour: 1.2,
        status: SensorStatus::Offline,
    },
    BinSeed {
        code: "SIM-05",
        ward: "Ribandar",
        latitude: 15.5000,
        longitude: 73.8550,
        fill_percent: 95.0,
        fill_rate_per_hour: 0.8,
        status: SensorStatus::Blocked,
    },
];

/// In-memory telemetry backend serving the simulated fleet.
pub struct SimTelemetry {
    meta: FleetMeta,
    bins: Vec<BinSnapshot>,
}

impl SimTelemetry {
    /// Build the simulated fleet with histories anchored at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        let bins = SEEDS
            .iter()
            .map(|seed| BinSnapshot {
                bin_id: BinId(seed.code.to_owned()),
                latitude: seed.latitude,
                longitude: seed.longitude,
                current_fill_percent: seed.fill_percent,
                status: seed.status,
                area_name: Some(seed.ward.to_owned()),
                readings: synth_history(seed, now),
            })
            .collect();

        Self {
            meta: fleet_meta(),
            bins,
        }
    }
}

#[async_trait]
impl BinPort for SimTelemetry {
    fn fleet(&self) -> &FleetMeta {
        &self.meta
    }

    async fn bins(&self) -> Result<Vec<BinSnapshot>, PortError> {
        // Snapshots go out without history attached, matching the gateway
        // providers; readings are served separately below.
        Ok(self
            .bins
            .iter()
            .map(|bin| BinSnapshot {
                readings: Vec::new(),
                ..bin.clone()
            })
            .collect())
    }
}

#[async_trait]
impl HistoryPort for SimTelemetry {
    fn fleet(&self) -> &FleetMeta {
        &self.meta
    }

    async fn recent_readings(
        &self,
        bin_id: &BinId,
        limit: usize,
    ) -> Result<Vec<Reading>, PortError> {
        let bin = self
            .bins
            .iter()
            .find(|snapshot| &snapshot.bin_id == bin_id)
            .ok_or(PortError::BinNotFound)?;

        Ok(bin.readings.iter().copied().take(limit).collect())
    }
}

/// Build the plugin bundle for the simulated fleet.
#[must_use]
pub fn plugin(now: DateTime<Utc>) -> FleetPlugin {
    let telemetry = Arc::new(SimTelemetry::new(now));

    FleetPlugin {
        meta: fleet_meta(),
        bin_port: Arc::clone(&telemetry) as Arc<dyn BinPort>,
        history_port: telemetry,
    }
}

fn fleet_meta() -> FleetMeta {
    FleetMeta {
        id: FleetId(String::from("panaji-sim")),
        name: String::from("Panaji (simulated)"),
    }
}

/// Back-fill an hourly history from the seed's fill level and rate,
/// newest first.
fn synth_history(seed: &BinSeed, now: DateTime<Utc>) -> Vec<Reading> {
    (0..HISTORY_HOURS)
        .map(|hours_back| {
            let fill = seed.fill_percent - seed.fill_rate_per_hour * hours_back as f64;
            let status = if hours_back == 0 {
                seed.status
            } else {
                SensorStatus::Normal
            };

            Reading {
                fill_percent: fill.clamp(0.0, 100.0),
                recorded_at: now - Duration::hours(hours_back),
                status,
            }
        })
        .collect()
}
