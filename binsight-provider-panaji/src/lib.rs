//! Telemetry provider for Panaji using the smart-city sensor gateway API.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use binsight_core::{
    model::{BinId, BinSnapshot, FleetId, FleetMeta, Reading, SensorStatus},
    plugin::FleetPlugin,
    ports::{BinPort, HistoryPort, PortError},
};

const BASE_URL: &str = "https://sensors.smartcitypanaji.in/api/v1";

/// Response wrapper from /bins
#[derive(Debug, Deserialize)]
struct BinsResponse {
    data: Vec<BinEntry>,
}

/// Single bin entry from /bins
#[derive(Debug, Deserialize)]
struct BinEntry {
    bin_code: String,
    latitude: f64,
    longitude: f64,
    fill_percent: f64,
    status: String, // "NORMAL", "OFFLINE", "BLOCKED"

    #[serde(default)]
    ward: Option<String>,
}

/// Response wrapper from /bins/{code}/readings
#[derive(Debug, Deserialize)]
struct ReadingsResponse {
    data: Vec<ReadingEntry>,
}

/// Single reading from /bins/{code}/readings
#[derive(Debug, Deserialize)]
struct ReadingEntry {
    fill_percent: f64,
    recorded_at: String, // RFC 3339
    status: String,
}

/// Bin listing implementation for Panaji.
pub struct PanajiBinPort {
    client: Client,
    meta: FleetMeta,
}

impl PanajiBinPort {
    /// Create a new bin port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            meta: fleet_meta(),
        }
    }
}

#[async_trait]
impl BinPort for PanajiBinPort {
    fn fleet(&self) -> &FleetMeta {
        &self.meta
    }

    async fn bins(&self) -> Result<Vec<BinSnapshot>, PortError> {
        let resp =
            fetch_json::<BinsResponse>(self.client.get(format!("{BASE_URL}/bins"))).await?;

        let mut snapshots = Vec::with_capacity(resp.data.len());

        for entry in resp.data {
            let status = map_status(&entry.status)?;

            // History is served by the readings endpoint; snapshots carry
            // only the latest state.
            snapshots.push(BinSnapshot {
                bin_id: BinId(entry.bin_code),
                latitude: entry.latitude,
                longitude: entry.longitude,
                current_fill_percent: entry.fill_percent,
                status,
                area_name: entry.ward,
                readings: Vec::new(),
            });
        }

        snapshots.sort_by(|left, right| left.bin_id.0.cmp(&right.bin_id.0));

        Ok(snapshots)
    }
}

/// Reading history implementation for Panaji.
pub struct PanajiHistoryPort {
    client: Client,
    meta: FleetMeta,
}

impl PanajiHistoryPort {
    /// Create a new history port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            meta: fleet_meta(),
        }
    }
}

#[async_trait]
impl HistoryPort for PanajiHistoryPort {
    fn fleet(&self) -> &FleetMeta {
        &self.meta
    }

    async fn recent_readings(
        &self,
        bin_id: &BinId,
        limit: usize,
    ) -> Result<Vec<Reading>, PortError> {
        if bin_id.0.trim().is_empty() {
            return Err(PortError::InvalidBinId);
        }

        let req = self
            .client
            .get(format!("{BASE_URL}/bins/{}/readings", bin_id.0))
            .query(&[("limit", limit.to_string())]);

        let resp = fetch_json::<ReadingsResponse>(req).await?;

        to_recent_readings(resp.data, limit)
    }
}

/// Build the plugin bundle for the Panaji provider.
#[must_use]
pub fn plugin(client: Client) -> FleetPlugin {
    let bin_port = Arc::new(PanajiBinPort::new(client.clone()));
    let history_port = Arc::new(PanajiHistoryPort::new(client));

    FleetPlugin {
        meta: fleet_meta(),
        bin_port,
        history_port,
    }
}

fn fleet_meta() -> FleetMeta {
    FleetMeta {
        id: FleetId(String::from("panaji")),
        name: String::from("Panaji"),
    }
}

/// Map gateway status strings to the `SensorStatus` enum.
fn map_status(raw: &str) -> Result<SensorStatus, PortError> {
    match raw.to_uppercase().as_str() {
        "NORMAL" => Ok(SensorStatus::Normal),
        "OFFLINE" => Ok(SensorStatus::Offline),
        "BLOCKED" => Ok(SensorStatus::Blocked),
        _ => Err(PortError::UnknownStatus(raw.to_owned())),
    }
}

/// Parse, order newest first, and cap the gateway's reading list.
///
/// The forecasting engine's contract is newest-first input; the gateway
/// does not document an ordering, so it is enforced here.
fn to_recent_readings(
    entries: Vec<ReadingEntry>,
    limit: usize,
) -> Result<Vec<Reading>, PortError> {
    let mut readings = Vec::with_capacity(entries.len());

    for entry in entries {
        let recorded_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&entry.recorded_at)
            .map_err(PortError::from)?
            .with_timezone(&Utc);

        readings.push(Reading {
            fill_percent: entry.fill_percent,
            recorded_at,
            status: map_status(&entry.status)?,
        });
    }

    readings.sort_by_key(|reading| Reverse(reading.recorded_at));
    readings.truncate(limit);

    Ok(readings)
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
