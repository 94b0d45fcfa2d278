//! Registry for all fleet plugins and their ports.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{FleetId, FleetMeta};
use crate::ports::{BinPort, HistoryPort, PortError};

/// Collection of ports implementing telemetry for a single fleet.
pub struct FleetPlugin {
    /// Static metadata describing the fleet.
    pub meta: FleetMeta,
    /// Implementation for listing bin snapshots.
    pub bin_port: Arc<dyn BinPort>,
    /// Implementation for fetching reading histories.
    pub history_port: Arc<dyn HistoryPort>,
}

/// Registry that resolves plugins by fleet identifier.
pub struct FleetRegistry {
    plugins: HashMap<FleetId, FleetPlugin>,
}

impl FleetRegistry {
    /// Build a registry from the provided plugin list.
    #[must_use]
    pub fn new(plugins: Vec<FleetPlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id.clone(), plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Return metadata for all registered fleets.
    #[must_use]
    pub fn fleets(&self) -> Vec<FleetMeta> {
        self.plugins
            .values()
            .map(|plugin| plugin.meta.clone())
            .collect()
    }

    /// Iterator over fleet metadata.
    pub fn fleets_iter(&self) -> impl Iterator<Item = &FleetMeta> {
        self.plugins.values().map(|plugin| &plugin.meta)
    }

    /// Look up a plugin for the given fleet.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedFleet`] when no plugin is registered.
    pub fn plugin(&self, fleet: &FleetId) -> Result<&FleetPlugin, PortError> {
        self.plugins.get(fleet).ok_or(PortError::UnsupportedFleet)
    }
}
