use std::collections::HashMap;
use std::sync::Arc;

use binsight_core::{
    model::{BinId, BinSnapshot, FleetId, PredictionResult, RouteResult},
    service::BinsightService,
};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Screen {
    FleetSelect,
    BinBoard,
    RouteView,
}

pub(crate) struct App {
    pub service: Arc<BinsightService>,

    pub screen: Screen,
    pub fleets: Vec<(FleetId, String)>,
    pub fleet_list_index: usize,
    pub selected_fleet: Option<FleetId>,

    pub bins: Vec<BinSnapshot>,
    pub bin_list_index: usize,
    pub forecasts: HashMap<BinId, PredictionResult>,

    pub route: Option<RouteResult>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<BinsightService>) -> Self {
        let mut fleets = service.fleets();
        // Registry order is a hash map's; keep the menu stable.
        fleets.sort_by(|left, right| left.1.cmp(&right.1));

        Self {
            service,
            screen: Screen::FleetSelect,
            fleets,
            fleet_list_index: 0,
            selected_fleet: None,
            bins: Vec::new(),
            bin_list_index: 0,
            forecasts: HashMap::new(),
            route: None,
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn select_current_fleet(&mut self) -> bool {
        if let Some((id, _name)) = self.fleets.get(self.fleet_list_index) {
            self.selected_fleet = Some(id.clone());
            self.screen = Screen::BinBoard;
            true
        } else {
            false
        }
    }

    pub(crate) fn set_forecasts(&mut self, forecasts: Vec<PredictionResult>) {
        self.forecasts = forecasts
            .into_iter()
            .map(|forecast| (forecast.bin_id.clone(), forecast))
            .collect();
    }

    pub(crate) fn forecast_for(&self, bin_id: &BinId) -> Option<&PredictionResult> {
        self.forecasts.get(bin_id)
    }

    pub(crate) fn show_route(&mut self, route: RouteResult) {
        self.route = Some(route);
        self.screen = Screen::RouteView;
    }
}
