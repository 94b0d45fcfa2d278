use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.bins`(...) and `service.predictions`(...) for the selected fleet
    LoadFleet,
    /// Run `service.collection_route`(...) from the depot
    GenerateRoute,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Enter, Esc, Left, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::FleetSelect => match key.code {
            Up | Char('k') => {
                if app.fleet_list_index > 0 {
                    app.fleet_list_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.fleet_list_index + 1 < app.fleets.len() {
                    app.fleet_list_index += 1;
                }
            }
            Enter | Char(' ') => {
                if app.select_current_fleet() {
                    action = Action::LoadFleet;
                }
            }
            _ => {}
        },

        Screen::BinBoard => match key.code {
            Up | Char('k') => {
                if app.bin_list_index > 0 {
                    app.bin_list_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.bin_list_index + 1 < app.bins.len() {
                    app.bin_list_index += 1;
                }
            }
            Enter | Char('r') => {
                action = Action::GenerateRoute;
            }
            Char('g') => {
                action = Action::LoadFleet;
            }
            Left | Esc => {
                app.screen = Screen::FleetSelect;
                app.bins.clear();
                app.forecasts.clear();
                app.bin_list_index = 0;
                app.route = None;
            }
            _ => {}
        },

        Screen::RouteView => match key.code {
            Left | Esc | Char('b') => {
                app.screen = Screen::BinBoard;
            }
            _ => {}
        },
    }
    action
}
