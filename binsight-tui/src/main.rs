//! Terminal UI for binsight that shows fleet fill forecasts and builds
//! collection routes.

mod app;
mod input;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use binsight_core::{model::GeoPoint, plugin::FleetRegistry, service::BinsightService};
use binsight_provider_panaji as panaji;
use binsight_provider_sim as sim;
use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;

use crate::app::App;
use crate::input::Action;

/// Depot the collection vehicle starts every route from.
const DEPOT: GeoPoint = GeoPoint {
    latitude: 15.458,
    longitude: 73.834,
};

#[tokio::main]
async fn main() -> Result<()> {
    // HTTP + service setup
    let client = Client::builder().user_agent("binsight/0.1").build()?;

    let plugins = vec![panaji::plugin(client), sim::plugin(Utc::now())];
    let registry = Arc::new(FleetRegistry::new(plugins));
    let service = Arc::new(BinsightService::new(registry));

    // App state
    let app = App::new(service);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::LoadFleet => {
                    let Some(fleet) = app.selected_fleet.clone() else {
                        app.error_message = Some("Select a fleet first".into());
                        continue;
                    };

                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let bins = app.service.bins(fleet.clone()).await;
                    let forecasts = app.service.predictions(fleet).await;

                    app.is_loading = false;
                    match (bins, forecasts) {
                        (Ok(bins), Ok(forecasts)) => {
                            app.bins = bins;
                            app.set_forecasts(forecasts);
                            app.bin_list_index = 0;
                            app.route = None;
                        }
                        (Err(err), _) | (_, Err(err)) => {
                            app.error_message = Some(format!("Failed to load fleet: {err}"));
                        }
                    }
                }
                Action::GenerateRoute => {
                    let Some(fleet) = app.selected_fleet.clone() else {
                        app.error_message = Some("Select a fleet first".into());
                        continue;
                    };

                    if app.bins.is_empty() {
                        app.error_message =
                            Some("No bins loaded yet (press g to refresh)".into());
                        continue;
                    }

                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = app.service.collection_route(fleet, DEPOT).await;

                    app.is_loading = false;
                    match res {
                        Ok(route) => {
                            app.show_route(route);
                        }
                        Err(err) => {
                            app.error_message = Some(format!("Failed to build route: {err}"));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
