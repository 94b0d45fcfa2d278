use binsight_core::model::{
    PredictionResult, PredictionStatus, RoutePointKind, SensorStatus, TriageReason,
};
use chrono::{DateTime, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new("binsight – fill forecasts and collection routes")
        .block(Block::default().borders(Borders::ALL).title("Binsight"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::FleetSelect => draw_fleet_select(frame, app, *content_area),
        Screen::BinBoard => draw_bin_board(frame, app, *content_area),
        Screen::RouteView => draw_route_view(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::FleetSelect => "↑/↓ move · Enter/Space select fleet · q/Ctrl-C quit",
        Screen::BinBoard => {
            "↑/↓ move · r/Enter build route · g refresh · Left/Esc back · q/Ctrl-C quit"
        }
        Screen::RouteView => "Esc/←/b back to bins · q/Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text.to_owned())
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_fleet_select(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = app
        .fleets
        .iter()
        .enumerate()
        .map(|(idx, (_id, name))| {
            let prefix = if idx == app.fleet_list_index {
                "> "
            } else {
                "  "
            };
            ListItem::new(format!("{prefix}{name}"))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select fleet (↑/↓, Enter)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.fleets.is_empty() {
        state.select(Some(app.fleet_list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_bin_board(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let fleet_name = app
        .fleets
        .get(app.fleet_list_index)
        .map_or("<fleet>", |(_, name)| name.as_str());

    let title = format!("Bins in {fleet_name} (r to build a route)");

    if app.is_loading {
        let paragraph = Paragraph::new("Loading bins…")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    if app.bins.is_empty() {
        let paragraph = Paragraph::new("No bins loaded. Press g to refresh.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let now = Utc::now();

    let rows = app.bins.iter().enumerate().map(|(idx, bin)| {
        let ward = bin.area_name.as_deref().unwrap_or("–");
        let fill = format!("{:>5.1} %", bin.current_fill_percent);
        let forecast = forecast_label(app.forecast_for(&bin.bin_id), now);

        let mut style = Style::default().fg(fill_color(bin.current_fill_percent));
        if bin.status != SensorStatus::Normal {
            style = Style::default().fg(status_color(bin.status));
        }
        if idx == app.bin_list_index {
            style = style.add_modifier(Modifier::BOLD);
        }

        Row::new(vec![
            Cell::from(bin.bin_id.0.clone()),
            Cell::from(ward.to_owned()),
            Cell::from(fill),
            Cell::from(status_label(bin.status)),
            Cell::from(forecast),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Min(24),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Bin", "Ward", "Fill", "Sensor", "Forecast"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn draw_route_view(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(route) = app.route.as_ref() else {
        let paragraph = Paragraph::new("No route yet. Press r on the bin board.")
            .block(Block::default().borders(Borders::ALL).title("Route"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let title = format!(
        "Route – {} stops, {} collected, {} skipped (Esc/←/b back)",
        route.meta.total_stops, route.meta.bins_collected, route.meta.bins_skipped
    );

    let rows = route.route_points.iter().enumerate().map(|(idx, point)| {
        let order = format!("{:>2}", idx + 1);
        let position = format!("{:.4}, {:.4}", point.latitude, point.longitude);
        let fill = point
            .fill
            .map_or(String::new(), |value| format!("{value:>5.1} %"));
        let reason = point.reason.map_or("", reason_label);

        let style = match point.kind {
            RoutePointKind::Start => Style::default().fg(Color::Cyan),
            RoutePointKind::CollectionPoint => Style::default(),
            RoutePointKind::End => Style::default().fg(Color::Green),
        };

        Row::new(vec![
            Cell::from(order),
            Cell::from(kind_label(point.kind)),
            Cell::from(point.name.clone()),
            Cell::from(position),
            Cell::from(fill),
            Cell::from(reason),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(3),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Length(18),
        Constraint::Length(9),
        Constraint::Min(18),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["#", "Type", "Stop", "Position", "Fill", "Reason"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn forecast_label(forecast: Option<&PredictionResult>, now: DateTime<Utc>) -> String {
    let Some(forecast) = forecast else {
        return "–".to_owned();
    };

    match forecast.prediction_status {
        PredictionStatus::NotEnoughData => "not enough data".to_owned(),
        PredictionStatus::Offline => "sensor offline".to_owned(),
        PredictionStatus::Blocked => "bin blocked".to_owned(),
        PredictionStatus::Error => "telemetry error".to_owned(),
        PredictionStatus::Valid => match forecast.predicted_overflow_at {
            Some(overflow_at) => format!(
                "overflow {} ({:.2} %/h)",
                relative_hours_label(overflow_at, now),
                forecast.fill_rate_per_hour
            ),
            None => "no overflow risk".to_owned(),
        },
    }
}

fn relative_hours_label(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (target - now).num_minutes();
    match minutes {
        minutes if minutes < 0 => "overdue".to_owned(),
        minutes if minutes < 60 => format!("in {minutes} min"),
        minutes if minutes < 48 * 60 => format!("in {} h", minutes / 60),
        minutes => format!("in {} days", minutes / (24 * 60)),
    }
}

fn status_label(status: SensorStatus) -> &'static str {
    match status {
        SensorStatus::Normal => "ok",
        SensorStatus::Offline => "offline",
        SensorStatus::Blocked => "blocked",
    }
}

fn status_color(status: SensorStatus) -> Color {
    match status {
        SensorStatus::Normal => Color::Green,
        SensorStatus::Offline => Color::DarkGray,
        SensorStatus::Blocked => Color::Red,
    }
}

fn fill_color(fill_percent: f64) -> Color {
    if fill_percent >= 80.0 {
        Color::Red
    } else if fill_percent >= 50.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn kind_label(kind: RoutePointKind) -> &'static str {
    match kind {
        RoutePointKind::Start => "start",
        RoutePointKind::CollectionPoint => "collect",
        RoutePointKind::End => "disposal",
    }
}

fn reason_label(reason: TriageReason) -> &'static str {
    match reason {
        TriageReason::CriticalLevel => "critical level",
        TriageReason::PredictedOverflow => "predicted overflow",
        TriageReason::BlockedSensor => "blocked sensor",
        TriageReason::OfflineNoData => "offline, no data",
        TriageReason::NotFullEnough => "not full enough",
    }
}
