//! Core types, forecasting and routing engines, and service wiring for the
//! binsight waste bin monitor.

/// Fixed collection policy knobs for both engines.
pub mod config;
/// Domain models and identifiers shared by all providers.
pub mod model;
/// Registry and helpers for plugging fleet telemetry backends into the service.
pub mod plugin;
/// Traits describing the telemetry and forecasting interfaces.
pub mod ports;
/// Overflow forecasting from recent fill-level readings.
pub mod predict;
/// Bin triage and collection route construction.
pub mod route;
/// High-level service facade used by clients.
pub mod service;

pub use config::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use predict::*;
pub use route::*;
pub use service::*;
