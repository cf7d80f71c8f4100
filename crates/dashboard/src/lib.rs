//! Interest prediction dashboard
//!
//! HTTP front end over a single shared [`interest_predictor::Predictor`]:
//! HTML form and result card, batch table, model diagnostics and a JSON API.

pub mod config;
pub mod render;
pub mod server;
pub mod telemetry;

pub use config::DashboardConfig;
pub use server::{build_router, start_server, AppState, SharedState};
