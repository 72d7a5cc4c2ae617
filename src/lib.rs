//! Probe shield: rejects vulnerability-scanner and reconnaissance requests by
//! request path before they reach the application.

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rules;

pub use config::GatewayConfig;
pub use engine::{BlockStatus, Decision, ProbeShield, RuleSet};
pub use error::ShieldError;
pub use http::{protect, HttpServer, ShieldState};
pub use lifecycle::Shutdown;
