//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Middleware decisions:
//!     → logging.rs (structured block records)
//!     → metrics.rs (allow/block counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - A failed or disabled log never changes a decision
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
