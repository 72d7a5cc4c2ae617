//! HTTP host integration.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → middleware.rs (shield: Allow → next, Block → status + empty body)
//!     → server.rs forward handler → upstream application
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{probe_shield_middleware, protect, ShieldState};
pub use server::HttpServer;
