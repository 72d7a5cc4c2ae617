//! Signature subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration time:
//!     builtin.rs (ordered, versioned table)
//!     + additional patterns (caller)
//!     - excluded patterns (caller, exact source text)
//!     → composer.rs
//!     → effective rule list (frozen, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Built-ins have no mutation API; callers only add or exclude
//! - Anchoring is a declared attribute of every built-in
//! - Exclusion compares pattern text, never regex semantics
//! - Malformed caller patterns fail here, never at request time

pub mod builtin;
pub mod composer;
pub mod signature;

pub use builtin::builtin_signatures;
pub use composer::compose;
pub use signature::{Anchoring, ProbeFamily, Signature, SignatureInfo};
