//! Client identifier derivation for block logs.
//!
//! Checked in trust order:
//! 1. `cf-connecting-ip` (set by the edge provider)
//! 2. `x-forwarded-for`, first comma-separated entry only
//! 3. `x-real-ip`
//!
//! Falls back to [`UNKNOWN_CLIENT`]. Header names are case-insensitive
//! through [`HeaderMap`]. The result is only ever logged.

use axum::http::HeaderMap;

pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Sentinel used when no proxy header carries a usable value.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort client identifier.
pub fn client_ip(headers: &HeaderMap) -> String {
    header_value(headers, CF_CONNECTING_IP)
        .or_else(|| {
            header_value(headers, X_FORWARDED_FOR)
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .or_else(|| header_value(headers, X_REAL_IP))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
