//! Matcher and decision engine.
//!
//! # Data Flow
//! ```text
//! Per request:
//!     raw path
//!     → normalize.rs (collapse repeated '/')
//!     → matcher.rs (first matching signature, short-circuit)
//!     → decision.rs (Allow | Block(status))
//!     → optional BlockRecord for logging (client_ip.rs, blocks only)
//! ```
//!
//! # Design Decisions
//! - Stateless across requests; the rule set is read-only
//! - Normalization is unconditional, whatever the host already did
//! - Logging data is computed only for blocks and never feeds the decision

pub mod client_ip;
pub mod decision;
pub mod matcher;
pub mod normalize;

use axum::http::HeaderMap;

use crate::config::ShieldConfig;
use crate::error::ShieldError;
use crate::rules::{ProbeFamily, Signature};

use self::client_ip::client_ip;

pub use decision::{BlockStatus, Decision, InvalidBlockStatus};
pub use matcher::RuleSet;
pub use normalize::normalize_path;

/// Data for the log line emitted when a request is blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    pub client_ip: String,
    pub method: String,
    pub path: String,
    pub pattern: String,
}

/// Result of inspecting a request: the decision plus, for blocks with
/// logging enabled, the record to log.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub decision: Decision,
    pub record: Option<BlockRecord>,
    pub family: Option<ProbeFamily>,
}

/// A configured shield: effective rule list, block status, logging switch.
#[derive(Debug, Clone)]
pub struct ProbeShield {
    rules: RuleSet,
    status: BlockStatus,
    log_blocked: bool,
}

impl ProbeShield {
    pub fn new(rules: RuleSet, status: BlockStatus, log_blocked: bool) -> Self {
        Self {
            rules,
            status,
            log_blocked,
        }
    }

    /// Build from the `[shield]` configuration section.
    pub fn from_config(config: &ShieldConfig) -> Result<Self, ShieldError> {
        let rules = RuleSet::from_patterns(&config.additional_patterns, &config.excluded_patterns)?;
        Ok(Self::new(rules, config.block_status, config.log_blocked))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn status(&self) -> BlockStatus {
        self.status
    }

    pub fn log_blocked(&self) -> bool {
        self.log_blocked
    }

    /// First signature matching `raw_path` after normalization.
    pub fn explain(&self, raw_path: &str) -> Option<&Signature> {
        self.rules.first_match(&normalize_path(raw_path))
    }

    /// Decide on a raw request path.
    pub fn decide(&self, raw_path: &str) -> Decision {
        if self.explain(raw_path).is_some() {
            Decision::Block(self.status)
        } else {
            Decision::Allow
        }
    }

    /// Decide on a request and build its log record if one is due.
    pub fn inspect(&self, method: &str, raw_path: &str, headers: &HeaderMap) -> Verdict {
        let path = normalize_path(raw_path);
        let Some(sig) = self.rules.first_match(&path) else {
            return Verdict {
                decision: Decision::Allow,
                record: None,
                family: None,
            };
        };

        let record = self.log_blocked.then(|| BlockRecord {
            client_ip: client_ip(headers),
            method: method.to_string(),
            path: path.to_string(),
            pattern: sig.source().to_string(),
        });

        Verdict {
            decision: Decision::Block(self.status),
            record,
            family: Some(sig.family()),
        }
    }
}

impl Default for ProbeShield {
    fn default() -> Self {
        Self::new(RuleSet::builtin(), BlockStatus::default(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shield() -> ProbeShield {
        ProbeShield::default()
    }

    #[test]
    fn test_anchoring_regressions() {
        let s = shield();
        let blocked = BlockStatus::Gone;
        for path in ["/admin", "/blog", "/wp-admin", "/foo/wp-admin/index.php", "/2017", "/2024"] {
            assert_eq!(s.decide(path), Decision::Block(blocked), "{path} should block");
        }
        for path in ["/api/admin", "/blogs", "/abcd", "/12345"] {
            assert_eq!(s.decide(path), Decision::Allow, "{path} should pass");
        }
    }

    #[test]
    fn test_year_folder_is_ascii_only() {
        let s = shield();
        assert!(s.decide("/2024/").is_blocked());
        assert_eq!(s.decide("/\u{0662}\u{0660}\u{0662}\u{0664}"), Decision::Allow);
        assert_eq!(s.decide("/\u{0968}\u{0966}\u{0968}\u{096A}"), Decision::Allow);
    }

    #[test]
    fn test_duplicate_separator_bypass() {
        let s = shield();
        assert_eq!(s.decide("//blog"), s.decide("/blog"));
        assert_eq!(s.decide("///admin"), s.decide("/admin"));
        assert!(s.decide("//blog").is_blocked());
    }

    #[test]
    fn test_nested_config_file_allowed() {
        let s = shield();
        assert!(s.decide("/config.json").is_blocked());
        assert!(!s.decide("/api/v1/config.json").is_blocked());
    }

    #[test]
    fn test_common_application_paths_allowed() {
        let s = shield();
        for path in ["/", "/api/users", "/static/app.js", "/login", "/health", "/robots.txt"] {
            assert_eq!(s.decide(path), Decision::Allow, "{path} should pass");
        }
    }

    #[test]
    fn test_custom_status() {
        let s = ProbeShield::new(RuleSet::builtin(), BlockStatus::Forbidden, true);
        assert_eq!(s.decide("/admin"), Decision::Block(BlockStatus::Forbidden));
    }

    #[test]
    fn test_inspect_builds_record() {
        let s = shield();
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.9".parse().unwrap());
        let v = s.inspect("GET", "//wp-admin", &headers);
        assert!(v.decision.is_blocked());
        let record = v.record.unwrap();
        assert_eq!(record.client_ip, "203.0.113.9");
        assert_eq!(record.method, "GET");
        assert_eq!(record.path, "/wp-admin");
        assert_eq!(record.pattern, r"/wp-(admin|includes|content|json)(/|$)");
    }

    #[test]
    fn test_inspect_without_logging() {
        let s = ProbeShield::new(RuleSet::builtin(), BlockStatus::Gone, false);
        let v = s.inspect("GET", "/admin", &HeaderMap::new());
        assert!(v.decision.is_blocked());
        assert!(v.record.is_none());
    }

    #[test]
    fn test_inspect_allow_has_no_record() {
        let v = shield().inspect("POST", "/api/admin", &HeaderMap::new());
        assert_eq!(v.decision, Decision::Allow);
        assert!(v.record.is_none());
        assert!(v.family.is_none());
    }

    #[test]
    fn test_from_config_rejects_bad_addition() {
        let config = ShieldConfig {
            additional_patterns: vec!["^/(".to_string()],
            ..ShieldConfig::default()
        };
        assert!(ProbeShield::from_config(&config).is_err());
    }
}
