//! Effective rule list evaluation.
//!
//! # Responsibilities
//! - Hold the composed rule list, frozen after construction
//! - Return the first signature matching a normalized path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins and evaluation stops there
//! - Cheap to clone: the list is behind an `Arc`

use std::sync::Arc;

use crate::error::ShieldError;
use crate::rules::{builtin_signatures, compose, Signature};

/// The effective, ordered rule list.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[Signature]>,
}

impl RuleSet {
    /// Wrap an already composed list.
    pub fn new(rules: Vec<Signature>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    /// Built-ins only.
    pub fn builtin() -> Self {
        Self::new(builtin_signatures().to_vec())
    }

    /// Compile caller patterns and compose them with the built-ins.
    ///
    /// Fails on the first pattern, addition or exclusion, that does not compile.
    pub fn from_patterns<A, E>(additions: A, exclusions: E) -> Result<Self, ShieldError>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let additions = additions
            .into_iter()
            .map(Signature::custom)
            .collect::<Result<Vec<_>, _>>()?;
        let exclusions = exclusions
            .into_iter()
            .map(Signature::custom)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(compose(builtin_signatures(), &additions, &exclusions)))
    }

    /// First signature matching `normalized_path`, in list order.
    pub fn first_match(&self, normalized_path: &str) -> Option<&Signature> {
        self.rules.iter().find(|sig| sig.is_match(normalized_path))
    }

    pub fn is_blocked(&self, normalized_path: &str) -> bool {
        self.first_match(normalized_path).is_some()
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}
