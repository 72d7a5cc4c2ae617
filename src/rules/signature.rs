//! A single path signature.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::ShieldError;

/// How much of the normalized path a signature must cover to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchoring {
    /// `^...$`: the whole path.
    Exact,
    /// `^...`: the start of the path.
    Prefix,
    /// Unanchored: the fragment at any nesting depth.
    Anywhere,
}

impl Anchoring {
    /// Classify a pattern by its shape.
    ///
    /// Used for caller-supplied patterns, which carry no declared anchoring.
    /// A leading inline flag group such as `(?i)` is skipped before looking
    /// for `^`. A trailing `$` counts only when it is not escaped.
    pub fn infer(source: &str) -> Self {
        let body = strip_leading_flags(source);
        if !body.starts_with('^') {
            return Self::Anywhere;
        }
        if ends_with_unescaped_dollar(body) {
            Self::Exact
        } else {
            Self::Prefix
        }
    }
}

impl fmt::Display for Anchoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::Anywhere => "anywhere",
        })
    }
}

fn strip_leading_flags(source: &str) -> &str {
    if let Some(rest) = source.strip_prefix("(?") {
        if let Some(end) = rest.find(')') {
            let flags = &rest[..end];
            if !flags.is_empty() && flags.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
                return &rest[end + 1..];
            }
        }
    }
    source
}

fn ends_with_unescaped_dollar(body: &str) -> bool {
    let Some(head) = body.strip_suffix('$') else {
        return false;
    };
    let backslashes = head.chars().rev().take_while(|&c| c == '\\').count();
    backslashes % 2 == 0
}

/// The probe family a built-in signature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFamily {
    /// Framework and tooling internals (`wp-includes`, `.git`, `vendor/phpunit`).
    FrameworkInternals,
    /// Administrative panels at the site root.
    AdminPanel,
    /// Exploit paths and webshells for specific CMS products.
    CmsExploit,
    /// Configuration and sensitive files.
    SensitiveFile,
    /// Backup copies and archives.
    BackupFile,
    /// Database consoles and shell entry points.
    DatabaseShell,
    /// Login endpoint enumeration.
    AuthEndpoint,
    /// Generic folder and year-folder discovery.
    DirectoryDiscovery,
    /// Supplied by the caller through configuration.
    Custom,
}

impl ProbeFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrameworkInternals => "framework_internals",
            Self::AdminPanel => "admin_panel",
            Self::CmsExploit => "cms_exploit",
            Self::SensitiveFile => "sensitive_file",
            Self::BackupFile => "backup_file",
            Self::DatabaseShell => "database_shell",
            Self::AuthEndpoint => "auth_endpoint",
            Self::DirectoryDiscovery => "directory_discovery",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ProbeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A compiled path signature.
///
/// Two signatures are equal when their pattern source text is identical.
/// Semantically equivalent but differently written patterns are distinct.
#[derive(Debug, Clone)]
pub struct Signature {
    regex: Regex,
    family: ProbeFamily,
    anchoring: Anchoring,
}

impl Signature {
    /// Compile a caller-supplied pattern exactly as written.
    pub fn custom(source: impl AsRef<str>) -> Result<Self, ShieldError> {
        let source = source.as_ref();
        let regex = Regex::new(source).map_err(|e| ShieldError::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })?;
        Ok(Self {
            regex,
            family: ProbeFamily::Custom,
            anchoring: Anchoring::infer(source),
        })
    }

    /// Compile a built-in entry. Built-ins match case-insensitively.
    pub(crate) fn builtin(
        source: &str,
        family: ProbeFamily,
        anchoring: Anchoring,
    ) -> Result<Self, ShieldError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|e| ShieldError::InvalidPattern {
                pattern: source.to_string(),
                source: e,
            })?;
        Ok(Self {
            regex,
            family,
            anchoring,
        })
    }

    /// The pattern source text, as written.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    pub fn family(&self) -> ProbeFamily {
        self.family
    }

    pub fn anchoring(&self) -> Anchoring {
        self.anchoring
    }

    /// Test a normalized path.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

impl Eq for Signature {}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Serializable view of a signature for audit output.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureInfo {
    pub pattern: String,
    pub family: ProbeFamily,
    pub anchoring: Anchoring,
}

impl From<&Signature> for SignatureInfo {
    fn from(sig: &Signature) -> Self {
        Self {
            pattern: sig.source().to_string(),
            family: sig.family(),
            anchoring: sig.anchoring(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_anchoring() {
        assert_eq!(Anchoring::infer("^/secret$"), Anchoring::Exact);
        assert_eq!(Anchoring::infer("^/secret"), Anchoring::Prefix);
        assert_eq!(Anchoring::infer("^/secret(/|$)"), Anchoring::Prefix);
        assert_eq!(Anchoring::infer("/secret"), Anchoring::Anywhere);
        assert_eq!(Anchoring::infer("(?i)^/Secret$"), Anchoring::Exact);
        assert_eq!(Anchoring::infer(r"^/price\$"), Anchoring::Prefix);
        assert_eq!(Anchoring::infer(r"^/path\\$"), Anchoring::Exact);
    }

    #[test]
    fn test_custom_is_case_sensitive() {
        let sig = Signature::custom("^/secret$").unwrap();
        assert!(sig.is_match("/secret"));
        assert!(!sig.is_match("/SECRET"));
        assert_eq!(sig.family(), ProbeFamily::Custom);
    }

    #[test]
    fn test_builtin_is_case_insensitive() {
        let sig = Signature::builtin("^/admin(/|$)", ProbeFamily::AdminPanel, Anchoring::Prefix)
            .unwrap();
        assert!(sig.is_match("/ADMIN"));
    }

    #[test]
    fn test_malformed_pattern_rejected() {
        let err = Signature::custom("^/(unclosed").unwrap_err();
        match err {
            ShieldError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "^/(unclosed"),
        }
    }

    #[test]
    fn test_equality_is_textual() {
        let a = Signature::custom("^/a$").unwrap();
        let b = Signature::custom("^/a$").unwrap();
        let c = Signature::custom("^/[a]$").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
