//! Built-in signature table.
//!
//! The table is a flat list evaluated top to bottom. Every entry declares its
//! [`Anchoring`] next to the pattern, and a unit test checks that the
//! declaration agrees with the pattern's shape.
//!
//! Root-level resources (config files, admin panels, folder names) are
//! anchored at the start so the same name nested under an application
//! namespace like `/api/...` stays reachable. Attack signatures that are
//! meaningful at any depth (CMS internals, webshells, VCS metadata, dotfiles)
//! are left unanchored.

use once_cell::sync::Lazy;

use crate::rules::signature::{Anchoring, ProbeFamily, Signature};

/// One row of the built-in table.
pub struct BuiltinSignature {
    pub family: ProbeFamily,
    pub anchoring: Anchoring,
    pub pattern: &'static str,
}

const fn sig(family: ProbeFamily, anchoring: Anchoring, pattern: &'static str) -> BuiltinSignature {
    BuiltinSignature {
        family,
        anchoring,
        pattern,
    }
}

use Anchoring::{Anywhere, Exact, Prefix};
use ProbeFamily::*;

/// The built-in signatures, in evaluation order.
pub static BUILTIN_SIGNATURES: &[BuiltinSignature] = &[
    // ---- Framework internals -------------------------------------------
    sig(FrameworkInternals, Anywhere, r"/wp-(admin|includes|content|json)(/|$)"),
    sig(FrameworkInternals, Anywhere, r"/(wp-login|wp-signup|wp-cron|xmlrpc)\.php"),
    sig(FrameworkInternals, Anywhere, r"/\.(git|svn|hg|bzr)(/|$)"),
    sig(FrameworkInternals, Anywhere, r"/vendor/phpunit/"),
    sig(FrameworkInternals, Anywhere, r"/cgi-bin/"),
    sig(FrameworkInternals, Anywhere, r"/_ignition/"),
    sig(FrameworkInternals, Prefix, r"^/(actuator|_profiler|telescope|debug/default)(/|$)"),
    // ---- Admin panels ----------------------------------------------------
    sig(AdminPanel, Prefix, r"^/(admin|administrator|adm|webadmin|siteadmin|cpanel|whm)(/|$)"),
    sig(AdminPanel, Prefix, r"^/manager/(html|text)(/|$)"),
    sig(AdminPanel, Prefix, r"^/(owa|ecp|boaform|hnap1)(/|$)"),
    // ---- CMS-specific exploit paths -------------------------------------
    sig(CmsExploit, Anywhere, r"/components/com_[a-z0-9_]+"),
    sig(CmsExploit, Anywhere, r"/(plugins|themes)/[^/]+/(readme|license)\.txt$"),
    sig(CmsExploit, Anywhere, r"/(timthumb|thumb|uploadify|elfinder)\.php"),
    sig(CmsExploit, Prefix, r"^/(magmi|downloader)(/|$)"),
    sig(CmsExploit, Anywhere, r"/(c99|r57|wso|b374k|alfa|shell|webshell|cmd|eval-stdin)\.php"),
    // ---- Sensitive and config files -------------------------------------
    sig(SensitiveFile, Anywhere, r"/\.env(\.[a-z0-9_-]+)?$"),
    sig(SensitiveFile, Anywhere, r"/\.(htaccess|htpasswd|ds_store|aws|ssh|bash_history|npmrc|dockercfg)(/|$)"),
    sig(SensitiveFile, Exact, r"^/(wp-config|config|configuration|settings|database|db|local|parameters)\.(php|inc|json|ya?ml|xml|ini|conf|txt)$"),
    sig(SensitiveFile, Exact, r"^/(web\.config|composer\.(json|lock)|package(-lock)?\.json|yarn\.lock|docker-compose\.ya?ml|dockerfile|\.travis\.yml|\.gitlab-ci\.yml)$"),
    sig(SensitiveFile, Exact, r"^/(phpinfo|info|test|php_info|i)\.php$"),
    sig(SensitiveFile, Exact, r"^/(server-status|server-info|elmah\.axd|trace\.axd)$"),
    // ---- Backup files ----------------------------------------------------
    sig(BackupFile, Anywhere, r"\.(bak|backup|old|orig|save|swp|swo|tmp|dist)$"),
    sig(BackupFile, Anywhere, r"~$"),
    sig(BackupFile, Exact, r"^/(backup|backups|bak|old|db|database|dump|site|www|wwwroot|html|public_html|htdocs|web)\.(zip|tar|tar\.gz|tgz|gz|rar|7z|sql|sql\.gz)$"),
    // ---- Database and shell keywords ------------------------------------
    sig(DatabaseShell, Prefix, r"^/(phpmyadmin|pma|myadmin|mysql|mysqladmin|sql|sqlite|dbadmin|adminer|pgadmin)(/|$)"),
    sig(DatabaseShell, Anywhere, r"/(phpmyadmin|adminer)(\.php|/)"),
    sig(DatabaseShell, Exact, r"^/(shell|cmd|console|bin/sh|bin/bash)$"),
    // ---- Auth endpoint enumeration --------------------------------------
    sig(AuthEndpoint, Exact, r"^/(login|logon|signin|auth|admin_login|user/login)\.(php|asp|aspx|jsp|cgi|html?)$"),
    sig(AuthEndpoint, Exact, r"^/(j_security_check|j_spring_security_check)$"),
    // ---- Generic directory and year-folder discovery --------------------
    sig(DirectoryDiscovery, Exact, r"^/(blog|old|new|test|tests|temp|tmp|backup|backups|bak|dev|demo|beta|staging|site|wordpress|wp|cms|oldsite|new-site|website)/?$"),
    sig(DirectoryDiscovery, Exact, r"^/[0-9]{4}/?$"),
];

static COMPILED: Lazy<Vec<Signature>> = Lazy::new(|| {
    BUILTIN_SIGNATURES
        .iter()
        .filter_map(|b| match Signature::builtin(b.pattern, b.family, b.anchoring) {
            Ok(sig) => Some(sig),
            Err(e) => {
                tracing::error!(error = %e, "built-in signature failed to compile; skipping");
                None
            }
        })
        .collect()
});

/// The ordered built-in signature list.
pub fn builtin_signatures() -> &'static [Signature] {
    &COMPILED
}
