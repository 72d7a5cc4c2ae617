//! Router-level tests for the shield middleware.

use std::io;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use tower::ServiceExt;

use probe_shield::config::ShieldConfig;
use probe_shield::engine::{BlockStatus, ProbeShield};
use probe_shield::http::{protect, ShieldState};

fn app(config: ShieldConfig) -> Router {
    let shield = ProbeShield::from_config(&config).unwrap();
    let routes = Router::new()
        .route("/api/admin", get(|| async { "api admin" }))
        .route("/blogs", get(|| async { "blogs" }))
        .fallback(|| async { (StatusCode::OK, "app") });
    protect(routes, ShieldState::new(shield))
}

/// Formatted log output collected in memory.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Send one forwarded request to `app` and return what was logged at WARN.
async fn warn_output(app: &Router, path: &str) -> (StatusCode, String) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let req = Request::builder()
        .uri(path)
        .header("x-forwarded-for", "203.0.113.50, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let status = app.clone().oneshot(req).await.unwrap().status();
    (status, logs.contents())
}

async fn send(app: &Router, path: &str) -> (StatusCode, Vec<u8>) {
    let res = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_blocked_request_gets_gone_with_empty_body() {
    let app = app(ShieldConfig::default());
    let (status, body) = send(&app, "/wp-admin").await;
    assert_eq!(status, StatusCode::GONE);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_allowed_request_reaches_handler_unchanged() {
    let app = app(ShieldConfig::default());
    let (status, body) = send(&app, "/api/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"api admin");

    let (status, body) = send(&app, "/blogs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"blogs");
}

#[tokio::test]
async fn test_anchoring_regression_set() {
    let app = app(ShieldConfig::default());
    for path in ["/admin", "/blog", "/wp-admin", "/foo/wp-admin/index.php", "/2017", "/2024"] {
        assert_eq!(send(&app, path).await.0, StatusCode::GONE, "{path} should be blocked");
    }
    for path in ["/api/admin", "/blogs", "/abcd", "/12345"] {
        assert_eq!(send(&app, path).await.0, StatusCode::OK, "{path} should pass");
    }
}

#[tokio::test]
async fn test_duplicate_separators_do_not_bypass() {
    let app = app(ShieldConfig::default());
    assert_eq!(send(&app, "//blog").await.0, StatusCode::GONE);
    assert_eq!(send(&app, "///admin").await.0, StatusCode::GONE);
}

#[tokio::test]
async fn test_custom_status() {
    let app = app(ShieldConfig {
        block_status: BlockStatus::Forbidden,
        ..ShieldConfig::default()
    });
    let (status, body) = send(&app, "/.env").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_addition_blocks_new_path() {
    let app = app(ShieldConfig {
        additional_patterns: vec!["^/secret$".into()],
        block_status: BlockStatus::NotFound,
        ..ShieldConfig::default()
    });
    assert_eq!(send(&app, "/secret").await.0, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, "/secrets").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_exclusion_by_exact_source_text() {
    let year = r"^/[0-9]{4}/?$";
    let app_excluded = app(ShieldConfig {
        excluded_patterns: vec![year.into()],
        ..ShieldConfig::default()
    });
    assert_eq!(send(&app_excluded, "/2024").await.0, StatusCode::OK);
    assert_eq!(send(&app_excluded, "/admin").await.0, StatusCode::GONE);

    // Same language, different text: the built-in stays.
    let app_equivalent = app(ShieldConfig {
        excluded_patterns: vec![r"^/[[:digit:]]{4}/?$".into()],
        ..ShieldConfig::default()
    });
    assert_eq!(send(&app_equivalent, "/2024").await.0, StatusCode::GONE);
}

#[tokio::test]
async fn test_block_emits_one_warn_record() {
    let app = app(ShieldConfig::default());
    let (status, logs) = warn_output(&app, "/phpmyadmin/").await;

    assert_eq!(status, StatusCode::GONE);
    assert_eq!(logs.lines().count(), 1, "unexpected log output: {logs}");
    assert!(logs.contains("WARN"));
    assert!(logs.contains("client_ip=203.0.113.50"));
    assert!(logs.contains("method=GET"));
    assert!(logs.contains("path=/phpmyadmin/"));
    assert!(logs.contains("status=410"));
    assert!(logs.contains("pattern="));
}

#[tokio::test]
async fn test_allowed_request_logs_nothing_at_warn() {
    let app = app(ShieldConfig::default());
    let (status, logs) = warn_output(&app, "/api/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert!(logs.is_empty(), "unexpected log output: {logs}");
}

#[tokio::test]
async fn test_logging_disabled_still_blocks_silently() {
    let app = app(ShieldConfig {
        log_blocked: false,
        ..ShieldConfig::default()
    });
    let (status, logs) = warn_output(&app, "/phpmyadmin/").await;
    assert_eq!(status, StatusCode::GONE);
    assert!(logs.is_empty(), "unexpected log output: {logs}");
}

#[tokio::test]
async fn test_swap_changes_later_requests() {
    let state = ShieldState::new(ProbeShield::default());
    let routes = Router::new().fallback(|| async { "app" });
    let app = protect(routes, state.clone());

    assert_eq!(send(&app, "/admin").await.0, StatusCode::GONE);

    let reconfigured = ShieldConfig {
        excluded_patterns: vec![
            r"^/(admin|administrator|adm|webadmin|siteadmin|cpanel|whm)(/|$)".into(),
        ],
        ..ShieldConfig::default()
    };
    state.replace(ProbeShield::from_config(&reconfigured).unwrap());

    assert_eq!(send(&app, "/admin").await.0, StatusCode::OK);
}
