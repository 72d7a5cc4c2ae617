//! Probe shield middleware.
//! Rejects requests whose path matches a probe signature before any handler runs.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    Router,
};
use tracing::{trace, warn};

use crate::engine::{Decision, ProbeShield};
use crate::observability::metrics;

/// Shared handle to the active shield.
///
/// Reconfiguration swaps the whole shield; a request that already loaded one
/// finishes with it.
#[derive(Clone)]
pub struct ShieldState {
    shield: Arc<ArcSwap<ProbeShield>>,
}

impl ShieldState {
    pub fn new(shield: ProbeShield) -> Self {
        Self {
            shield: Arc::new(ArcSwap::from_pointee(shield)),
        }
    }

    /// The shield requests are currently checked against.
    pub fn current(&self) -> Arc<ProbeShield> {
        self.shield.load_full()
    }

    /// Install a new shield for subsequent requests.
    pub fn replace(&self, shield: ProbeShield) {
        self.shield.store(Arc::new(shield));
    }
}

impl From<ProbeShield> for ShieldState {
    fn from(shield: ProbeShield) -> Self {
        Self::new(shield)
    }
}

pub async fn probe_shield_middleware(
    State(state): State<ShieldState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let verdict = {
        let shield = state.current();
        shield.inspect(req.method().as_str(), req.uri().path(), req.headers())
    };

    match verdict.decision {
        Decision::Allow => {
            trace!(path = %req.uri().path(), "Request allowed");
            metrics::record_allowed();
            next.run(req).await
        }
        Decision::Block(status) => {
            metrics::record_blocked(verdict.family, status);
            if let Some(record) = verdict.record {
                warn!(
                    client_ip = %record.client_ip,
                    method = %record.method,
                    path = %record.path,
                    pattern = %record.pattern,
                    status = status.as_u16(),
                    "Blocked probe request"
                );
            }
            status.status_code().into_response()
        }
    }
}

/// Put the shield in front of every route of `router`.
pub fn protect<S>(router: Router<S>, state: ShieldState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(state, probe_shield_middleware))
}
