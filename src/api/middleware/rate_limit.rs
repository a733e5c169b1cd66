//! Request admission middleware
//!
//! Every request takes a permit from the limiter before reaching a handler.
//! The permit is dropped once the inner response has been produced, which
//! releases the concurrency slot even if the request future is cancelled.
//!
//! `X-Forwarded-For` and `X-Real-IP` are client supplied. Only honour them
//! behind a proxy that overwrites them; otherwise set
//! `server.trust_forwarded_headers = false` so clients are keyed by socket peer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::types::ApiError;
use crate::infrastructure::rate_limit::TokenBucketLimiter;

const UNKNOWN_CLIENT: &str = "unknown";

/// Limiter plus the policy for identifying clients
#[derive(Clone, Debug)]
pub struct AdmissionControl {
    pub limiter: Arc<TokenBucketLimiter>,
    pub trust_forwarded_headers: bool,
}

impl AdmissionControl {
    pub fn new(limiter: Arc<TokenBucketLimiter>, trust_forwarded_headers: bool) -> Self {
        Self {
            limiter,
            trust_forwarded_headers,
        }
    }
}

/// Admit or reject a request based on its client address
pub async fn admission_middleware(
    State(admission): State<AdmissionControl>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_address(&req, admission.trust_forwarded_headers);

    let Some(permit) = admission.limiter.try_acquire(&client) else {
        warn!(client = %client, path = %req.uri().path(), "Request rejected by admission control");
        return ApiError::rate_limited("too many requests").into_response();
    };

    let response = next.run(req).await;
    drop(permit);

    response
}

/// Resolve the address requests are accounted against
///
/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the socket peer.
/// With `trust_forwarded` unset only the socket peer is used.
pub fn client_address(req: &Request<Body>, trust_forwarded: bool) -> String {
    trust_forwarded
        .then(|| forwarded_address(req))
        .flatten()
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_address(req: &Request<Body>) -> Option<String> {
    let headers = req.headers();

    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return Some(first.to_string());
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
