//! Security headers middleware.
//!
//! The API serves JSON to a browser frontend, so the useful set is small:
//! no MIME sniffing, no framing, and no referrer leakage.

use axum::{
    body::Body,
    extract::State,
    http::{
        HeaderMap, Request,
        header::{HeaderValue, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
    },
    middleware::Next,
    response::Response,
};

use crate::{AppState, config::SecurityHeadersConfig};

/// Adds the configured security headers to every response, errors included.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let config = &state.config.server.security_headers;
    let mut response = next.run(request).await;

    if config.enabled {
        apply_security_headers(config, response.headers_mut());
    }

    response
}

fn apply_security_headers(config: &SecurityHeadersConfig, headers: &mut HeaderMap) {
    let wanted = [
        (X_CONTENT_TYPE_OPTIONS, Some(config.content_type_options.as_str())),
        (X_FRAME_OPTIONS, config.frame_options.as_deref()),
        (REFERRER_POLICY, config.referrer_policy.as_deref()),
    ];

    for (name, value) in wanted {
        // Empty or unencodable values leave the header off.
        match value.filter(|v| !v.is_empty()).map(HeaderValue::try_from) {
            Some(Ok(value)) => {
                headers.insert(name, value);
            }
            Some(Err(_)) => tracing::warn!(header = %name, "Skipping invalid security header value"),
            None => {}
        }
    }
}
