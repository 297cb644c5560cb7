//! Resolve the caller behind a request.
//!
//! The token is read from `Authorization: Bearer <jwt>` first and the
//! session cookie second. No token means an anonymous request. A token that
//! does not resolve to an active user rejects the request with 401 before
//! any handler runs.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{AppState, middleware::RequestId, routes::ApiError};

pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookies = req.extensions().get::<Cookies>().cloned();
    let token = extract_bearer_token(req.headers()).or_else(|| {
        cookies
            .as_ref()
            .and_then(|c| c.get(&state.config.auth.cookie_name))
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    });

    let Some(token) = token else {
        return Ok(next.run(req).await);
    };

    let request_id = req.extensions().get::<RequestId>().cloned();
    let caller = state
        .services
        .auth
        .resolve_caller(&token)
        .await
        .inspect_err(|err| {
            tracing::debug!(request_id = ?request_id, error = %err, "Rejected session token");
        })?;

    tracing::debug!(
        request_id = ?request_id,
        user_id = %caller.id,
        role = %caller.role,
        "Request authenticated"
    );

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
