//! Registration, login, logout and session refresh.
//!
//! Successful login, refresh and anonymous registration set the session
//! cookie alongside returning the token, so both browser and API clients
//! are served by the same endpoints.

use axum::{Json, extract::State, http::StatusCode};
use tower_cookies::{
    Cookie, Cookies,
    cookie::{SameSite, time::Duration as CookieDuration},
};

use super::{ApiError, Envelope, ProfileBody, SessionBody, ValidJson};
use crate::{
    AppState,
    auth::CallerContext,
    config::AuthConfig,
    models::{CreateUser, LoginRequest},
    services::Session,
};

fn session_cookie(config: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(CookieDuration::seconds(
            i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
        ))
        .build()
}

/// A removal cookie must carry the same path as the one being removed.
fn removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone())
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(CookieDuration::ZERO)
        .build()
}

fn session_body(state: &AppState, cookies: &Cookies, session: Session) -> SessionBody {
    cookies.add(session_cookie(&state.config.auth, session.token.clone()));
    SessionBody {
        success: true,
        token: session.token,
        user: session.user,
    }
}

/// Create an account.
///
/// The role defaults to student. Only an authenticated admin may register
/// another admin. An admin registering someone else keeps their own cookie.
#[tracing::instrument(name = "api.auth.register", skip(state, ctx, cookies, input), fields(email = %input.email))]
pub async fn register(
    State(state): State<AppState>,
    ctx: CallerContext,
    cookies: Cookies,
    ValidJson(input): ValidJson<CreateUser>,
) -> Result<(StatusCode, Json<SessionBody>), ApiError> {
    let session = state.services.auth.register(ctx.caller(), input).await?;

    let body = match ctx.caller() {
        Some(_) => SessionBody {
            success: true,
            token: session.token,
            user: session.user,
        },
        None => session_body(&state, &cookies, session),
    };
    Ok((StatusCode::CREATED, Json(body)))
}

#[tracing::instrument(name = "api.auth.login", skip(state, cookies, input), fields(email = %input.email))]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    ValidJson(input): ValidJson<LoginRequest>,
) -> Result<Json<SessionBody>, ApiError> {
    let session = state.services.auth.login(input).await?;
    Ok(Json(session_body(&state, &cookies, session)))
}

#[tracing::instrument(name = "api.auth.logout", skip(state, cookies))]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Json<Envelope<()>> {
    cookies.remove(removal_cookie(&state.config.auth));
    Json(Envelope::message("Logged out successfully"))
}

#[tracing::instrument(name = "api.auth.refresh", skip(state, ctx, cookies))]
pub async fn refresh(
    State(state): State<AppState>,
    ctx: CallerContext,
    cookies: Cookies,
) -> Result<Json<SessionBody>, ApiError> {
    let session = state.services.auth.refresh(ctx.require()?).await?;
    Ok(Json(session_body(&state, &cookies, session)))
}

#[tracing::instrument(name = "api.auth.profile", skip(state, ctx))]
pub async fn profile(
    State(state): State<AppState>,
    ctx: CallerContext,
) -> Result<Json<ProfileBody>, ApiError> {
    let user = state.services.auth.profile(ctx.require()?).await?;
    Ok(Json(ProfileBody {
        success: true,
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let config = AuthConfig {
            token_ttl_secs: 3600,
            secure_cookies: true,
            ..Default::default()
        };

        let cookie = session_cookie(&config, "abc".to_string());
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(3600)));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = removal_cookie(&AuthConfig::default());
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }
}
