use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::authz::{AuthzError, Caller};

/// The caller resolved by the identity middleware, if any.
///
/// Extraction never fails: anonymous requests get `CallerContext(None)` and
/// the authorization policy decides whether that is acceptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerContext(pub Option<Caller>);

impl CallerContext {
    pub fn caller(&self) -> Option<&Caller> {
        self.0.as_ref()
    }

    /// The caller, or `Unauthenticated` for anonymous requests.
    pub fn require(&self) -> Result<&Caller, AuthzError> {
        self.0.as_ref().ok_or(AuthzError::Unauthenticated)
    }
}

impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Caller>().copied()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use uuid::Uuid;

    use super::*;
    use crate::models::Role;

    #[tokio::test]
    async fn test_extracts_caller_extension() {
        let caller = Caller::new(Uuid::new_v4(), Role::Student);
        let (mut parts, _) = Request::builder()
            .extension(caller)
            .body(())
            .unwrap()
            .into_parts();

        let ctx = CallerContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.require().unwrap(), &caller);
    }

    #[tokio::test]
    async fn test_anonymous_request() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

        let ctx = CallerContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(ctx.caller().is_none());
        assert_eq!(ctx.require().unwrap_err(), AuthzError::Unauthenticated);
    }
}
