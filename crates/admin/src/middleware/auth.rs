//! Authentication extractors.
//!
//! [`RequireIdentity`] reads the session identity; [`RequireAccess`] goes one
//! step further and resolves it to an [`AccessContext`] against the store.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::{AccessContext, resolve_access};
use crate::state::AppState;

/// Extractor that requires an authenticated identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireIdentity(user): RequireIdentity) -> impl IntoResponse {
///     user.user_id.to_string()
/// }
/// ```
pub struct RequireIdentity(pub CurrentUser);

/// Error returned when no identity is present in the session.
#[derive(Debug)]
pub struct IdentityRejection;

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(IdentityRejection)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(IdentityRejection)?;

        Ok(Self(user))
    }
}

/// Extractor that resolves the caller's role and client visibility.
///
/// Rejects with 401 when unauthenticated and 403 when the identity has no
/// admin record. The role is looked up fresh on every request.
pub struct RequireAccess(pub AccessContext);

impl FromRequestParts<AppState> for RequireAccess {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireIdentity(user) = RequireIdentity::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let ctx = resolve_access(state.store(), user.user_id)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = %user.user_id, error = %e, "Access denied");
                AppError::from(e).into_response()
            })?;

        set_sentry_user(ctx.admin_id(), Some(ctx.admin().email.as_str()));

        Ok(Self(ctx))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use tower_sessions::MemoryStore;

    use content_desk_core::UserId;

    use super::*;

    fn parts() -> Parts {
        Request::builder()
            .uri("/api/access")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_missing_session_is_unauthorized() {
        let mut parts = parts();
        let result = RequireIdentity::from_request_parts(&mut parts, &()).await;
        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_session_is_unauthorized() {
        let mut parts = parts();
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        parts.extensions.insert(session);

        let result = RequireIdentity::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_identity_read_from_session() {
        let mut parts = parts();
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let user = CurrentUser {
            user_id: UserId::generate(),
        };
        session
            .insert(session_keys::CURRENT_USER, user)
            .await
            .unwrap();
        parts.extensions.insert(session);

        let RequireIdentity(found) = RequireIdentity::from_request_parts(&mut parts, &())
            .await
            .map_err(|_| "rejected")
            .unwrap();
        assert_eq!(found, user);
    }
}
