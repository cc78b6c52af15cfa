//! Axum extractors for guarded routes
//!
//! The session for a request is read from request extensions (placed there
//! by the application's session middleware from the caller's bearer token).
//! A request without one is treated as still loading, so nothing protected
//! renders.
//!
//! Guard extractors are generic over any state `S` where
//! `RouteGuard: FromRef<S>`; `ActiveSession` over `Arc<SessionRegistry>: FromRef<S>`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{
        header::{AUTHORIZATION, RETRY_AFTER},
        request::Parts,
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::error::AuthError;
use crate::guard::{AccessLevel, GuardDecision, NavigationAttempt, RouteGuard};
use crate::resolver::RoleResolver;
use crate::sessions::SessionRegistry;
use crate::types::{SessionView, HOME_PATH, LOGIN_PATH};

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn session_from_parts(parts: &Parts) -> SessionView {
    parts
        .extensions
        .get::<SessionView>()
        .cloned()
        .unwrap_or_else(SessionView::uninitialized)
}

fn current_path(parts: &Parts) -> &str {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path())
}

/// The request's session, whatever it is
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionView);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(session_from_parts(parts)))
    }
}

/// A guard decision other than `Render`, as an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRejection(pub GuardDecision);

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self.0 {
            GuardDecision::Loading => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(RETRY_AFTER, "1")],
                Json(json!({
                    "error": {
                        "code": "SESSION_LOADING",
                        "message": "Session is still loading",
                    }
                })),
            )
                .into_response(),
            GuardDecision::RedirectToLogin { return_path } => Redirect::to(&format!(
                "{}?from={}",
                LOGIN_PATH,
                urlencoding::encode(&return_path)
            ))
            .into_response(),
            GuardDecision::RedirectToHome => Redirect::to(HOME_PATH).into_response(),
            GuardDecision::Render => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn guard_request<S>(
    parts: &Parts,
    state: &S,
    required: AccessLevel,
) -> Result<SessionView, GuardRejection>
where
    RouteGuard: FromRef<S>,
{
    let guard = RouteGuard::from_ref(state);
    let session = session_from_parts(parts);
    let attempt = NavigationAttempt::new(current_path(parts));

    match guard.check(&session, required, &attempt) {
        GuardDecision::Render => Ok(session),
        decision => Err(GuardRejection(decision)),
    }
}

/// The caller's own signed-in session
pub struct ActiveSession {
    pub token: String,
    pub resolver: Arc<RoleResolver>,
}

impl<S> FromRequestParts<S> for ActiveSession
where
    Arc<SessionRegistry>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let registry = Arc::<SessionRegistry>::from_ref(state);
        let token = bearer_token(&parts.headers).ok_or(AuthError::NotSignedIn)?;
        let resolver = registry.resolver(token).ok_or(AuthError::NotSignedIn)?;

        Ok(ActiveSession {
            token: token.to_string(),
            resolver,
        })
    }
}

/// Admin or super admin
#[derive(Debug)]
pub struct RequireAdmin(pub SessionView);

impl<S> FromRequestParts<S> for RequireAdmin
where
    RouteGuard: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        guard_request(parts, state, AccessLevel::Admin).map(RequireAdmin)
    }
}

/// Super admin only
#[derive(Debug)]
pub struct RequireSuperAdmin(pub SessionView);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    RouteGuard: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        guard_request(parts, state, AccessLevel::SuperAdmin).map(RequireSuperAdmin)
    }
}
