//! Session and admin-management endpoints
//!
//! Login opens a session in the `SessionRegistry` and returns its bearer
//! token. Every other endpoint acts on the caller's own session only.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use energram_auth::{
    ActiveSession, AuthError, CurrentSession, IdentityId, RequireSuperAdmin, RoleRecord,
    RouteGuard, SessionRegistry, SessionToken, SessionView, SignInMethod,
};
use energram_common::ValidatedJson;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// State for the auth routes
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<SessionRegistry>,
    pub guard: RouteGuard,
}

impl FromRef<AuthState> for RouteGuard {
    fn from_ref(state: &AuthState) -> Self {
        state.guard.clone()
    }
}

impl FromRef<AuthState> for Arc<SessionRegistry> {
    fn from_ref(state: &AuthState) -> Self {
        state.sessions.clone()
    }
}

/// `?from=` carried over from the login redirect
#[derive(Debug, Default, Deserialize)]
pub struct ReturnTo {
    #[serde(default)]
    pub from: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordLoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// ID token from the hosted identity service's popup/redirect flow
#[derive(Deserialize, Validate)]
pub struct FederatedLoginRequest {
    #[validate(length(min = 1))]
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Send as `Authorization: Bearer <token>` on later requests
    pub token: SessionToken,
    /// Where the client should navigate next
    pub redirect_to: String,
    pub session: SessionView,
}

/// **GET /v1/auth/session**
pub async fn get_session(CurrentSession(session): CurrentSession) -> Json<SessionView> {
    Json(session)
}

/// **POST /v1/auth/login**
pub async fn password_login(
    State(state): State<AuthState>,
    Query(return_to): Query<ReturnTo>,
    ValidatedJson(request): ValidatedJson<PasswordLoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let method = SignInMethod::Password {
        email: request.email,
        password: request.password,
    };
    login(&state, method, return_to).await
}

/// **POST /v1/auth/login/federated**
pub async fn federated_login(
    State(state): State<AuthState>,
    Query(return_to): Query<ReturnTo>,
    ValidatedJson(request): ValidatedJson<FederatedLoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let method = SignInMethod::Federated {
        id_token: request.id_token,
    };
    login(&state, method, return_to).await
}

async fn login(
    state: &AuthState,
    method: SignInMethod,
    return_to: ReturnTo,
) -> Result<Json<LoginResponse>, AuthError> {
    let signed_in = state
        .sessions
        .sign_in(method, return_to.from.as_deref())
        .await?;

    Ok(Json(LoginResponse {
        token: signed_in.token,
        redirect_to: signed_in.hint.path().to_string(),
        session: signed_in.session,
    }))
}

/// Ends the caller's session only
///
/// **POST /v1/auth/logout**
pub async fn logout(
    State(state): State<AuthState>,
    caller: ActiveSession,
) -> Result<StatusCode, AuthError> {
    state.sessions.sign_out(&caller.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every role record, oldest first
///
/// **GET /v1/admin/admins**
pub async fn list_admins(
    _super_admin: RequireSuperAdmin,
    caller: ActiveSession,
) -> Result<Json<Vec<RoleRecord>>, AuthError> {
    Ok(Json(caller.resolver.list_records().await?))
}

/// **POST /v1/admin/admins/{id}/promote**
pub async fn promote(
    _super_admin: RequireSuperAdmin,
    caller: ActiveSession,
    Path(id): Path<String>,
) -> Result<Json<RoleRecord>, AuthError> {
    let record = caller.resolver.promote(&IdentityId::new(id)).await?;
    Ok(Json(record))
}

/// **POST /v1/admin/admins/{id}/demote**
pub async fn demote(
    _super_admin: RequireSuperAdmin,
    caller: ActiveSession,
    Path(id): Path<String>,
) -> Result<Json<RoleRecord>, AuthError> {
    let record = caller.resolver.demote(&IdentityId::new(id)).await?;
    Ok(Json(record))
}

pub fn routes() -> Router<AuthState> {
    Router::new()
        .route("/v1/auth/session", get(get_session))
        .route("/v1/auth/login", post(password_login))
        .route("/v1/auth/login/federated", post(federated_login))
        .route("/v1/auth/logout", post(logout))
        .route("/v1/admin/admins", get(list_admins))
        .route("/v1/admin/admins/{id}/promote", post(promote))
        .route("/v1/admin/admins/{id}/demote", post(demote))
}
