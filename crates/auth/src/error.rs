//! Authentication and authorization errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use energram_common::{RepositoryError, StateError};
use serde_json::json;

use crate::types::IdentityId;

/// Errors raised by sign-in, sign-out and admin management.
///
/// Role store failures during role resolution never reach callers; they
/// are absorbed by the resolver's least-privilege fallback.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Sign-in or sign-out rejected by the identity provider
    #[error("{0}")]
    IdentityProvider(String),

    /// ID token failed signature, expiry, issuer or audience checks
    #[error("Invalid ID token")]
    InvalidToken,

    /// No live session for the presented bearer token
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Role store unavailable: {0}")]
    RoleStoreUnavailable(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("No role record for identity {0}")]
    NotFound(IdentityId),

    #[error(transparent)]
    InvalidTransition(#[from] StateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub(crate) fn store(err: RepositoryError) -> Self {
        AuthError::RoleStoreUnavailable(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::IdentityProvider(_) | AuthError::InvalidToken | AuthError::NotSignedIn => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::RoleStoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Authorization(_) => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::InvalidTransition(_) => StatusCode::CONFLICT,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::IdentityProvider(_) => "SIGN_IN_FAILED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::NotSignedIn => "NOT_SIGNED_IN",
            AuthError::RoleStoreUnavailable(_) => "ROLE_STORE_UNAVAILABLE",
            AuthError::Authorization(_) => "AUTHORIZATION_ERROR",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::InvalidTransition(_) => "INVALID_ROLE_CHANGE",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AuthError::Internal(message) = &self {
            tracing::error!(error = %message, "Internal auth error");
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_status_codes() {
        let cases: Vec<(AuthError, StatusCode)> = vec![
            (
                AuthError::IdentityProvider("Invalid email or password".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::NotSignedIn, StatusCode::UNAUTHORIZED),
            (
                AuthError::Internal("entropy".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::RoleStoreUnavailable("timeout".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AuthError::Authorization("super admin only".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                AuthError::NotFound(IdentityId::new("u9")),
                StatusCode::NOT_FOUND,
            ),
            (
                AuthError::InvalidTransition(StateError::invalid("admin", "promote")),
                StatusCode::CONFLICT,
            ),
        ];

        for (error, expected_status) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_provider_message_is_shown_verbatim() {
        let err = AuthError::IdentityProvider("Popup closed by user".to_string());
        assert_eq!(err.to_string(), "Popup closed by user");
    }

    #[test]
    fn test_store_error_becomes_unavailable() {
        let err = AuthError::store(RepositoryError::Unavailable("offline".to_string()));
        assert!(matches!(err, AuthError::RoleStoreUnavailable(_)));
        assert_eq!(err.error_code(), "ROLE_STORE_UNAVAILABLE");
    }
}
