//! Energram application composition root
//!
//! Chooses the identity provider, composes the auth and dashboard routers,
//! and stamps every request with the caller's session.

pub mod auth;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use energram_auth::{
    bearer_token, Identity, IdentityProviderFactory, JwtConfig, JwtIdentityProvider,
    MockIdentityProvider, PgRoleStore, RoleStore, RouteGuard, SeedPolicy, SessionRegistry,
    TracingNoticeSink,
};
use energram_common::Config;
use energram_dashboard::{DashboardRepositories, DashboardState};
use sqlx::PgPool;

use crate::auth::AuthState;

/// Create the main application router with all routes and middleware.
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let providers = identity_providers(&config)?;
    let store = Arc::new(PgRoleStore::new(pool.clone()));
    create_app_with(&config, pool, providers, store)
}

/// Verified ID tokens when `JWT_SECRET` is set. The in-memory provider is
/// only served when `DEV_IDENTITY_PROVIDER` asks for it, with the password
/// accounts from `DEV_ACCOUNTS` and no federated accounts.
pub fn identity_providers(config: &Config) -> Result<Arc<dyn IdentityProviderFactory>, anyhow::Error> {
    if let Some(jwt) = JwtConfig::from_config(config) {
        if config.dev_identity_provider {
            tracing::warn!("DEV_IDENTITY_PROVIDER is ignored because JWT_SECRET is set");
        }
        tracing::info!(
            issuer = ?jwt.issuer,
            audience = ?jwt.audience,
            "Verifying ID tokens from the hosted identity service"
        );
        return Ok(Arc::new(JwtIdentityProvider::new(jwt)));
    }

    if !config.dev_identity_provider {
        anyhow::bail!(
            "JWT_SECRET is required; set DEV_IDENTITY_PROVIDER=true only for local development"
        );
    }

    tracing::warn!(
        accounts = config.dev_accounts.len(),
        "Serving the in-memory development identity provider"
    );
    let provider = config
        .dev_accounts
        .iter()
        .fold(MockIdentityProvider::new(), |provider, account| {
            provider.with_account(
                &account.password,
                Identity::new(format!("dev:{}", account.email)).with_email(account.email.as_str()),
            )
        });
    Ok(Arc::new(provider))
}

/// Same as `create_app` with the identity provider and role store supplied
pub fn create_app_with(
    config: &Config,
    pool: PgPool,
    providers: Arc<dyn IdentityProviderFactory>,
    store: Arc<dyn RoleStore>,
) -> Result<Router, anyhow::Error> {
    let policy = SeedPolicy::from_config(config)?;
    let sessions = Arc::new(SessionRegistry::new(providers, store, policy));

    let guard = RouteGuard::new(Arc::new(TracingNoticeSink));

    let auth_state = AuthState {
        sessions: sessions.clone(),
        guard: guard.clone(),
    };
    let dashboard_state = DashboardState {
        repos: DashboardRepositories::new(pool),
        guard,
    };

    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Energram API v0.0.1-SNAPSHOT" }),
        )
        .merge(auth::routes().with_state(auth_state))
        .merge(energram_dashboard::routes().with_state(dashboard_state))
        .layer(middleware::from_fn_with_state(sessions, attach_session));

    Ok(app)
}

/// Put the caller's session into request extensions. No live bearer token
/// means signed out.
async fn attach_session(
    State(sessions): State<Arc<SessionRegistry>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = sessions.session(bearer_token(request.headers()));
    request.extensions_mut().insert(session);
    next.run(request).await
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
