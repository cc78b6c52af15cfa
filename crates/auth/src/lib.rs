//! Role resolution and route guarding for Energram
//!
//! Verifies sign-ins with the identity provider, keeps one session per
//! client under a bearer token, resolves a role for each session's identity
//! against the role store (seeding one on first sign-in), and exposes axum
//! extractors that work with any state implementing `FromRef<S>` for
//! `RouteGuard`.

mod config;
mod error;
mod extractors;
mod guard;
mod jwt;
mod mock;
mod provider;
mod resolver;
mod sessions;
mod state;
mod store;
mod types;

pub use config::{EmailPattern, JwtConfig, SeedPolicy, SeedPolicyError, SeedRule};
pub use error::AuthError;
pub use extractors::{
    bearer_token, ActiveSession, CurrentSession, GuardRejection, RequireAdmin, RequireSuperAdmin,
};
pub use guard::{
    evaluate, AccessLevel, GuardDecision, NavigationAttempt, Notice, NoticeSink, NoticeVariant,
    RecordingNoticeSink, RouteGuard, TracingNoticeSink,
};
pub use jwt::{IdTokenClaims, JwtIdentityProvider};
pub use mock::{InMemoryRoleStore, MockIdentityProvider};
pub use provider::{IdentityProvider, IdentityProviderFactory, IdentitySubscription, SignInMethod};
pub use resolver::RoleResolver;
pub use sessions::{SessionRegistry, SessionToken, SignedInSession, DEFAULT_SESSION_TTL_HOURS};
pub use state::{ResolverEvent, ResolverState, ResolverStateMachine, RoleEvent, RoleStateMachine};
pub use store::{PgRoleStore, RoleStore};
pub use types::{
    is_local_path, Identity, IdentityId, NavigationHint, Role, RoleRecord, SessionView,
    UnknownRole, ADMIN_PATH, HOME_PATH, LOGIN_PATH,
};
