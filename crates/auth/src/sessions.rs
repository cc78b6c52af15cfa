//! Per-client sessions
//!
//! Every successful sign-in opens its own provider session and
//! `RoleResolver`, stored under a random bearer token that is handed back to
//! the client. A request without a live token is signed out.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::SeedPolicy;
use crate::error::AuthError;
use crate::provider::{IdentityProviderFactory, SignInMethod};
use crate::resolver::RoleResolver;
use crate::store::RoleStore;
use crate::types::{NavigationHint, SessionView};

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

/// Opaque bearer token naming one signed-in client
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    fn generate() -> Result<Self, AuthError> {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| AuthError::Internal(format!("Failed to generate random bytes: {}", e)))?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Result of a successful sign-in
#[derive(Debug)]
pub struct SignedInSession {
    pub token: SessionToken,
    pub hint: NavigationHint,
    pub session: SessionView,
}

struct SessionEntry {
    resolver: Arc<RoleResolver>,
    expires_at: DateTime<Utc>,
}

pub struct SessionRegistry {
    providers: Arc<dyn IdentityProviderFactory>,
    store: Arc<dyn RoleStore>,
    policy: SeedPolicy,
    ttl: Duration,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(
        providers: Arc<dyn IdentityProviderFactory>,
        store: Arc<dyn RoleStore>,
        policy: SeedPolicy,
    ) -> Self {
        Self {
            providers,
            store,
            policy,
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sign in on a fresh provider session and keep it under a new token.
    ///
    /// Nothing is stored when the provider rejects the sign-in.
    pub async fn sign_in(
        &self,
        method: SignInMethod,
        return_to: Option<&str>,
    ) -> Result<SignedInSession, AuthError> {
        let resolver = Arc::new(RoleResolver::new(
            self.providers.open(),
            self.store.clone(),
            self.policy.clone(),
        ));

        let hint = resolver.sign_in(method, return_to).await?;
        let token = SessionToken::generate()?;
        let session = resolver.session();

        let now = Utc::now();
        let mut sessions = self.lock();
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            token.0.clone(),
            SessionEntry {
                resolver,
                expires_at: now + self.ttl,
            },
        );
        tracing::debug!(active_sessions = sessions.len(), "Session opened");

        Ok(SignedInSession {
            token,
            hint,
            session,
        })
    }

    /// Resolver behind a live token
    pub fn resolver(&self, token: &str) -> Option<Arc<RoleResolver>> {
        let now = Utc::now();
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(entry) if entry.expires_at > now => Some(entry.resolver.clone()),
            Some(_) => {
                sessions.remove(token);
                tracing::debug!("Session expired");
                None
            }
            None => None,
        }
    }

    /// Session for a request
    pub fn session(&self, token: Option<&str>) -> SessionView {
        token
            .and_then(|token| self.resolver(token))
            .map(|resolver| resolver.session())
            .unwrap_or_else(SessionView::signed_out)
    }

    /// End one client's session. A failed provider sign-out keeps it.
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let resolver = self.resolver(token).ok_or(AuthError::NotSignedIn)?;
        resolver.sign_out().await?;
        self.lock().remove(token);
        Ok(())
    }

    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
