//! Route guard
//!
//! `evaluate` is the pure policy. `RouteGuard` adds the one side effect: an
//! "Access Denied" notice when a signed-in user lacks the required role,
//! raised once per navigation attempt.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use uuid::Uuid;

use crate::types::SessionView;

/// Access a route requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Public route
    None,
    Admin,
    SuperAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Role resolution still in flight; show nothing protected yet
    Loading,
    Render,
    RedirectToLogin { return_path: String },
    /// Signed in without the required role
    RedirectToHome,
}

/// Decide what a route shows for a session.
///
/// Rules, first match wins:
/// 1. loading → `Loading`
/// 2. public route → `Render`
/// 3. no identity → `RedirectToLogin(current_path)`
/// 4. role requirement unmet → `RedirectToHome`
/// 5. otherwise → `Render`
pub fn evaluate(session: &SessionView, required: AccessLevel, current_path: &str) -> GuardDecision {
    if session.is_loading() {
        return GuardDecision::Loading;
    }

    let satisfied = match required {
        AccessLevel::None => return GuardDecision::Render,
        AccessLevel::Admin => session.is_admin(),
        AccessLevel::SuperAdmin => session.is_super_admin(),
    };

    if session.identity().is_none() {
        return GuardDecision::RedirectToLogin {
            return_path: current_path.to_string(),
        };
    }

    if satisfied {
        GuardDecision::Render
    } else {
        GuardDecision::RedirectToHome
    }
}

/// One attempt to open a route. Re-evaluating the same attempt (for
/// example after the session updates) never repeats the notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationAttempt {
    pub id: Uuid,
    pub path: String,
}

impl NavigationAttempt {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// A dismissible user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn access_denied() -> Self {
        Self {
            title: "Access Denied".to_string(),
            description: "You don't have permission to access this page.".to_string(),
            variant: NoticeVariant::Destructive,
        }
    }
}

pub trait NoticeSink: Send + Sync {
    fn raise(&self, notice: Notice);
}

/// Writes notices to the log
#[derive(Debug, Clone, Default)]
pub struct TracingNoticeSink;

impl NoticeSink for TracingNoticeSink {
    fn raise(&self, notice: Notice) {
        tracing::warn!(
            title = %notice.title,
            description = %notice.description,
            "User notice raised"
        );
    }
}

/// Keeps every notice; for tests
#[derive(Debug, Clone, Default)]
pub struct RecordingNoticeSink {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNoticeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NoticeSink for RecordingNoticeSink {
    fn raise(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[derive(Clone)]
pub struct RouteGuard {
    sink: Arc<dyn NoticeSink>,
    last_denied: Arc<Mutex<Option<Uuid>>>,
}

impl RouteGuard {
    pub fn new(sink: Arc<dyn NoticeSink>) -> Self {
        Self {
            sink,
            last_denied: Arc::new(Mutex::new(None)),
        }
    }

    /// Evaluate the route and raise the access-denied notice if needed
    pub fn check(
        &self,
        session: &SessionView,
        required: AccessLevel,
        attempt: &NavigationAttempt,
    ) -> GuardDecision {
        let decision = evaluate(session, required, &attempt.path);

        if decision == GuardDecision::RedirectToHome {
            let mut last_denied = self
                .last_denied
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *last_denied != Some(attempt.id) {
                *last_denied = Some(attempt.id);
                tracing::info!(path = %attempt.path, required = ?required, "Access denied");
                self.sink.raise(Notice::access_denied());
            }
        }

        decision
    }
}

impl std::fmt::Debug for RouteGuard {
    #[mutants::skip] // Debug output only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard").finish_non_exhaustive()
    }
}
