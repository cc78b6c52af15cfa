//! Identity, role and session types
//!
//! `Identity` is owned by the identity provider; `RoleRecord` is the persisted
//! authorization state; `SessionView` is the read-only projection handed to
//! route guards and admin UI consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identity id issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for IdentityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An authenticated principal as returned by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<IdentityId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
            avatar_url: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}

/// Site-wide role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Admins and the super admin can see the dashboard
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role string that is not one of `user`, `admin`, `super_admin`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Persisted authorization state for one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub identity_id: IdentityId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl RoleRecord {
    /// Build the first record for an identity with its seed role
    pub fn seeded(identity: &Identity, role: Role, created_at: DateTime<Utc>) -> Self {
        Self {
            identity_id: identity.id.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            avatar_url: identity.avatar_url.clone(),
            role,
            created_at,
        }
    }
}

/// Read-only session projection.
///
/// Fields are private so `is_admin`/`is_super_admin` can never disagree
/// with `role`; build one through the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    identity: Option<Identity>,
    role: Option<Role>,
    is_loading: bool,
    is_admin: bool,
    is_super_admin: bool,
    persisted: bool,
}

impl SessionView {
    /// Nothing known yet; the provider has not reported an identity
    pub fn uninitialized() -> Self {
        Self {
            identity: None,
            role: None,
            is_loading: true,
            is_admin: false,
            is_super_admin: false,
            persisted: false,
        }
    }

    /// Identity known, role lookup in flight
    pub fn resolving(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..Self::uninitialized()
        }
    }

    pub fn signed_out() -> Self {
        Self {
            is_loading: false,
            ..Self::uninitialized()
        }
    }

    /// Identity with a resolved role. `persisted` is false when the role
    /// record could not be read or written.
    pub fn resolved(identity: Identity, role: Role, persisted: bool) -> Self {
        Self {
            identity: Some(identity),
            role: Some(role),
            is_loading: false,
            is_admin: role.is_admin(),
            is_super_admin: role.is_super_admin(),
            persisted,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }
}

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_PATH: &str = "/admin";

/// Where the UI should go after a successful sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum NavigationHint {
    AdminArea,
    ReturnTo(String),
}

impl NavigationHint {
    /// Admins go to the dashboard; everyone else back to where they were
    /// headed, defaulting to home.
    pub fn after_sign_in(session: &SessionView, return_to: Option<&str>) -> Self {
        if session.is_admin() {
            return NavigationHint::AdminArea;
        }

        let path = return_to
            .filter(|path| is_local_path(path))
            .unwrap_or(HOME_PATH);
        NavigationHint::ReturnTo(path.to_string())
    }

    pub fn path(&self) -> &str {
        match self {
            NavigationHint::AdminArea => ADMIN_PATH,
            NavigationHint::ReturnTo(path) => path,
        }
    }
}

/// Only same-site absolute paths are honored as return targets
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
