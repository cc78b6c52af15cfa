//! Auth configuration: ID token verification and the seed policy
//!
//! The seed policy assigns initial roles. It is evaluated once, when an
//! identity's role record is first created. Later role changes go through
//! promote/demote only.

use energram_common::Config;
use regex::Regex;

use crate::types::Role;

lazy_static::lazy_static! {
    /// A plain mailbox: something@host.tld
    static ref EXACT_EMAIL_REGEX: Regex =
        Regex::new(r"^[^@\s*]+@[^@\s*]+\.[^@\s*]+$").unwrap();

    /// Every mailbox on a domain: *@host.tld
    static ref DOMAIN_GLOB_REGEX: Regex =
        Regex::new(r"^\*@([^@\s*]+\.[^@\s*]+)$").unwrap();
}

/// Verification settings for ID tokens issued by the hosted identity service
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl JwtConfig {
    /// `None` when `JWT_SECRET` is not set
    pub fn from_config(config: &Config) -> Option<Self> {
        config.jwt_secret.as_ref().map(|secret| Self {
            secret: secret.clone(),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
        })
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedPolicyError {
    #[error("Invalid email pattern: {0:?}")]
    InvalidPattern(String),

    #[error("Seed rule {0:?} may not grant super_admin; use the super-admin email instead")]
    ElevatedRule(String),

    #[error("Invalid super-admin email: {0:?}")]
    InvalidSuperAdminEmail(String),
}

/// Email matcher used by seed rules. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailPattern {
    Exact(String),
    /// `*@domain`: any mailbox on exactly that domain
    Domain(String),
}

impl EmailPattern {
    pub fn parse(raw: &str) -> Result<Self, SeedPolicyError> {
        let normalized = raw.trim().to_lowercase();

        if let Some(captures) = DOMAIN_GLOB_REGEX.captures(&normalized) {
            return Ok(EmailPattern::Domain(captures[1].to_string()));
        }

        if EXACT_EMAIL_REGEX.is_match(&normalized) {
            return Ok(EmailPattern::Exact(normalized));
        }

        Err(SeedPolicyError::InvalidPattern(raw.to_string()))
    }

    pub fn matches(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        match self {
            EmailPattern::Exact(expected) => email == *expected,
            EmailPattern::Domain(domain) => email
                .rsplit_once('@')
                .is_some_and(|(local, host)| !local.is_empty() && host == domain),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRule {
    pattern: EmailPattern,
    role: Role,
}

impl SeedRule {
    /// Rules can seed `user` or `admin`; the super admin is designated
    /// separately so there is only ever one.
    pub fn new(pattern: &str, role: Role) -> Result<Self, SeedPolicyError> {
        if role == Role::SuperAdmin {
            return Err(SeedPolicyError::ElevatedRule(pattern.to_string()));
        }

        Ok(Self {
            pattern: EmailPattern::parse(pattern)?,
            role,
        })
    }

    pub fn pattern(&self) -> &EmailPattern {
        &self.pattern
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Ordered seed rules plus the single super-admin designation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPolicy {
    super_admin_email: Option<String>,
    rules: Vec<SeedRule>,
}

impl SeedPolicy {
    pub fn new(
        super_admin_email: Option<&str>,
        rules: Vec<SeedRule>,
    ) -> Result<Self, SeedPolicyError> {
        let super_admin_email = match super_admin_email {
            Some(raw) => match EmailPattern::parse(raw) {
                Ok(EmailPattern::Exact(email)) => Some(email),
                _ => return Err(SeedPolicyError::InvalidSuperAdminEmail(raw.to_string())),
            },
            None => None,
        };

        Ok(Self {
            super_admin_email,
            rules,
        })
    }

    /// `SUPER_ADMIN_EMAIL` plus one admin rule per `INITIAL_ADMIN_EMAILS` entry
    pub fn from_config(config: &Config) -> Result<Self, SeedPolicyError> {
        let rules = config
            .initial_admin_emails
            .iter()
            .map(|pattern| SeedRule::new(pattern, Role::Admin))
            .collect::<Result<Vec<_>, _>>()?;

        let policy = Self::new(config.super_admin_email.as_deref(), rules)?;

        tracing::info!(
            super_admin_configured = policy.super_admin_email.is_some(),
            rule_count = policy.rules.len(),
            "Seed policy loaded"
        );

        Ok(policy)
    }

    pub fn with_rule(mut self, rule: SeedRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn super_admin_email(&self) -> Option<&str> {
        self.super_admin_email.as_deref()
    }

    pub fn rules(&self) -> &[SeedRule] {
        &self.rules
    }

    /// Role for a first sign-in: super-admin email, then the first matching
    /// rule, then `user`.
    pub fn seed_role(&self, email: Option<&str>) -> Role {
        let Some(email) = email else {
            return Role::User;
        };

        if self
            .super_admin_email
            .as_deref()
            .is_some_and(|super_admin| email.trim().eq_ignore_ascii_case(super_admin))
        {
            return Role::SuperAdmin;
        }

        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(email))
            .map(|rule| rule.role)
            .unwrap_or(Role::User)
    }
}
