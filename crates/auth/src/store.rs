//! Role record store
//!
//! Keyed by identity id, one record per identity. `PgRoleStore` uses runtime
//! `sqlx::query_as` against the `role_records` table.

use chrono::{DateTime, Utc};
use energram_common::RepositoryError;
use sqlx::PgPool;

use crate::types::{IdentityId, Role, RoleRecord};

#[async_trait::async_trait]
pub trait RoleStore: Send + Sync {
    async fn get(&self, identity_id: &IdentityId) -> Result<Option<RoleRecord>, RepositoryError>;

    /// Insert a new record. `AlreadyExists` if the identity already has one.
    async fn create(&self, record: RoleRecord) -> Result<RoleRecord, RepositoryError>;

    /// `NotFound` if the identity has no record
    async fn update_role(
        &self,
        identity_id: &IdentityId,
        role: Role,
    ) -> Result<RoleRecord, RepositoryError>;

    /// All records, oldest first
    async fn list(&self) -> Result<Vec<RoleRecord>, RepositoryError>;
}

/// Row shape; `role` stays a string until it passes `Role::from_str`
#[derive(sqlx::FromRow)]
struct RoleRecordRow {
    identity_id: String,
    email: Option<String>,
    display_name: Option<String>,
    avatar_url: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoleRecordRow> for RoleRecord {
    type Error = RepositoryError;

    fn try_from(row: RoleRecordRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|e| {
            tracing::error!(identity_id = %row.identity_id, error = %e, "Corrupt role record");
            RepositoryError::InvalidData(e.to_string())
        })?;

        Ok(RoleRecord {
            identity_id: IdentityId::new(row.identity_id),
            email: row.email,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RoleStore for PgRoleStore {
    async fn get(&self, identity_id: &IdentityId) -> Result<Option<RoleRecord>, RepositoryError> {
        let row: Option<RoleRecordRow> = sqlx::query_as(
            r#"
            SELECT identity_id, email, display_name, avatar_url, role, created_at
            FROM role_records
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, identity_id = %identity_id, "Failed to load role record");
            RepositoryError::Connection(e)
        })?;

        row.map(RoleRecord::try_from).transpose()
    }

    async fn create(&self, record: RoleRecord) -> Result<RoleRecord, RepositoryError> {
        // ON CONFLICT keeps concurrent first sign-ins from racing into a duplicate
        let row: Option<RoleRecordRow> = sqlx::query_as(
            r#"
            INSERT INTO role_records (identity_id, email, display_name, avatar_url, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (identity_id) DO NOTHING
            RETURNING identity_id, email, display_name, avatar_url, role, created_at
            "#,
        )
        .bind(record.identity_id.as_str())
        .bind(&record.email)
        .bind(&record.display_name)
        .bind(&record.avatar_url)
        .bind(record.role.as_str())
        .bind(record.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, identity_id = %record.identity_id, "Failed to create role record");
            RepositoryError::Connection(e)
        })?;

        row.ok_or(RepositoryError::AlreadyExists)?.try_into()
    }

    async fn update_role(
        &self,
        identity_id: &IdentityId,
        role: Role,
    ) -> Result<RoleRecord, RepositoryError> {
        let row: Option<RoleRecordRow> = sqlx::query_as(
            r#"
            UPDATE role_records
            SET role = $2
            WHERE identity_id = $1
            RETURNING identity_id, email, display_name, avatar_url, role, created_at
            "#,
        )
        .bind(identity_id.as_str())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, identity_id = %identity_id, "Failed to update role");
            RepositoryError::Connection(e)
        })?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn list(&self) -> Result<Vec<RoleRecord>, RepositoryError> {
        let rows: Vec<RoleRecordRow> = sqlx::query_as(
            r#"
            SELECT identity_id, email, display_name, avatar_url, role, created_at
            FROM role_records
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list role records");
            RepositoryError::Connection(e)
        })?;

        rows.into_iter().map(RoleRecord::try_from).collect()
    }
}
