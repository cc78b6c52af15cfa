//! Waitlist, contact and partnership repository
//!
//! The three lead collections are append-only from the public site and
//! read-only from the admin panel.

use crate::domain::entities::{ContactMessage, PartnershipInquiry, WaitlistEntry};
use energram_common::{Pagination, Result};
use sqlx::PgPool;

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add_to_waitlist(&self, entry: &WaitlistEntry) -> Result<WaitlistEntry> {
        let created = sqlx::query_as::<_, WaitlistEntry>(
            r#"
            INSERT INTO waitlist_entries (id, name, email, location, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, location, created_at
            "#,
        )
        .bind(entry.id)
        .bind(&entry.name)
        .bind(&entry.email)
        .bind(&entry.location)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn list_waitlist(&self, page: Pagination) -> Result<Vec<WaitlistEntry>> {
        let entries = sqlx::query_as::<_, WaitlistEntry>(
            r#"
            SELECT id, name, email, location, created_at
            FROM waitlist_entries
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Every waitlist entry, newest first
    pub async fn list_all_waitlist(&self) -> Result<Vec<WaitlistEntry>> {
        let entries = sqlx::query_as::<_, WaitlistEntry>(
            r#"
            SELECT id, name, email, location, created_at
            FROM waitlist_entries
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn add_contact(&self, message: &ContactMessage) -> Result<ContactMessage> {
        let created = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (id, name, email, organization, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, organization, message, created_at
            "#,
        )
        .bind(message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.organization)
        .bind(&message.message)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn list_contacts(&self, page: Pagination) -> Result<Vec<ContactMessage>> {
        let messages = sqlx::query_as::<_, ContactMessage>(
            r#"
            SELECT id, name, email, organization, message, created_at
            FROM contact_messages
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn add_partnership(
        &self,
        inquiry: &PartnershipInquiry,
    ) -> Result<PartnershipInquiry> {
        let created = sqlx::query_as::<_, PartnershipInquiry>(
            r#"
            INSERT INTO partnership_inquiries (id, name, email, organization, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, organization, message, created_at
            "#,
        )
        .bind(inquiry.id)
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.organization)
        .bind(&inquiry.message)
        .bind(inquiry.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn list_partnerships(&self, page: Pagination) -> Result<Vec<PartnershipInquiry>> {
        let inquiries = sqlx::query_as::<_, PartnershipInquiry>(
            r#"
            SELECT id, name, email, organization, message, created_at
            FROM partnership_inquiries
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(inquiries)
    }
}
