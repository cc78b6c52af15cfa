//! Order repository

use crate::domain::entities::{Order, OrderStatus};
use energram_common::{Error, Pagination, Result};
use sqlx::PgPool;
use uuid::Uuid;

const ORDER_COLUMNS: &str = r#"
    id, name, email, phone, address, customer_type, plan,
    amount, status, payment_ref, created_at
"#;

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, order: &Order) -> Result<Order> {
        let query = format!(
            r#"
            INSERT INTO orders (
                id, name, email, phone, address, customer_type, plan,
                amount, status, payment_ref, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        let created = sqlx::query_as::<_, Order>(&query)
            .bind(order.id)
            .bind(&order.name)
            .bind(&order.email)
            .bind(&order.phone)
            .bind(&order.address)
            .bind(order.customer_type)
            .bind(order.plan)
            .bind(order.amount)
            .bind(order.status)
            .bind(&order.payment_ref)
            .bind(order.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Order>> {
        let query = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);

        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Persist a status change made on `order`, provided the stored order
    /// is still in `expected`. A payment reference already used by another
    /// order is a conflict.
    pub async fn update_status(&self, order: &Order, expected: OrderStatus) -> Result<Order> {
        let query = format!(
            r#"
            UPDATE orders
            SET status = $2, payment_ref = $3
            WHERE id = $1 AND status = $4
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        let updated = sqlx::query_as::<_, Order>(&query)
            .bind(order.id)
            .bind(order.status)
            .bind(&order.payment_ref)
            .bind(expected)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    Error::Conflict("Payment reference is already recorded".to_string())
                }
                other => Error::Database(other),
            })?;

        updated.ok_or_else(|| {
            Error::Conflict(format!("Order {} is no longer {}", order.id, expected))
        })
    }

    /// One page of orders, newest first
    pub async fn list(&self, page: Pagination) -> Result<Vec<Order>> {
        let query = format!(
            "SELECT {} FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            ORDER_COLUMNS
        );

        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Every order, newest first
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        let query = format!(
            "SELECT {} FROM orders ORDER BY created_at DESC",
            ORDER_COLUMNS
        );

        let orders = sqlx::query_as::<_, Order>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }
}
