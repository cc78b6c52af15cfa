//! Domain entities for the Energram dashboard
//!
//! Orders and the three lead collections (waitlist, contact messages,
//! partnership inquiries) that the admin panel reads.

use chrono::{DateTime, Utc};
use energram_common::StateError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::state::{OrderEvent, OrderStateMachine};

/// Order payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Who the kit is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "customer_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    #[default]
    Student,
    Business,
    Household,
}

/// Outright purchase or power-as-a-service subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "order_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Purchase,
    Service,
}

impl Plan {
    /// Price in Naira
    pub fn price(&self) -> Decimal {
        match self {
            Plan::Purchase => Decimal::from(200_000),
            Plan::Service => Decimal::from(12_000),
        }
    }
}

/// A kit order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub customer_type: CustomerType,
    pub plan: Plan,
    pub amount: Decimal,
    pub status: OrderStatus,
    /// Payment provider reference, set once paid
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// New pending order priced from its plan
    pub fn new(
        name: String,
        email: String,
        phone: String,
        address: String,
        customer_type: CustomerType,
        plan: Plan,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            address,
            customer_type,
            plan,
            amount: plan.price(),
            status: OrderStatus::Pending,
            payment_ref: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    /// Record the payment provider's reference and mark the order paid
    pub fn confirm_payment(&mut self, reference: &str) -> Result<(), StateError> {
        self.status = OrderStateMachine::transition(self.status, OrderEvent::PaymentConfirmed)?;
        self.payment_ref = Some(reference.to_string());
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), StateError> {
        self.status = OrderStateMachine::transition(self.status, OrderEvent::Cancel)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl WaitlistEntry {
    pub fn new(name: String, email: String, location: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            location,
            created_at: Utc::now(),
        }
    }
}

/// Message from the contact page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub organization: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn new(name: String, email: String, organization: String, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            organization,
            message,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PartnershipInquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub organization: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl PartnershipInquiry {
    pub fn new(name: String, email: String, organization: String, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            organization,
            message,
            created_at: Utc::now(),
        }
    }
}
