//! Public form submissions and their validation rules

use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::entities::{
    ContactMessage, CustomerType, Order, PartnershipInquiry, Plan, WaitlistEntry,
};

lazy_static::lazy_static! {
    /// Optional leading `+`, then digits with spaces or hyphens, 8-20 chars
    pub static ref PHONE_REGEX: Regex =
        Regex::new(r"^\+?[0-9][0-9 \-]{6,18}[0-9]$").unwrap();
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !PHONE_REGEX.is_match(value.trim()) {
        return Err(ValidationError::new("invalid_phone"));
    }
    Ok(())
}

fn clean(value: String) -> String {
    value.trim().to_string()
}

fn clean_email(value: String) -> String {
    value.trim().to_lowercase()
}

/// Payment reference reported by the payment provider's callback
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaymentConfirmation {
    #[validate(custom(function = "validate_not_blank"), length(max = 100))]
    pub reference: String,
}

impl PaymentConfirmation {
    pub fn into_reference(self) -> String {
        clean(self.reference)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WaitlistSubmission {
    #[validate(custom(function = "validate_not_blank"), length(max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub location: String,
}

impl WaitlistSubmission {
    pub fn into_entry(self) -> WaitlistEntry {
        WaitlistEntry::new(
            clean(self.name),
            clean_email(self.email),
            clean(self.location),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactSubmission {
    #[validate(custom(function = "validate_not_blank"), length(max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub organization: String,

    #[validate(custom(function = "validate_not_blank"), length(max = 5000))]
    pub message: String,
}

impl ContactSubmission {
    pub fn into_message(self) -> ContactMessage {
        ContactMessage::new(
            clean(self.name),
            clean_email(self.email),
            clean(self.organization),
            clean(self.message),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PartnershipSubmission {
    #[validate(custom(function = "validate_not_blank"), length(max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub organization: String,

    #[validate(custom(function = "validate_not_blank"), length(max = 5000))]
    pub message: String,
}

impl PartnershipSubmission {
    pub fn into_inquiry(self) -> PartnershipInquiry {
        PartnershipInquiry::new(
            clean(self.name),
            clean_email(self.email),
            clean(self.organization),
            clean(self.message),
        )
    }
}

/// Order form. The amount is never taken from the client; it comes from
/// the plan.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderSubmission {
    #[validate(custom(function = "validate_not_blank"), length(max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[validate(custom(function = "validate_not_blank"), length(max = 500))]
    pub address: String,

    #[serde(default)]
    pub customer_type: CustomerType,

    #[serde(default)]
    pub plan: Plan,
}

impl OrderSubmission {
    pub fn into_order(self) -> Order {
        Order::new(
            clean(self.name),
            clean_email(self.email),
            clean(self.phone),
            clean(self.address),
            self.customer_type,
            self.plan,
        )
    }
}
