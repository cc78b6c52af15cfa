//! Order lifecycle
//!
//! Pending → Paid (payment confirmed with a provider reference) or
//! Pending → Cancelled. Paid and cancelled orders never change again.

use energram_common::StateError;

use crate::domain::entities::OrderStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    PaymentConfirmed,
    Cancel,
}

impl std::fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PaymentConfirmed => write!(f, "payment_confirmed"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

pub struct OrderStateMachine;

impl OrderStateMachine {
    pub fn transition(current: OrderStatus, event: OrderEvent) -> Result<OrderStatus, StateError> {
        match (current, event) {
            (OrderStatus::Pending, OrderEvent::PaymentConfirmed) => Ok(OrderStatus::Paid),
            (OrderStatus::Pending, OrderEvent::Cancel) => Ok(OrderStatus::Cancelled),
            (OrderStatus::Paid | OrderStatus::Cancelled, _) => {
                Err(StateError::TerminalState(current.to_string()))
            }
        }
    }

    pub fn can_transition(current: OrderStatus, event: OrderEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
