//! Sale model
//!
//! A sale is one sellable inventory pool with a fixed capacity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::TicketReservation;

/// Sale entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Display name of the sale
    pub name: String,

    /// Total number of tickets that can be held at once
    pub capacity: i32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Create a new sale
    pub fn new(name: impl Into<String>, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            capacity,
            created_at: Utc::now(),
        }
    }

    /// Tickets currently held by active, unexpired reservations
    pub fn held_quantity<'a, I>(&self, reservations: I, now: DateTime<Utc>) -> i32
    where
        I: IntoIterator<Item = &'a TicketReservation>,
    {
        reservations
            .into_iter()
            .filter(|r| r.sale_id == self.id && r.is_holding_at(now))
            .map(|r| r.quantity)
            .sum()
    }

    /// Capacity left over after subtracting every live hold
    ///
    /// Never stored: always recomputed from the reservations passed in.
    pub fn available_capacity<'a, I>(&self, reservations: I, now: DateTime<Utc>) -> i32
    where
        I: IntoIterator<Item = &'a TicketReservation>,
    {
        (self.capacity - self.held_quantity(reservations, now)).max(0)
    }
}

/// Sale creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewSale {
    /// Display name
    #[validate(length(min = 1, max = 200, message = "Sale name is required"))]
    pub name: String,

    /// Total capacity
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: i32,
}

impl NewSale {
    /// Convert to Sale entity
    pub fn into_sale(self) -> Sale {
        Sale::new(self.name, self.capacity)
    }
}
