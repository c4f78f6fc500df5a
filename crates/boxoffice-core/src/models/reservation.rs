//! Ticket reservation model
//!
//! A reservation is one request to hold a quantity of tickets from a sale.

use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Waiting in the sale queue for an admission pass
    #[default]
    Enqueued,
    /// Admitted and holding tickets until `valid_until`
    Active,
    /// Permanently rejected, never reprocessed
    NoAvailability,
    /// Hold lapsed and was reclaimed by the sweeper
    Expired,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Enqueued => write!(f, "enqueued"),
            ReservationStatus::Active => write!(f, "active"),
            ReservationStatus::NoAvailability => write!(f, "no_availability"),
            ReservationStatus::Expired => write!(f, "expired"),
        }
    }
}

impl ReservationStatus {
    /// Check if the reservation is still waiting for a decision
    pub fn is_pending(&self) -> bool {
        matches!(self, ReservationStatus::Enqueued)
    }
}

/// Ticket reservation entity
///
/// The reservation lifecycle:
/// 1. Created by enqueue (Enqueued)
/// 2. Admitted by an admission pass (Active, with `valid_until` stamped)
///    or rejected (NoAvailability)
/// 3. Reclaimed by the hold sweeper once `valid_until` passes (Expired)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketReservation {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Owning sale
    pub sale_id: Uuid,

    /// Caller-supplied identifier, unique across all sales
    pub reservation_number: String,

    /// Number of tickets requested
    pub quantity: i32,

    /// Enqueue sequence, assigned by the repository on insert
    pub position: i64,

    /// Current status
    pub status: ReservationStatus,

    /// End of the hold, set on activation
    pub valid_until: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl TicketReservation {
    /// Build a new reservation in the `enqueued` state
    pub fn enqueued(sale_id: Uuid, request: EnqueueReservation) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sale_id,
            reservation_number: request.reservation_number,
            quantity: request.quantity,
            position: 0,
            status: ReservationStatus::Enqueued,
            valid_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the reservation holds tickets at `now`
    #[inline]
    pub fn is_holding_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Active
            && self.valid_until.map_or(false, |until| until > now)
    }

    /// Check if this is an active hold whose window has closed
    pub fn is_lapsed_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Active
            && self.valid_until.map_or(true, |until| until <= now)
    }

    /// Admit the reservation and stamp the end of its hold
    ///
    /// Leaves the reservation untouched if `now + hold` is not a
    /// representable instant.
    pub fn activate(&mut self, now: DateTime<Utc>, hold: Duration) -> Result<(), AppError> {
        let valid_until = now.checked_add_signed(hold).ok_or_else(|| {
            AppError::Internal(format!(
                "hold of {}s from {} overflows the calendar",
                hold.num_seconds(),
                now
            ))
        })?;

        self.status = ReservationStatus::Active;
        self.valid_until = Some(valid_until);
        self.updated_at = now;
        Ok(())
    }

    /// Reject the reservation permanently
    pub fn reject(&mut self, now: DateTime<Utc>) {
        self.status = ReservationStatus::NoAvailability;
        self.updated_at = now;
    }

    /// Mark a lapsed hold as reclaimed
    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.status = ReservationStatus::Expired;
        self.updated_at = now;
    }
}

/// Enqueue request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnqueueReservation {
    /// Number of tickets to hold
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,

    /// Caller-supplied unique reservation number
    #[validate(length(min = 1, max = 100, message = "Reservation number is required"))]
    pub reservation_number: String,
}

impl EnqueueReservation {
    pub fn new(quantity: i32, reservation_number: impl Into<String>) -> Self {
        Self {
            quantity,
            reservation_number: reservation_number.into(),
        }
    }
}
