//! Domain models for Boxoffice
//!
//! This module contains the sale and reservation models shared by every crate.

pub mod reservation;
pub mod sale;

pub use reservation::{EnqueueReservation, ReservationStatus, TicketReservation};
pub use sale::{NewSale, Sale};
