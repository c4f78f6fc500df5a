//! Boxoffice Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Boxoffice admission engine. It includes:
//!
//! - Domain models (Sale, TicketReservation)
//! - Repository and clock traits consumed by the services
//! - Unified error handling
//! - Application configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
