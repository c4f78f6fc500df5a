//! Boxoffice Storage Layer
//!
//! This crate provides in-process repository implementations for the
//! Boxoffice engine. It includes:
//!
//! - Sale storage with name lookup
//! - Reservation storage with per-sale enqueue ordering
//! - Atomic uniqueness of reservation numbers

pub mod repositories;

pub use repositories::*;

// Re-export commonly used types
pub use boxoffice_core::{AppError, AppResult};
