//! Repository implementations
//!
//! This module contains concrete implementations of the repository traits
//! defined in boxoffice-core, backed by process memory.

pub mod reservation_repo;
pub mod sale_repo;

pub use reservation_repo::MemoryReservationRepository;
pub use sale_repo::MemorySaleRepository;
