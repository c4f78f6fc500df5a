//! Common traits for repositories
//!
//! Defines the storage abstractions the services are written against.

use crate::error::AppError;
use crate::models::{ReservationStatus, Sale, TicketReservation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generic repository trait for basic entity access
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities in insertion order
    async fn find_all(&self) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;
}

/// Sale repository
///
/// `create` must reject a sale whose `name` is already taken atomically
/// with `AppError::AlreadyExists`.
#[async_trait]
pub trait SaleRepository: Repository<Sale, Uuid> {
    /// Find sale by name
    async fn find_by_name(&self, name: &str) -> Result<Option<Sale>, AppError>;
}

/// Reservation repository trait with specialized methods
///
/// `create` assigns the enqueue position and must reject a duplicate
/// `reservation_number` atomically with `AppError::AlreadyExists`.
#[async_trait]
pub trait ReservationRepository: Repository<TicketReservation, Uuid> {
    /// Find reservation by its caller-supplied number
    async fn find_by_number(
        &self,
        reservation_number: &str,
    ) -> Result<Option<TicketReservation>, AppError>;

    /// List a sale's reservations in enqueue order, optionally by status
    async fn list_by_sale(
        &self,
        sale_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<TicketReservation>, AppError>;

    /// Persist a batch of already-mutated reservations
    async fn save_all(&self, reservations: &[TicketReservation]) -> Result<usize, AppError>;

    /// Mark a sale's lapsed active holds as expired
    async fn expire_lapsed(&self, sale_id: Uuid, now: DateTime<Utc>) -> Result<usize, AppError>;
}
