//! Ticket reservation repository implementation
//!
//! Keeps reservations in memory with a per-sale queue in enqueue order and a
//! global index on reservation number.

use async_trait::async_trait;
use boxoffice_core::{
    models::{ReservationStatus, TicketReservation},
    traits::{Repository, ReservationRepository},
    AppError, AppResult,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

#[derive(Default)]
struct ReservationTable {
    rows: HashMap<Uuid, TicketReservation>,
    by_number: HashMap<String, Uuid>,
    queues: HashMap<Uuid, Vec<Uuid>>,
    next_position: i64,
}

impl ReservationTable {
    fn queue(&self, sale_id: Uuid) -> impl Iterator<Item = &TicketReservation> + '_ {
        self.queues
            .get(&sale_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.rows.get(id))
    }
}

/// In-memory implementation of ReservationRepository
#[derive(Default)]
pub struct MemoryReservationRepository {
    table: RwLock<ReservationTable>,
}

impl MemoryReservationRepository {
    /// Create an empty reservation repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository<TicketReservation, Uuid> for MemoryReservationRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TicketReservation>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<TicketReservation>> {
        let mut all: Vec<TicketReservation> = self.table.read().rows.values().cloned().collect();
        all.sort_by_key(|r| r.position);
        Ok(all)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.read().rows.len() as i64)
    }

    #[instrument(skip(self, reservation), fields(number = %reservation.reservation_number))]
    async fn create(&self, reservation: &TicketReservation) -> AppResult<TicketReservation> {
        let mut table = self.table.write();

        if table.by_number.contains_key(&reservation.reservation_number) {
            warn!("Duplicate reservation number rejected");
            return Err(AppError::AlreadyExists(format!(
                "reservation {}",
                reservation.reservation_number
            )));
        }

        table.next_position += 1;
        let mut stored = reservation.clone();
        stored.position = table.next_position;

        table
            .by_number
            .insert(stored.reservation_number.clone(), stored.id);
        table.queues.entry(stored.sale_id).or_default().push(stored.id);
        table.rows.insert(stored.id, stored.clone());

        debug!(
            "Enqueued reservation {} at position {}",
            stored.id, stored.position
        );

        Ok(stored)
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservationRepository {
    async fn find_by_number(&self, reservation_number: &str) -> AppResult<Option<TicketReservation>> {
        let table = self.table.read();
        Ok(table
            .by_number
            .get(reservation_number)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn list_by_sale(
        &self,
        sale_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> AppResult<Vec<TicketReservation>> {
        let table = self.table.read();
        Ok(table
            .queue(sale_id)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, reservations), fields(count = reservations.len()))]
    async fn save_all(&self, reservations: &[TicketReservation]) -> AppResult<usize> {
        let mut table = self.table.write();

        if let Some(missing) = reservations.iter().find(|r| !table.rows.contains_key(&r.id)) {
            return Err(AppError::ReservationNotFound(missing.id.to_string()));
        }

        for reservation in reservations {
            table.rows.insert(reservation.id, reservation.clone());
        }

        Ok(reservations.len())
    }

    #[instrument(skip(self))]
    async fn expire_lapsed(&self, sale_id: Uuid, now: DateTime<Utc>) -> AppResult<usize> {
        let mut table = self.table.write();

        let lapsed: Vec<Uuid> = table
            .queue(sale_id)
            .filter(|r| r.is_lapsed_at(now))
            .map(|r| r.id)
            .collect();

        for id in &lapsed {
            if let Some(row) = table.rows.get_mut(id) {
                row.expire(now);
            }
        }

        if !lapsed.is_empty() {
            debug!("Expired {} lapsed holds", lapsed.len());
        }

        Ok(lapsed.len())
    }
}
