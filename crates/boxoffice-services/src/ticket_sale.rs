//! Ticket sale service
//!
//! Owns the reservation queue of every sale and runs admission passes:
//! - Create sales
//! - Queue reservations (no capacity check)
//! - Process a sale's queue under its exclusive lock
//! - Query reservations and availability

use boxoffice_core::{
    clock::Clock,
    models::{EnqueueReservation, NewSale, ReservationStatus, Sale, TicketReservation},
    traits::{ReservationRepository, SaleRepository},
    AppError, AppResult,
};
use chrono::Duration;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::admission::{plan_pass, QueuedRequest};
use crate::locks::SaleLocks;

/// What one admission pass did to a sale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub sale_id: Uuid,
    pub activated: usize,
    pub rejected: usize,
    /// Reservations left queued because the pass halted
    pub skipped: usize,
    /// Availability when the pass finished
    pub available: i32,
}

/// Ticket sale service
pub struct TicketSaleService<S: SaleRepository, R: ReservationRepository> {
    sale_repo: Arc<S>,
    reservation_repo: Arc<R>,
    clock: Arc<dyn Clock>,
    locks: Arc<SaleLocks>,
    hold: Duration,
}

impl<S: SaleRepository, R: ReservationRepository> TicketSaleService<S, R> {
    /// Create a new ticket sale service
    ///
    /// `locks` must be shared with any other component that mutates the
    /// same sales, such as the hold sweeper.
    pub fn new(
        sale_repo: Arc<S>,
        reservation_repo: Arc<R>,
        clock: Arc<dyn Clock>,
        locks: Arc<SaleLocks>,
        hold: Duration,
    ) -> Self {
        Self {
            sale_repo,
            reservation_repo,
            clock,
            locks,
            hold,
        }
    }

    /// Register a new sale
    ///
    /// Sale names are unique; the repository rejects a taken name.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_sale(&self, request: NewSale) -> AppResult<Sale> {
        request.validate()?;

        let sale = self.sale_repo.create(&request.into_sale()).await?;
        info!("Created sale {} with capacity {}", sale.id, sale.capacity);

        Ok(sale)
    }

    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<Sale> {
        self.sale_repo
            .find_by_id(sale_id)
            .await?
            .ok_or_else(|| AppError::SaleNotFound(sale_id.to_string()))
    }

    pub async fn list_sales(&self) -> AppResult<Vec<Sale>> {
        self.sale_repo.find_all().await
    }

    /// Append a reservation to the end of a sale's queue
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Quantity is not positive or the number is empty
    /// - The sale does not exist
    /// - The reservation number is already taken
    #[instrument(skip(self, request), fields(number = %request.reservation_number))]
    pub async fn queue_reservation(
        &self,
        sale_id: Uuid,
        request: EnqueueReservation,
    ) -> AppResult<TicketReservation> {
        request.validate()?;
        self.get_sale(sale_id).await?;

        let reservation = self
            .reservation_repo
            .create(&TicketReservation::enqueued(sale_id, request))
            .await?;

        debug!(
            "Queued reservation {} for {} tickets on sale {}",
            reservation.reservation_number, reservation.quantity, sale_id
        );

        Ok(reservation)
    }

    /// Run one admission pass over a sale's queue
    ///
    /// The backlog is snapshotted after the sale lock is taken; reservations
    /// queued later wait for the next pass.
    #[instrument(skip(self))]
    pub async fn process_queue(&self, sale_id: Uuid) -> AppResult<PassSummary> {
        let sale = self.get_sale(sale_id).await?;
        let _guard = self.locks.acquire(sale_id).await;

        let now = self.clock.now();
        let reservations = self.reservation_repo.list_by_sale(sale_id, None).await?;
        let available = sale.available_capacity(&reservations, now);

        let backlog: Vec<QueuedRequest> = reservations
            .iter()
            .filter(|r| r.status.is_pending())
            .map(|r| QueuedRequest {
                id: r.id,
                quantity: r.quantity,
            })
            .collect();

        let plan = plan_pass(&backlog, available, sale.capacity);

        let activate: HashSet<Uuid> = plan.activate.iter().copied().collect();
        let reject: HashSet<Uuid> = plan.reject.iter().copied().collect();

        let mut changed = Vec::with_capacity(activate.len() + reject.len());
        for mut reservation in reservations {
            if activate.contains(&reservation.id) {
                reservation.activate(now, self.hold)?;
                changed.push(reservation);
            } else if reject.contains(&reservation.id) {
                reservation.reject(now);
                changed.push(reservation);
            }
        }

        if !changed.is_empty() {
            self.reservation_repo.save_all(&changed).await?;
        }

        if let Some(halted) = plan.halted_at {
            debug!(
                "Pass halted at reservation {} with {} tickets left, {} left queued",
                halted, plan.remaining, plan.skipped
            );
        }
        if !plan.reject.is_empty() {
            warn!(
                "Rejected {} reservations on sale {} for lack of availability",
                plan.reject.len(),
                sale_id
            );
        }

        let summary = PassSummary {
            sale_id,
            activated: plan.activate.len(),
            rejected: plan.reject.len(),
            skipped: plan.skipped,
            available: plan.remaining,
        };

        info!(
            "Processed queue for sale {}: activated={}, rejected={}, skipped={}, available={}",
            sale_id, summary.activated, summary.rejected, summary.skipped, summary.available
        );

        Ok(summary)
    }

    /// Run one admission pass on every sale, in parallel
    pub async fn process_all(&self) -> AppResult<Vec<PassSummary>> {
        let sales = self.sale_repo.find_all().await?;
        join_all(sales.iter().map(|s| self.process_queue(s.id)))
            .await
            .into_iter()
            .collect()
    }

    /// Tickets still free to admit right now
    pub async fn available_capacity(&self, sale_id: Uuid) -> AppResult<i32> {
        let sale = self.get_sale(sale_id).await?;
        let reservations = self
            .reservation_repo
            .list_by_sale(sale_id, Some(ReservationStatus::Active))
            .await?;

        Ok(sale.available_capacity(&reservations, self.clock.now()))
    }

    /// A sale's reservations in queue order, optionally filtered by status
    pub async fn reservations(
        &self,
        sale_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> AppResult<Vec<TicketReservation>> {
        self.reservation_repo.list_by_sale(sale_id, status).await
    }

    pub async fn find_reservation(&self, reservation_number: &str) -> AppResult<TicketReservation> {
        self.reservation_repo
            .find_by_number(reservation_number)
            .await?
            .ok_or_else(|| AppError::ReservationNotFound(reservation_number.to_string()))
    }
}
