//! Hold sweeper
//!
//! Marks active reservations whose hold window has closed as expired. Lapsed
//! holds already stop counting against availability as soon as `valid_until`
//! passes; the sweep records that in the reservation status.

use boxoffice_core::{
    clock::Clock,
    traits::{ReservationRepository, SaleRepository},
    AppResult,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::locks::SaleLocks;

pub struct HoldSweeper<S: SaleRepository, R: ReservationRepository> {
    sale_repo: Arc<S>,
    reservation_repo: Arc<R>,
    clock: Arc<dyn Clock>,
    locks: Arc<SaleLocks>,
}

impl<S: SaleRepository, R: ReservationRepository> HoldSweeper<S, R> {
    pub fn new(
        sale_repo: Arc<S>,
        reservation_repo: Arc<R>,
        clock: Arc<dyn Clock>,
        locks: Arc<SaleLocks>,
    ) -> Self {
        Self {
            sale_repo,
            reservation_repo,
            clock,
            locks,
        }
    }

    /// Expire lapsed holds on one sale, returning how many were expired
    #[instrument(skip(self))]
    pub async fn sweep_sale(&self, sale_id: Uuid) -> AppResult<usize> {
        let _guard = self.locks.acquire(sale_id).await;
        let expired = self
            .reservation_repo
            .expire_lapsed(sale_id, self.clock.now())
            .await?;

        if expired > 0 {
            info!("Expired {} holds on sale {}", expired, sale_id);
        }

        Ok(expired)
    }

    /// Expire lapsed holds on every sale
    pub async fn sweep_all(&self) -> AppResult<usize> {
        let mut total = 0;
        for sale in self.sale_repo.find_all().await? {
            total += self.sweep_sale(sale.id).await?;
        }
        Ok(total)
    }
}
