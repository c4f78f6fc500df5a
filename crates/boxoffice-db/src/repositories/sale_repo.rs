//! Sale repository implementation

use async_trait::async_trait;
use boxoffice_core::{
    models::Sale,
    traits::{Repository, SaleRepository},
    AppError, AppResult,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

#[derive(Default)]
struct SaleTable {
    rows: HashMap<Uuid, Sale>,
    order: Vec<Uuid>,
}

impl SaleTable {
    fn by_name(&self, name: &str) -> Option<&Sale> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id))
            .find(|s| s.name == name)
    }
}

/// In-memory implementation of SaleRepository
#[derive(Default)]
pub struct MemorySaleRepository {
    table: RwLock<SaleTable>,
}

impl MemorySaleRepository {
    /// Create an empty sale repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository<Sale, Uuid> for MemorySaleRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Sale>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Sale>> {
        let table = self.table.read();
        Ok(table
            .order
            .iter()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.read().rows.len() as i64)
    }

    #[instrument(skip(self, sale), fields(sale_id = %sale.id))]
    async fn create(&self, sale: &Sale) -> AppResult<Sale> {
        let mut table = self.table.write();
        if table.rows.contains_key(&sale.id) {
            return Err(AppError::AlreadyExists(format!("sale {}", sale.id)));
        }
        if table.by_name(&sale.name).is_some() {
            warn!("Duplicate sale name '{}' rejected", sale.name);
            return Err(AppError::AlreadyExists(format!("sale '{}'", sale.name)));
        }

        table.order.push(sale.id);
        table.rows.insert(sale.id, sale.clone());
        debug!("Stored sale '{}' with capacity {}", sale.name, sale.capacity);

        Ok(sale.clone())
    }
}

#[async_trait]
impl SaleRepository for MemorySaleRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Sale>> {
        Ok(self.table.read().by_name(name).cloned())
    }
}
