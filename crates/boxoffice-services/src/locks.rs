//! Per-sale exclusive locks
//!
//! Admission passes and sweeps on one sale must never interleave. Different
//! sales get different locks and run in parallel.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of one async mutex per sale
#[derive(Default)]
pub struct SaleLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl SaleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `sale_id`
    pub async fn acquire(&self, sale_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks.entry(sale_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of sales that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
