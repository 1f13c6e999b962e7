//! In-process record store
//!
//! Unlike Airtable, this store can check and insert under one lock, so it
//! enforces PIN uniqueness among active records at insert time.

use async_trait::async_trait;
use shared::models::{EmployeeRecord, NewEmployee};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::{EmployeeStore, StoreError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<EmployeeRecord>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, in insertion order
    pub async fn records(&self) -> Vec<EmployeeRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_active_by_pin(&self, pin: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.employee.actif && r.employee.pin == pin)
            .cloned())
    }

    async fn create(&self, employee: NewEmployee) -> Result<EmployeeRecord, StoreError> {
        let mut records = self.records.write().await;
        if employee.actif
            && records
                .iter()
                .any(|r| r.employee.actif && r.employee.pin == employee.pin)
        {
            return Err(StoreError::DuplicatePin);
        }

        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let record = EmployeeRecord {
            id: format!("rec{n:014}"),
            employee,
        };
        records.push(record.clone());
        Ok(record)
    }
}
