//! Shared handle to the current sales table.
//!
//! Readers take a snapshot (`Arc` clone) and read without holding the lock.
//! A rebuild swaps in a complete new table, so readers see either the old
//! table or the new one, never a mix.

use crate::data::SalesTable;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
pub struct SharedTable {
    current: RwLock<Arc<SalesTable>>,
}

impl SharedTable {
    pub fn new(table: SalesTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// Snapshot of the current table.
    pub fn snapshot(&self) -> Arc<SalesTable> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Replace the table, returning the previous one.
    pub fn replace(&self, table: SalesTable) -> Arc<SalesTable> {
        let next = Arc::new(table);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}
