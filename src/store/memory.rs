//! In-memory ledger storage, for tests and dry runs.

use std::sync::Mutex;

use crate::error::Result;
use crate::store::{Ledger, SkillStore};

/// In-memory skill store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a ledger.
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }
}

impl SkillStore for MemoryStore {
    fn load(&self) -> Result<Ledger> {
        Ok(self.ledger.lock().expect("ledger lock poisoned").clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        *self.ledger.lock().expect("ledger lock poisoned") = ledger.clone();
        Ok(())
    }
}
