//! Skill ledger and storage trait.
//!
//! The ledger is a single keyed collection with a per-record partition
//! field; the two-document Active/Historical layout is a concern of the
//! file store, not of the data model. This keeps skill names unique across
//! partitions by construction.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{Partition, SkillRecord};
use crate::error::Result;

/// All skill records, keyed by skill name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    records: BTreeMap<String, SkillRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record under its own name.
    pub fn insert(&mut self, record: SkillRecord) {
        self.records.insert(record.name.clone(), record);
    }

    pub fn get(&self, name: &str) -> Option<&SkillRecord> {
        self.records.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SkillRecord> {
        self.records.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillRecord> {
        self.records.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SkillRecord> {
        self.records.values_mut()
    }

    /// Skill names in order, for iteration patterns that need to mutate
    /// records one at a time.
    pub fn names(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Records currently in the given partition, in name order.
    pub fn partition(&self, partition: Partition) -> impl Iterator<Item = &SkillRecord> {
        self.records.values().filter(move |r| r.partition == partition)
    }

    /// (active, historical) record counts.
    pub fn partition_counts(&self) -> (usize, usize) {
        let active = self.partition(Partition::Active).count();
        (active, self.records.len() - active)
    }
}

impl FromIterator<SkillRecord> for Ledger {
    fn from_iter<I: IntoIterator<Item = SkillRecord>>(iter: I) -> Self {
        let mut ledger = Ledger::new();
        for record in iter {
            ledger.insert(record);
        }
        ledger
    }
}

/// Trait for ledger storage backends.
///
/// One load-all / compute / write-all cycle per pass; the engine assumes
/// exclusive access for the duration.
pub trait SkillStore: Send + Sync {
    /// Load the full ledger, both partitions.
    fn load(&self) -> Result<Ledger>;

    /// Persist the full ledger, replacing the previous state.
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// Blanket implementation for Arc-wrapped stores, for sharing a store
/// between tests and commands.
impl<T: SkillStore + ?Sized> SkillStore for Arc<T> {
    fn load(&self) -> Result<Ledger> {
        (**self).load()
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        (**self).save(ledger)
    }
}

/// Test utilities for SkillStore implementations.
#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::core::Tier;

    /// Shared round-trip check for SkillStore implementations.
    pub fn test_skill_store_round_trip<S: SkillStore>(store: &S) {
        assert!(store.load().unwrap().is_empty());

        let mut ledger = Ledger::new();
        let mut active = SkillRecord::new(
            "Rust",
            Tier::TechStack {
                category: "languages".to_string(),
            },
        );
        active.level = 2;
        ledger.insert(active);

        let mut historical = SkillRecord::new("Kubernetes", Tier::Orchestration);
        historical.partition = Partition::Historical;
        ledger.insert(historical);

        store.save(&ledger).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("Rust").unwrap().level, 2);
        assert_eq!(loaded.get("Rust").unwrap().partition, Partition::Active);
        assert_eq!(
            loaded.get("Kubernetes").unwrap().partition,
            Partition::Historical
        );
        assert_eq!(loaded.partition_counts(), (1, 1));
    }

    #[test]
    fn test_ledger_insert_keys_by_name() {
        let mut ledger = Ledger::new();
        ledger.insert(SkillRecord::new("Rust", Tier::Orchestration));
        ledger.insert(SkillRecord::new("Git", Tier::Orchestration));

        assert!(ledger.contains("Rust"));
        assert_eq!(ledger.names(), vec!["Git", "Rust"]);
    }

    #[test]
    fn test_ledger_from_iterator() {
        let ledger: Ledger = ["Rust", "Git"]
            .into_iter()
            .map(|name| SkillRecord::new(name, Tier::Orchestration))
            .collect();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("Git"));
    }

    #[test]
    fn test_ledger_insert_replaces_same_name() {
        let mut ledger = Ledger::new();
        ledger.insert(SkillRecord::new("Rust", Tier::Orchestration));
        let mut updated = SkillRecord::new("Rust", Tier::Orchestration);
        updated.level = 3;
        ledger.insert(updated);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get("Rust").unwrap().level, 3);
    }
}
