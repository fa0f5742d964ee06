//! Machine-readable outputs of one engine pass.
//!
//! `ChangeReport` is the per-run change document (persisted as
//! `skill_status_changes_YYYYMMDD.json`); `GateReport` is the per-skill
//! verdict from level-gate validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::gates::Verdict;

/// One lifecycle change applied (or declined) during a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub skill: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub to_level: Option<u8>,
}

impl ChangeEntry {
    pub fn new(skill: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            reason: reason.into(),
            from_level: None,
            to_level: None,
        }
    }

    pub fn with_levels(mut self, from: u8, to: u8) -> Self {
        self.from_level = Some(from);
        self.to_level = Some(to);
        self
    }
}

/// The per-run change document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub created: Vec<ChangeEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub promotions: Vec<ChangeEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub demotions: Vec<ChangeEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub decayed: Vec<ChangeEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub restored: Vec<ChangeEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ambiguous: Vec<ChangeEntry>,
    /// Data-quality warnings (missing dates, malformed records, stale
    /// unresolved flags). Advisory only.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

impl ChangeReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            created: Vec::new(),
            promotions: Vec::new(),
            demotions: Vec::new(),
            decayed: Vec::new(),
            restored: Vec::new(),
            ambiguous: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Count of applied changes (warnings and ambiguous skips excluded).
    pub fn total_changes(&self) -> usize {
        self.created.len()
            + self.promotions.len()
            + self.demotions.len()
            + self.decayed.len()
            + self.restored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0 && self.ambiguous.is_empty() && self.warnings.is_empty()
    }

    /// Document stem for the persisted report, dated to the run.
    pub fn document_name(&self) -> String {
        format!("skill_status_changes_{}", self.date.format("%Y%m%d"))
    }
}

/// Per-skill verdict from level-gate validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateReport {
    pub skill: String,
    pub level: u8,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub messages: Vec<String>,
}
