//! Core data model for Tally.
//!
//! `record` holds the durable `SkillRecord` shape; `evidence` holds the
//! immutable observation input produced by upstream ingestion.

pub mod evidence;
pub mod record;

pub use evidence::{
    leverage_weights, EvidenceObservation, LeverageContext, QualityLabel,
};
pub use record::{
    EvidenceNote, EvidenceQuality, Frequency, OutcomeEvidence, OutcomeKind, OutcomeStatus,
    OutcomeValidationStatus, Partition, Readiness, ReviewFlag, Severity, SkillRecord, Status,
    TemporalMetadata, Tier, Trend, ValidationType, MAX_LEVEL,
};
