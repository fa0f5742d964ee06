//! Tally - Skill Lifecycle & Temporal Scoring Engine
//!
//! Tally maintains a durable ledger of demonstrated skills for a Claude
//! Code operator, derived from evidence observations extracted out of
//! session transcripts. Each engine pass re-evaluates every skill's
//! temporal classification, confidence score, level claim, inactivity
//! decay, and Active/Historical placement, producing a machine-readable
//! change report. Passes are idempotent against an append-only evidence
//! stream.

pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod report;
pub mod store;
pub mod util;

pub use config::Config;
pub use core::{EvidenceObservation, SkillRecord};
pub use engine::pipeline::run_pass;
pub use error::{Result, TallyError};
pub use report::{ChangeReport, GateReport};
pub use store::{FileStore, Ledger, MemoryStore, SkillStore};
