//! The lifecycle engine.
//!
//! Each submodule is one stage of the per-run pass, in pipeline order:
//! temporal classification, confidence scoring, level gating, decay and
//! restoration, Active/Historical lifecycle, and review-flag bookkeeping.
//! `pipeline` wires the stages together into one idempotent pass.
//!
//! All stages are pure over `(record, today, config)`: `today` is always
//! injected so tests can pin the calendar.

pub mod confidence;
pub mod decay;
pub mod flags;
pub mod gates;
pub mod lifecycle;
pub mod pipeline;
pub mod temporal;

pub use decay::DecayOutcome;
pub use gates::Verdict;
pub use lifecycle::LifecycleDecision;
