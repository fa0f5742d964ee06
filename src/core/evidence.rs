//! Evidence observations, the engine's external input.
//!
//! Upstream ingestion turns raw transcripts into one `EvidenceObservation`
//! per detected skill-mention per session. The engine never re-derives the
//! text classification; it consumes the typed leverage counts and quality
//! label as pre-computed signals (keeping the scoring core deterministic
//! and unit-testable independent of classification accuracy).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::record::OutcomeEvidence;

/// Scoring weights for the classification-time leverage score.
pub mod leverage_weights {
    /// Weight for strategic engagement patterns.
    pub const STRATEGIC: f64 = 3.0;
    /// Weight for directive instructions.
    pub const DIRECTIVE: f64 = 2.0;
    /// Weight for evaluative review of agent output.
    pub const EVALUATIVE: f64 = 2.0;
    /// Weight for iterative refinement loops.
    pub const ITERATIVE: f64 = 2.0;
    /// Penalty weight for learning-discussion instances.
    pub const LEARNING: f64 = 0.5;
    /// Weight per raw keyword hit.
    pub const TACTICAL: f64 = 0.5;
    /// Cap on the tactical contribution, preventing keyword spam dominance.
    pub const TACTICAL_CAP: f64 = 20.0;
}

/// How the operator engaged with the agent in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeverageContext {
    #[serde(default)]
    pub strategic: u32,
    #[serde(default)]
    pub directive: u32,
    #[serde(default)]
    pub evaluative: u32,
    #[serde(default)]
    pub iterative: u32,
    #[serde(default)]
    pub learning: u32,
}

impl LeverageContext {
    /// Total leverage signal, excluding the learning penalty.
    pub fn total_signal(&self) -> u32 {
        self.strategic + self.directive + self.evaluative + self.iterative
    }

    /// Classification-time weighted score for an observation.
    ///
    /// Combines leverage counts with fixed weights and a capped tactical
    /// (raw keyword) contribution. An observation with zero leverage signal
    /// scores 0 outright: it reflects agent action, not an
    /// operator-demonstrated skill.
    pub fn leverage_score(&self, tactical_count: u32) -> f64 {
        if self.total_signal() == 0 {
            return 0.0;
        }

        let tactical = (f64::from(tactical_count) * leverage_weights::TACTICAL)
            .min(leverage_weights::TACTICAL_CAP);

        let weighted = f64::from(self.strategic) * leverage_weights::STRATEGIC
            + f64::from(self.directive) * leverage_weights::DIRECTIVE
            + f64::from(self.evaluative) * leverage_weights::EVALUATIVE
            + f64::from(self.iterative) * leverage_weights::ITERATIVE
            + tactical
            - f64::from(self.learning) * leverage_weights::LEARNING;

        weighted.max(0.0)
    }
}

/// Quality label assigned by the upstream classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLabel {
    #[default]
    ActiveDemonstration,
    PassiveObservation,
    BlindAcceptance,
    LearningDiscussion,
}

impl QualityLabel {
    /// Whether the operator actively demonstrated the skill (vs. watching
    /// or rubber-stamping agent output).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::ActiveDemonstration)
    }
}

/// One detected skill-mention in one session. Immutable input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceObservation {
    pub skill_name: String,
    pub session_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub leverage: LeverageContext,
    #[serde(default)]
    pub quality: QualityLabel,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub outcomes: Vec<OutcomeEvidence>,
    /// Observation carries numeric/percentage evidence. Precomputed
    /// upstream; `util::has_quantitative_evidence` is the fallback.
    #[serde(default)]
    pub quantitative: bool,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub note: String,
}

impl EvidenceObservation {
    /// Create a minimal observation for a skill in a session.
    pub fn new(
        skill_name: impl Into<String>,
        session_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            skill_name: skill_name.into(),
            session_id: session_id.into(),
            date,
            leverage: LeverageContext::default(),
            quality: QualityLabel::default(),
            outcomes: Vec::new(),
            quantitative: false,
            note: String::new(),
        }
    }
}
