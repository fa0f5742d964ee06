//! Confidence scoring.
//!
//! Produces the 0-100 confidence score and its evidence-quality bucket
//! from temporal metadata, evidence diversity, and the quantitative-evidence
//! signal. The classification-time leverage-weighted variant lives on
//! `LeverageContext` and is consumed here only as a pre-computed input.

use crate::core::{EvidenceQuality, SkillRecord, Trend};
use crate::util::has_quantitative_evidence;

/// Additive components of the confidence score.
pub mod score_weights {
    /// Neutral starting point.
    pub const BASE: i32 = 50;
    /// Per-session boost.
    pub const SESSION_BOOST_PER: i32 = 2;
    /// Cap on the session boost.
    pub const SESSION_BOOST_CAP: i32 = 20;
    /// Boost for activity within 30 days.
    pub const RECENCY_30D: i32 = 10;
    /// Boost for activity within 90 days.
    pub const RECENCY_90D: i32 = 5;
    /// Boost for quantitative (numeric/percentage) evidence.
    pub const QUANTITATIVE: i32 = 15;
    /// Boost for 3+ distinct evidence sources.
    pub const DIVERSITY_3: i32 = 10;
    /// Boost for 2 distinct evidence sources.
    pub const DIVERSITY_2: i32 = 5;
    /// Penalty for a single-session skill.
    pub const SINGLE_SESSION_PENALTY: i32 = 15;
    /// Penalty for a stale trend.
    pub const STALE_PENALTY: i32 = 10;
}

/// Inputs to one confidence computation, decoupled from the record shape.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceInputs {
    pub session_count: u32,
    /// `None` means no usable `last_seen`; no recency boost applies.
    pub recency_days: Option<i64>,
    pub trend: Trend,
    pub quantitative: bool,
    pub distinct_sources: usize,
}

/// Compute the confidence score, clamped to [0, 100].
pub fn confidence_score(inputs: &ConfidenceInputs) -> u8 {
    use score_weights::*;

    let mut score = BASE;

    score += (inputs.session_count as i32 * SESSION_BOOST_PER).min(SESSION_BOOST_CAP);

    match inputs.recency_days {
        Some(days) if days < 30 => score += RECENCY_30D,
        Some(days) if days < 90 => score += RECENCY_90D,
        _ => {}
    }

    if inputs.quantitative {
        score += QUANTITATIVE;
    }

    if inputs.distinct_sources >= 3 {
        score += DIVERSITY_3;
    } else if inputs.distinct_sources >= 2 {
        score += DIVERSITY_2;
    }

    if inputs.session_count == 1 {
        score -= SINGLE_SESSION_PENALTY;
    }

    if inputs.trend == Trend::Stale {
        score -= STALE_PENALTY;
    }

    score.clamp(0, 100) as u8
}

/// Bucket a confidence score into its evidence-quality tier.
pub fn quality_for(score: u8) -> EvidenceQuality {
    match score {
        90..=u8::MAX => EvidenceQuality::Exceptional,
        70..=89 => EvidenceQuality::Strong,
        50..=69 => EvidenceQuality::Moderate,
        _ => EvidenceQuality::Weak,
    }
}

/// Whether a record carries quantitative evidence anywhere: in its notes,
/// in outcome references, or via the per-pass observation signal.
pub fn record_has_quantitative(record: &SkillRecord, observed_quantitative: bool) -> bool {
    observed_quantitative
        || record
            .evidence
            .iter()
            .any(|e| has_quantitative_evidence(&e.note))
        || record
            .outcome_evidence
            .iter()
            .any(|o| has_quantitative_evidence(&o.reference))
}

/// Recompute a record's confidence score and quality bucket in place.
///
/// No-op for records without temporal metadata (level-0 skills that have
/// never been observed keep no score).
pub fn rescore(record: &mut SkillRecord, today: chrono::NaiveDate, observed_quantitative: bool) {
    let quantitative = record_has_quantitative(record, observed_quantitative);
    let distinct_sources = record.evidence_source_count();
    let recency = record.recency_days(today);

    if let Some(temporal) = record.temporal.as_mut() {
        let inputs = ConfidenceInputs {
            session_count: temporal.session_count,
            recency_days: recency,
            trend: temporal.trend,
            quantitative,
            distinct_sources,
        };
        temporal.confidence_score = confidence_score(&inputs);
        temporal.evidence_quality = quality_for(temporal.confidence_score);
    }
}
