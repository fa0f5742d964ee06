//! Temporal metadata calculation.
//!
//! Turns a skill's observation-date history into `{first_seen, last_seen,
//! session_count, frequency, trend}`. Session counting is by distinct
//! calendar date, so multiple same-day mentions never inflate frequency.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::config::FrequencyThresholds;
use crate::core::{
    EvidenceObservation, EvidenceQuality, Frequency, SkillRecord, TemporalMetadata, Trend,
};

/// Distinct observation dates for one skill, in ascending order.
pub fn distinct_dates(observations: &[&EvidenceObservation]) -> BTreeSet<NaiveDate> {
    observations.iter().map(|o| o.date).collect()
}

/// Map a session count to its frequency tier.
///
/// Pure in `session_count`: 0-1 is single-session, then occasional up to
/// the `regular` boundary, regular up to the `frequent` boundary, frequent
/// above. A count of 0 (record exists but carries no counted sessions) is
/// classified as single-session rather than given its own tier.
pub fn frequency_for(session_count: u32, thresholds: &FrequencyThresholds) -> Frequency {
    if session_count <= 1 {
        Frequency::SingleSession
    } else if session_count < thresholds.regular {
        Frequency::Occasional
    } else if session_count < thresholds.frequent {
        Frequency::Regular
    } else {
        Frequency::Frequent
    }
}

/// Classify a skill's trend from recency and session count.
///
/// `recency_days` of `None` means the record has no usable `last_seen` and
/// is treated as maximally stale.
pub fn trend_for(session_count: u32, recency_days: Option<i64>) -> Trend {
    let Some(days) = recency_days else {
        return Trend::Stale;
    };

    if days <= 30 && session_count < 3 {
        Trend::Learning
    } else if days <= 60 && session_count >= 3 {
        Trend::Growing
    } else if days <= 90 {
        Trend::Stable
    } else if days <= 180 {
        Trend::Declining
    } else {
        Trend::Stale
    }
}

/// Build fresh metadata from a skill's full date history.
///
/// Returns `None` for an empty history. Confidence starts at 0/weak; the
/// scorer fills it in later in the pass.
pub fn calculate(
    dates: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    thresholds: &FrequencyThresholds,
) -> Option<TemporalMetadata> {
    let first_seen = *dates.first()?;
    let last_seen = *dates.last()?;
    let session_count = dates.len() as u32;

    Some(TemporalMetadata {
        first_seen,
        last_seen,
        session_count,
        frequency: frequency_for(session_count, thresholds),
        trend: trend_for(session_count, Some((today - last_seen).num_days())),
        confidence_score: 0,
        evidence_quality: EvidenceQuality::Weak,
        decay_applied: None,
        promoted_date: None,
        demoted_date: None,
    })
}

/// Merge newly observed dates into a record's metadata.
///
/// The evidence stream is append-only, so only dates strictly after the
/// recorded `last_seen` count as new sessions. Backdated dates extend
/// `first_seen` without recounting: dates inside the known window cannot
/// be distinguished from already-counted ones.
pub fn apply_observations(
    record: &mut SkillRecord,
    dates: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    thresholds: &FrequencyThresholds,
) {
    if dates.is_empty() {
        return;
    }

    match record.temporal.as_mut() {
        None => {
            record.temporal = calculate(dates, today, thresholds);
        }
        Some(temporal) => {
            let new_sessions = dates.iter().filter(|d| **d > temporal.last_seen).count() as u32;
            temporal.session_count += new_sessions;
            if let Some(earliest) = dates.first() {
                temporal.first_seen = temporal.first_seen.min(*earliest);
            }
            if let Some(latest) = dates.last() {
                temporal.last_seen = temporal.last_seen.max(*latest);
            }
        }
    }

    refresh_classification(record, today, thresholds);
}

/// Recompute frequency and trend from the current counts and `today`.
///
/// Run every pass, not only when new dates arrive: trend moves with the
/// calendar even for untouched skills.
pub fn refresh_classification(
    record: &mut SkillRecord,
    today: NaiveDate,
    thresholds: &FrequencyThresholds,
) {
    if let Some(temporal) = record.temporal.as_mut() {
        let recency = (today - temporal.last_seen).num_days();
        temporal.frequency = frequency_for(temporal.session_count, thresholds);
        temporal.trend = trend_for(temporal.session_count, Some(recency));
    }
}
