//! Level-gate validation.
//!
//! A level is proposed by the operator or an upstream suggestion; this
//! module only verifies eligibility. Failures are reported, never
//! auto-corrected; correction is the decay engine's and lifecycle
//! manager's job on a later pass.

use chrono::NaiveDate;

use crate::config::Config;
use crate::core::{Frequency, ReviewFlag, Severity, SkillRecord};
use crate::engine::confidence::record_has_quantitative;
use crate::report::GateReport;
use serde::{Deserialize, Serialize};

/// Gate verdict for one skill's level claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

/// Recency beyond which a skill is flagged as stale regardless of level.
const STALE_SKILL_DAYS: i64 = 180;

/// Confidence below which a skill draws a low-confidence advisory.
const LOW_CONFIDENCE_FLOOR: u8 = 50;

/// Validate a record's current level against its evidence.
///
/// Hard invariant checked at every level: a single-session skill may never
/// hold level 2+. Level 2 requires the session and frequency thresholds
/// (fail) and a validated outcome (warn only). Level 3 is the only level
/// with a zero-tolerance outcome gate: it must carry validated external
/// outcome evidence.
pub fn validate(record: &SkillRecord, config: &Config, observed_quantitative: bool) -> GateReport {
    let mut failures: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let session_count = record.session_count();
    let frequency = record.temporal.as_ref().map(|t| t.frequency);

    if session_count == 1 && record.level >= 2 {
        failures.push(format!(
            "single-session skill cannot hold level {} (capped at 1)",
            record.level
        ));
    }

    if record.level >= 2 {
        let required = config.session_thresholds.level2;
        if session_count < required {
            failures.push(format!(
                "level 2 requires {} sessions, found {}",
                required, session_count
            ));
        }
        if !matches!(frequency, Some(Frequency::Regular | Frequency::Frequent)) {
            failures.push(format!(
                "level 2 requires regular or frequent use, found {}",
                frequency_name(frequency)
            ));
        }
        if !record.has_validated_outcome() {
            warnings.push("level 2 expects a validated outcome".to_string());
        }
    }

    if record.level >= 3 {
        let required = config.session_thresholds.level3;
        if session_count < required {
            failures.push(format!(
                "level 3 requires {} sessions, found {}",
                required, session_count
            ));
        }
        if frequency != Some(Frequency::Frequent) {
            failures.push(format!(
                "level 3 requires frequent use, found {}",
                frequency_name(frequency)
            ));
        }
        if !record_has_quantitative(record, observed_quantitative) {
            warnings.push("level 3 expects quantitative evidence".to_string());
        }
        if !record.has_external_validation() {
            failures.push(
                "level 3 requires a validated external outcome \
                (production_deployed or peer_validated)"
                    .to_string(),
            );
        }
    }

    let verdict = if !failures.is_empty() {
        Verdict::Fail
    } else if !warnings.is_empty() {
        Verdict::Warn
    } else {
        Verdict::Pass
    };

    let mut messages = failures;
    messages.append(&mut warnings);

    GateReport {
        skill: record.name.clone(),
        level: record.level,
        verdict,
        messages,
    }
}

fn frequency_name(frequency: Option<Frequency>) -> &'static str {
    match frequency {
        Some(Frequency::SingleSession) => "single-session",
        Some(Frequency::Occasional) => "occasional",
        Some(Frequency::Regular) => "regular",
        Some(Frequency::Frequent) => "frequent",
        None => "no recorded sessions",
    }
}

/// Advisory flags raised alongside gate validation.
///
/// These annotate the record for later review; they never change the
/// verdict.
pub fn advisory_flags(record: &SkillRecord, today: NaiveDate) -> Vec<ReviewFlag> {
    let mut flags = Vec::new();

    if record.session_count() == 1 && record.level >= 2 {
        flags.push(ReviewFlag::new(
            "single_session_level_2+",
            Severity::High,
            format!("level {} claimed from a single session", record.level),
            today,
        ));
    }

    if record
        .recency_days(today)
        .is_some_and(|d| d > STALE_SKILL_DAYS)
    {
        flags.push(ReviewFlag::new(
            "stale_skill",
            Severity::Medium,
            format!("no activity in over {} days", STALE_SKILL_DAYS),
            today,
        ));
    }

    if let Some(temporal) = &record.temporal {
        if temporal.confidence_score < LOW_CONFIDENCE_FLOOR {
            flags.push(ReviewFlag::new(
                "low_confidence",
                Severity::Medium,
                format!(
                    "confidence {} below {}; strengthen evidence",
                    temporal.confidence_score, LOW_CONFIDENCE_FLOOR
                ),
                today,
            ));
        }

        if record.level >= 3
            && matches!(
                temporal.frequency,
                Frequency::SingleSession | Frequency::Occasional
            )
        {
            flags.push(ReviewFlag::new(
                "level_frequency_mismatch",
                Severity::High,
                format!(
                    "level {} claimed with {} use",
                    record.level,
                    frequency_name(Some(temporal.frequency))
                ),
                today,
            ));
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        EvidenceQuality, Frequency, OutcomeEvidence, OutcomeKind, OutcomeStatus,
        OutcomeValidationStatus, TemporalMetadata, Tier, Trend,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record_at(level: u8, session_count: u32, frequency: Frequency) -> SkillRecord {
        let mut record = SkillRecord::new("X", Tier::Orchestration);
        record.level = level;
        record.temporal = Some(TemporalMetadata {
            first_seen: date(2025, 1, 1),
            last_seen: date(2025, 6, 1),
            session_count,
            frequency,
            trend: Trend::Stable,
            confidence_score: 60,
            evidence_quality: EvidenceQuality::Moderate,
            decay_applied: None,
            promoted_date: None,
            demoted_date: None,
        });
        record
    }

    fn add_validated_outcome(record: &mut SkillRecord, kind: OutcomeKind) {
        record.outcome_evidence.push(OutcomeEvidence {
            kind,
            reference: "ref".to_string(),
            status: OutcomeStatus::Validated,
            date: None,
        });
        record.outcome_validation_status = OutcomeValidationStatus::Validated;
    }

    #[test]
    fn test_levels_0_and_1_always_pass() {
        let config = Config::default();
        for level in [0, 1] {
            let record = record_at(level, 1, Frequency::SingleSession);
            let report = validate(&record, &config, false);
            assert_eq!(report.verdict, Verdict::Pass, "level {}", level);
        }
    }

    #[test]
    fn test_single_session_level_2_fails() {
        let config = Config::default();
        let record = record_at(2, 1, Frequency::SingleSession);
        let report = validate(&record, &config, false);
        assert_eq!(report.verdict, Verdict::Fail);
        assert!(report.messages.iter().any(|m| m.contains("single-session")));
    }

    #[test]
    fn test_level_2_passes_with_sessions_frequency_and_outcome() {
        let config = Config::default();
        let mut record = record_at(2, 5, Frequency::Regular);
        add_validated_outcome(&mut record, OutcomeKind::TestsPassed);

        let report = validate(&record, &config, false);
        assert_eq!(report.verdict, Verdict::Pass);
        assert!(report.messages.is_empty());
    }

    #[test]
    fn test_level_2_missing_outcome_warns_only() {
        let config = Config::default();
        let record = record_at(2, 6, Frequency::Regular);
        let report = validate(&record, &config, false);
        assert_eq!(report.verdict, Verdict::Warn);
        assert!(report.messages[0].contains("validated outcome"));
    }

    #[test]
    fn test_level_2_insufficient_sessions_fails() {
        let config = Config::default();
        let record = record_at(2, 3, Frequency::Occasional);
        let report = validate(&record, &config, false);
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(
            report
                .messages
                .iter()
                .filter(|m| m.starts_with("level 2 requires"))
                .count(),
            2
        );
    }

    #[test]
    fn test_level_3_requires_external_validation() {
        let config = Config::default();
        let mut record = record_at(3, 20, Frequency::Frequent);
        // Internal outcome only: hard gate fails
        add_validated_outcome(&mut record, OutcomeKind::TestsPassed);
        let report = validate(&record, &config, true);
        assert_eq!(report.verdict, Verdict::Fail);

        add_validated_outcome(&mut record, OutcomeKind::ProductionDeployed);
        let report = validate(&record, &config, true);
        assert_eq!(report.verdict, Verdict::Pass);
    }

    #[test]
    fn test_level_3_missing_quantitative_warns() {
        let config = Config::default();
        let mut record = record_at(3, 20, Frequency::Frequent);
        add_validated_outcome(&mut record, OutcomeKind::PeerValidated);

        let report = validate(&record, &config, false);
        assert_eq!(report.verdict, Verdict::Warn);
        assert!(report.messages[0].contains("quantitative"));
    }

    #[test]
    fn test_level_3_not_frequent_fails() {
        let config = Config::default();
        let mut record = record_at(3, 20, Frequency::Regular);
        add_validated_outcome(&mut record, OutcomeKind::PeerValidated);

        let report = validate(&record, &config, true);
        assert_eq!(report.verdict, Verdict::Fail);
        assert!(report.messages.iter().any(|m| m.contains("frequent")));
    }

    #[test]
    fn test_advisory_flags_single_session_and_mismatch() {
        let today = date(2025, 6, 10);
        let mut record = record_at(3, 1, Frequency::SingleSession);
        record.temporal.as_mut().unwrap().confidence_score = 30;

        let flags = advisory_flags(&record, today);
        let triggers: Vec<&str> = flags.iter().map(|f| f.trigger.as_str()).collect();
        assert!(triggers.contains(&"single_session_level_2+"));
        assert!(triggers.contains(&"low_confidence"));
        assert!(triggers.contains(&"level_frequency_mismatch"));
    }

    #[test]
    fn test_advisory_flags_stale_skill() {
        let record = record_at(1, 5, Frequency::Regular);
        // last_seen 2025-06-01; 181 days later
        let flags = advisory_flags(&record, date(2025, 11, 29));
        assert!(flags.iter().any(|f| f.trigger == "stale_skill"));

        // Exactly 180 days: not yet stale
        let flags = advisory_flags(&record, date(2025, 11, 28));
        assert!(flags.iter().all(|f| f.trigger != "stale_skill"));
    }

    #[test]
    fn test_healthy_record_raises_no_advisories() {
        let record = record_at(2, 8, Frequency::Regular);
        assert!(advisory_flags(&record, date(2025, 6, 10)).is_empty());
    }

    #[test]
    fn test_verdict_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Verdict::Fail).unwrap(), "\"FAIL\"");
        assert_eq!(
            serde_json::from_str::<Verdict>("\"PASS\"").unwrap(),
            Verdict::Pass
        );
    }
}
