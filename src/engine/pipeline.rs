//! The per-run pass.
//!
//! Wires the stages in order: observation merge, temporal refresh,
//! confidence rescore, gate validation, decay/restoration, lifecycle
//! repartition, flag audit. Running the pass twice on unchanged input
//! leaves the ledger unchanged; per-skill problems degrade to warnings and
//! never abort the run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::{
    EvidenceNote, EvidenceObservation, OutcomeValidationStatus, SkillRecord, Tier,
};
use crate::engine::{confidence, decay, flags, gates, lifecycle, temporal};
use crate::engine::{DecayOutcome, LifecycleDecision};
use crate::report::{ChangeEntry, ChangeReport, GateReport};
use crate::store::Ledger;

/// Output of one full pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub report: ChangeReport,
    pub gates: Vec<GateReport>,
}

/// Run one full pass over the ledger.
///
/// `observations` is the append-only evidence stream; records are created
/// at level 0 for skills seen for the first time. The ledger is mutated in
/// place; persisting it is the caller's responsibility.
pub fn run_pass(
    ledger: &mut Ledger,
    observations: &[EvidenceObservation],
    today: NaiveDate,
    config: &Config,
) -> PassOutcome {
    let mut report = ChangeReport::new(today);
    let mut gate_reports = Vec::new();

    let by_skill = group_by_skill(observations);

    // Stage 1: create missing records and merge new evidence.
    for (name, observed) in &by_skill {
        if !ledger.contains(name) {
            ledger.insert(SkillRecord::new(name.clone(), Tier::Orchestration));
            report
                .created
                .push(ChangeEntry::new(name.clone(), "first evidence observation"));
            debug!(skill = %name, "created level-0 record");
        }
        if let Some(record) = ledger.get_mut(name) {
            merge_observations(record, observed, today, config);
        }
    }

    // Stages 2-6 run over every record, observed this pass or not.
    for name in ledger.names() {
        let observed_quantitative = by_skill
            .get(&name)
            .is_some_and(|obs| obs.iter().any(|o| o.quantitative));
        let Some(record) = ledger.get_mut(&name) else {
            continue;
        };

        if let Err(e) = record.check_shape() {
            warn!(skill = %name, error = %e, "malformed record, skipping this pass");
            report.warnings.push(format!("{}: {}", name, e));
            continue;
        }
        if record.temporal.is_none() && record.level > 0 {
            warn!(skill = %name, "no temporal metadata on a leveled skill");
            report.warnings.push(format!(
                "{}: level {} without temporal metadata",
                name, record.level
            ));
        }

        temporal::refresh_classification(record, today, &config.frequency_thresholds);
        confidence::rescore(record, today, observed_quantitative);

        let gate = gates::validate(record, config, observed_quantitative);
        for flag in gates::advisory_flags(record, today) {
            flags::append_unique(record, flag);
        }
        gate_reports.push(gate);

        match decay::apply(record, today, &config.decay) {
            DecayOutcome::Decayed {
                from_level,
                to_level,
                reason,
            } => report
                .decayed
                .push(ChangeEntry::new(&name, reason).with_levels(from_level, to_level)),
            DecayOutcome::Restored { from_level } => report.restored.push(
                ChangeEntry::new(&name, "renewed activity after decay")
                    .with_levels(from_level, record.level),
            ),
            DecayOutcome::Flagged { reason } => {
                report.decayed.push(ChangeEntry::new(&name, reason));
            }
            DecayOutcome::Unchanged => {}
        }

        match lifecycle::evaluate(record, today, config) {
            LifecycleDecision::Promote { reason } => {
                lifecycle::promote(record, today);
                report.promotions.push(ChangeEntry::new(&name, reason));
            }
            LifecycleDecision::Demote { reason } => {
                lifecycle::demote(record, today);
                report.demotions.push(ChangeEntry::new(&name, reason));
            }
            LifecycleDecision::Ambiguous {
                promote_reason,
                demote_reason,
            } => {
                report.ambiguous.push(ChangeEntry::new(
                    &name,
                    format!("promote: {}; demote: {}", promote_reason, demote_reason),
                ));
            }
            LifecycleDecision::Stay => {}
        }

        for finding in flags::audit(record, today, config.flags.stale_age_days) {
            report.warnings.push(finding.message);
        }
    }

    PassOutcome {
        report,
        gates: gate_reports,
    }
}

fn group_by_skill<'a>(
    observations: &'a [EvidenceObservation],
) -> BTreeMap<String, Vec<&'a EvidenceObservation>> {
    let mut by_skill: BTreeMap<String, Vec<&EvidenceObservation>> = BTreeMap::new();
    for obs in observations {
        by_skill.entry(obs.skill_name.clone()).or_default().push(obs);
    }
    by_skill
}

/// Fold one pass's observations for a skill into its record.
///
/// Dedupe rules keep the merge idempotent when the same stream is
/// re-delivered: evidence notes key on source, outcomes on (kind,
/// reference), and session dates only count past the recorded window.
fn merge_observations(
    record: &mut SkillRecord,
    observed: &[&EvidenceObservation],
    today: NaiveDate,
    config: &Config,
) {
    let dates = temporal::distinct_dates(observed);
    temporal::apply_observations(record, &dates, today, &config.frequency_thresholds);

    for obs in observed {
        if !record.evidence.iter().any(|e| e.source == obs.session_id) {
            record.evidence.push(EvidenceNote {
                source: obs.session_id.clone(),
                date: Some(obs.date),
                note: obs.note.clone(),
            });
        }

        for outcome in &obs.outcomes {
            let duplicate = record
                .outcome_evidence
                .iter()
                .any(|o| o.kind == outcome.kind && o.reference == outcome.reference);
            if !duplicate {
                record.outcome_evidence.push(outcome.clone());
            }
        }
    }

    if !record.outcome_evidence.is_empty()
        && record.outcome_validation_status == OutcomeValidationStatus::NotRequired
    {
        record.outcome_validation_status = OutcomeValidationStatus::Pending;
    }
}
