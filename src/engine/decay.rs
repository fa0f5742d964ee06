//! Inactivity decay and restoration.
//!
//! Runs over every skill each pass. Restoration is checked first and, when
//! it fires, decay is skipped for that skill this cycle; the two are
//! mutually exclusive within a pass.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{DecayAction, DecayConfig};
use crate::core::{ReviewFlag, SkillRecord};
use crate::engine::flags;

/// Restoration always lands here, never at the pre-decay level.
const RESTORED_LEVEL: u8 = 1;

/// What the decay pass did to one skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecayOutcome {
    /// Renewed activity after decay; level reset to 1.
    Restored { from_level: u8 },
    /// One or more downgrade thresholds crossed.
    Decayed {
        from_level: u8,
        to_level: u8,
        /// Highest crossed threshold's message, for the change report.
        reason: String,
    },
    /// Only flag thresholds crossed; level untouched.
    Flagged { reason: String },
    Unchanged,
}

/// Apply restoration or decay to one record.
///
/// Records without temporal metadata are left alone: inactivity cannot be
/// dated. Records already carrying a `decay_applied` stamp are not decayed
/// again until restoration clears the stamp, which keeps repeated passes
/// over unchanged input from compounding.
pub fn apply(record: &mut SkillRecord, today: NaiveDate, config: &DecayConfig) -> DecayOutcome {
    let Some(temporal) = record.temporal.as_ref() else {
        return DecayOutcome::Unchanged;
    };

    // Restoration first: new evidence after the decay stamp wins.
    if let Some(applied) = temporal.decay_applied {
        if temporal.last_seen > applied {
            return restore(record, today);
        }
        return DecayOutcome::Unchanged;
    }

    let inactive_days = (today - temporal.last_seen).num_days();
    if inactive_days < 0 {
        return DecayOutcome::Unchanged;
    }

    let crossed: Vec<_> = config
        .sorted_thresholds()
        .into_iter()
        .filter(|t| inactive_days >= i64::from(t.days))
        .collect();
    if crossed.is_empty() {
        return DecayOutcome::Unchanged;
    }

    let mut downgrades: u8 = 0;
    let mut flag_reason = None;
    let mut downgrade_reason = None;

    for threshold in &crossed {
        match threshold.action {
            DecayAction::Flag => {
                flags::append_unique(
                    record,
                    ReviewFlag::new(
                        "skill_decay_flag",
                        threshold.severity,
                        threshold.message.clone(),
                        today,
                    ),
                );
                flag_reason = Some(threshold.message.clone());
            }
            DecayAction::Downgrade => {
                if config.cumulative || downgrades == 0 {
                    downgrades += 1;
                    downgrade_reason = Some(threshold.message.clone());
                }
            }
        }
    }

    if downgrades == 0 {
        return match flag_reason {
            Some(reason) => DecayOutcome::Flagged { reason },
            None => DecayOutcome::Unchanged,
        };
    }

    let from_level = record.level;
    record.level = record.level.saturating_sub(downgrades);
    let reason = downgrade_reason.unwrap_or_default();

    // The stamp marks an applied downgrade; flag-only crossings do not set
    // it, so restoration never strips levels from a merely-flagged skill.
    if let Some(temporal) = record.temporal.as_mut() {
        temporal.decay_applied = Some(today);
    }

    flags::append_unique(
        record,
        ReviewFlag::new(
            "skill_decay",
            crossed
                .iter()
                .filter(|t| t.action == DecayAction::Downgrade)
                .map(|t| t.severity)
                .max()
                .unwrap_or(crate::core::Severity::Medium),
            reason.clone(),
            today,
        ),
    );

    debug!(
        skill = %record.name,
        from_level,
        to_level = record.level,
        inactive_days,
        "decay applied"
    );

    DecayOutcome::Decayed {
        from_level,
        to_level: record.level,
        reason,
    }
}

fn restore(record: &mut SkillRecord, today: NaiveDate) -> DecayOutcome {
    let from_level = record.level;
    record.level = RESTORED_LEVEL;

    if let Some(temporal) = record.temporal.as_mut() {
        temporal.decay_applied = None;
    }

    flags::resolve(record, "skill_decay", today, "restored after renewed activity");
    flags::resolve(
        record,
        "skill_decay_flag",
        today,
        "restored after renewed activity",
    );
    flags::append_unique(
        record,
        ReviewFlag::new(
            "skill_restored",
            crate::core::Severity::Low,
            format!("restored to level {} after renewed activity", RESTORED_LEVEL),
            today,
        ),
    );

    debug!(skill = %record.name, from_level, "skill restored");

    DecayOutcome::Restored { from_level }
}
