//! Review-flag bookkeeping.
//!
//! Flags are append-only until explicitly resolved. This module owns the
//! dedupe-on-append rule, resolution, and the per-pass audit that surfaces
//! undated and stale-unresolved flags. Audit findings are advisory; they
//! never block anything.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{ReviewFlag, SkillRecord};

/// Append a flag unless an open flag with the same trigger already exists.
///
/// Returns whether the flag was added. Resolved flags with the same trigger
/// do not suppress a new occurrence.
pub fn append_unique(record: &mut SkillRecord, flag: ReviewFlag) -> bool {
    if record.open_flags().any(|f| f.trigger == flag.trigger) {
        return false;
    }
    record.review_flags.push(flag);
    true
}

/// Resolve every open flag with the given trigger.
///
/// Returns the number of flags resolved.
pub fn resolve(
    record: &mut SkillRecord,
    trigger: &str,
    today: NaiveDate,
    resolution: &str,
) -> usize {
    let mut resolved = 0;
    for flag in record
        .review_flags
        .iter_mut()
        .filter(|f| f.is_open() && f.trigger == trigger)
    {
        flag.resolved = Some(today);
        flag.resolution = Some(resolution.to_string());
        resolved += 1;
    }
    resolved
}

/// What the flag audit found wrong with one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagIssue {
    /// Flag has no `added` date, so its age cannot be tracked.
    MissingAdded,
    /// Flag has been open for at least the configured stale age.
    StaleUnresolved,
}

/// One finding from the per-pass flag audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagAuditEntry {
    pub skill: String,
    pub trigger: String,
    pub issue: FlagIssue,
    pub message: String,
}

/// Audit a record's open flags for age-tracking problems.
///
/// Resolved flags are never audited.
pub fn audit(record: &SkillRecord, today: NaiveDate, stale_age_days: u32) -> Vec<FlagAuditEntry> {
    let mut findings = Vec::new();

    for flag in record.open_flags() {
        match flag.added {
            None => findings.push(FlagAuditEntry {
                skill: record.name.clone(),
                trigger: flag.trigger.clone(),
                issue: FlagIssue::MissingAdded,
                message: format!(
                    "flag '{}' on {} has no added date; age cannot be tracked",
                    flag.trigger, record.name
                ),
            }),
            Some(added) => {
                let age = (today - added).num_days();
                if age >= i64::from(stale_age_days) {
                    findings.push(FlagAuditEntry {
                        skill: record.name.clone(),
                        trigger: flag.trigger.clone(),
                        issue: FlagIssue::StaleUnresolved,
                        message: format!(
                            "flag '{}' on {} unresolved for {} days",
                            flag.trigger, record.name, age
                        ),
                    });
                }
            }
        }
    }

    findings
}
