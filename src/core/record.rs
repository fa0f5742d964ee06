//! Skill record data model for Tally.
//!
//! A `SkillRecord` is the unit of the ledger: one per skill name, unique
//! across the union of the Active and Historical partitions. Records are
//! created at Level 0 on first evidence and never deleted; the Historical
//! partition is the terminal archive for dormant or weakly-evidenced skills.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Highest proficiency level a skill can claim.
pub const MAX_LEVEL: u8 = 3;

/// Which partition of the ledger a record currently lives in.
///
/// Not serialized on the record itself: the file store derives it from
/// which document a record was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partition {
    #[default]
    Active,
    Historical,
}

/// Tech-stack category or orchestration tier.
///
/// Like `Partition`, the tier is positional in the serialized documents
/// (tech-stack skills nest under their category, orchestration skills are
/// a flat list) and is reattached on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tier {
    TechStack { category: String },
    Orchestration,
}

impl Default for Tier {
    fn default() -> Self {
        Self::Orchestration
    }
}

/// How a skill's level claim was validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationType {
    #[default]
    AgentAssessed,
    UserConfirmed,
    ExternalValidated,
}

/// Operator-visible skill status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Dormant,
}

/// Frequency tier, a pure function of session_count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "single-session")]
    SingleSession,
    #[serde(rename = "occasional")]
    Occasional,
    #[serde(rename = "regular")]
    Regular,
    #[serde(rename = "frequent")]
    Frequent,
}

/// Recency-weighted activity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Learning,
    Growing,
    Stable,
    Declining,
    Stale,
}

/// Evidence quality bucket derived from the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceQuality {
    Weak,
    Moderate,
    Strong,
    Exceptional,
}

/// Validation state of a skill's outcome evidence as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeValidationStatus {
    #[default]
    NotRequired,
    Validated,
    Pending,
}

/// Kind of outcome evidence attached to a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    TestsPassed,
    CodeShipped,
    ProblemSolved,
    ProductionDeployed,
    PeerValidated,
}

impl OutcomeKind {
    /// Whether this kind counts as external validation (the Level 3 hard gate).
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ProductionDeployed | Self::PeerValidated)
    }
}

/// Lifecycle state of a single outcome-evidence entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    #[default]
    Found,
    Validated,
    Pending,
}

/// Readiness assessment for a Level 0 skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    NotReady,
    ReadyToLearn,
    CanLearnQuickly,
    Avoid,
}

/// Severity of a review flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Evidence that a skill produced a validated real-world result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEvidence {
    #[serde(rename = "type")]
    pub kind: OutcomeKind,
    pub reference: String,
    #[serde(default)]
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<NaiveDate>,
}

/// A resolvable advisory annotation attached to a skill record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFlag {
    pub trigger: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub added: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resolved: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resolution: Option<String>,
}

impl ReviewFlag {
    /// Create a new unresolved flag dated today.
    pub fn new(
        trigger: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        added: NaiveDate,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            severity,
            message: message.into(),
            added: Some(added),
            resolved: None,
            resolution: None,
        }
    }

    /// Whether this flag is still awaiting resolution.
    pub fn is_open(&self) -> bool {
        self.resolved.is_none()
    }
}

/// A lightweight evidence reference on a record.
///
/// Distinct `source` values feed the diversity boost in the confidence
/// score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceNote {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub note: String,
}

/// Temporal metadata derived from a skill's evidence history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalMetadata {
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub session_count: u32,
    pub frequency: Frequency,
    pub trend: Trend,
    pub confidence_score: u8,
    pub evidence_quality: EvidenceQuality,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub decay_applied: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub promoted_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub demoted_date: Option<NaiveDate>,
}

/// One skill's durable record in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    #[serde(rename = "skill")]
    pub name: String,
    #[serde(skip, default)]
    pub tier: Tier,
    #[serde(skip, default)]
    pub partition: Partition,
    pub level: u8,
    #[serde(default)]
    pub validation: ValidationType,
    #[serde(default)]
    pub status: Status,
    /// True when the operator set `status` by hand; the lifecycle manager
    /// treats it as an override rather than a derived value.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub manual_override: bool,
    #[serde(
        rename = "temporal_metadata",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub temporal: Option<TemporalMetadata>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub evidence: Vec<EvidenceNote>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub outcome_evidence: Vec<OutcomeEvidence>,
    #[serde(default)]
    pub outcome_validation_status: OutcomeValidationStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub review_flags: Vec<ReviewFlag>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub readiness: Option<Readiness>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub readiness_note: Option<String>,
    /// Truncated evidence summary kept on collapsed Historical records.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub evidence_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status_note: Option<String>,
}

impl SkillRecord {
    /// Create a fresh Level 0 record for a newly observed skill.
    pub fn new(name: impl Into<String>, tier: Tier) -> Self {
        Self {
            name: name.into(),
            tier,
            partition: Partition::Active,
            level: 0,
            validation: ValidationType::AgentAssessed,
            status: Status::Active,
            manual_override: false,
            temporal: None,
            evidence: Vec::new(),
            outcome_evidence: Vec::new(),
            outcome_validation_status: OutcomeValidationStatus::NotRequired,
            review_flags: Vec::new(),
            readiness: None,
            readiness_note: None,
            evidence_note: None,
            status_note: None,
        }
    }

    /// Session count from temporal metadata, 0 when absent.
    pub fn session_count(&self) -> u32 {
        self.temporal.as_ref().map_or(0, |t| t.session_count)
    }

    /// Days since last activity, or `None` when the record has no
    /// `last_seen` (treated as maximally stale by callers).
    pub fn recency_days(&self, today: NaiveDate) -> Option<i64> {
        self.temporal
            .as_ref()
            .map(|t| (today - t.last_seen).num_days())
    }

    /// Whether the record carries at least one validated outcome.
    pub fn has_validated_outcome(&self) -> bool {
        self.outcome_validation_status == OutcomeValidationStatus::Validated
            && !self.outcome_evidence.is_empty()
    }

    /// Whether validated outcome evidence includes an external kind
    /// (production_deployed or peer_validated).
    pub fn has_external_validation(&self) -> bool {
        self.has_validated_outcome() && self.outcome_evidence.iter().any(|e| e.kind.is_external())
    }

    /// Count of distinct evidence sources.
    pub fn evidence_source_count(&self) -> usize {
        let mut sources: Vec<&str> = self.evidence.iter().map(|e| e.source.as_str()).collect();
        sources.sort_unstable();
        sources.dedup();
        sources.len()
    }

    /// Open (unresolved) review flags.
    pub fn open_flags(&self) -> impl Iterator<Item = &ReviewFlag> {
        self.review_flags.iter().filter(|f| f.is_open())
    }

    /// Structural sanity check. Violations are data-quality issues, not
    /// gate verdicts; callers degrade to warnings.
    pub fn check_shape(&self) -> crate::error::Result<()> {
        if self.level > MAX_LEVEL {
            return Err(crate::error::TallyError::invalid_record(
                &self.name,
                format!("level {} out of range 0-{}", self.level, MAX_LEVEL),
            ));
        }
        if let Some(temporal) = &self.temporal {
            if temporal.first_seen > temporal.last_seen {
                return Err(crate::error::TallyError::invalid_record(
                    &self.name,
                    format!(
                        "first_seen {} is after last_seen {}",
                        temporal.first_seen, temporal.last_seen
                    ),
                ));
            }
        }
        Ok(())
    }
}
