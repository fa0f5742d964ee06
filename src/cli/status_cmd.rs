//! Status command: partition, level, frequency, and trend summary.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cli::open_store;
use crate::core::MAX_LEVEL;
use crate::error::Result;
use crate::store::SkillStore;

/// Options for the status command.
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Ledger directory override.
    pub ledger_dir: Option<PathBuf>,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// A level-0 skill with a readiness assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessInfo {
    pub skill: String,
    pub readiness: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

/// Output of the status command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOutput {
    pub active: usize,
    pub historical: usize,
    /// Record count per level 0..=3, indexed by level.
    pub levels: Vec<usize>,
    pub frequencies: BTreeMap<String, usize>,
    pub trends: BTreeMap<String, usize>,
    pub open_flags: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub readiness: Vec<ReadinessInfo>,
}

/// Summarize the ledger.
pub fn execute(options: &StatusOptions) -> Result<StatusOutput> {
    let store = open_store(&options.ledger_dir)?;
    let ledger = store.load()?;

    let (active, historical) = ledger.partition_counts();
    let mut levels = vec![0usize; usize::from(MAX_LEVEL) + 1];
    let mut frequencies: BTreeMap<String, usize> = BTreeMap::new();
    let mut trends: BTreeMap<String, usize> = BTreeMap::new();
    let mut open_flags = 0;
    let mut readiness = Vec::new();

    for record in ledger.iter() {
        if let Some(slot) = levels.get_mut(usize::from(record.level)) {
            *slot += 1;
        }
        if let Some(temporal) = &record.temporal {
            *frequencies.entry(label(&temporal.frequency)).or_default() += 1;
            *trends.entry(label(&temporal.trend)).or_default() += 1;
        }
        open_flags += record.open_flags().count();

        if record.level == 0 {
            if let Some(assessment) = &record.readiness {
                readiness.push(ReadinessInfo {
                    skill: record.name.clone(),
                    readiness: label(assessment),
                    note: record.readiness_note.clone(),
                });
            }
        }
    }

    Ok(StatusOutput {
        active,
        historical,
        levels,
        frequencies,
        trends,
        open_flags,
        readiness,
    })
}

/// Serde-facing label for an enum value, without the surrounding quotes.
fn label<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

/// Render output for the terminal.
pub fn render(output: &StatusOutput, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![
        format!(
            "Skills: {} active, {} historical",
            output.active, output.historical
        ),
        format!(
            "Levels: {}",
            output
                .levels
                .iter()
                .enumerate()
                .map(|(level, count)| format!("L{}={}", level, count))
                .collect::<Vec<_>>()
                .join("  ")
        ),
    ];

    if !output.frequencies.is_empty() {
        lines.push(format!("Frequency: {}", counts_line(&output.frequencies)));
    }
    if !output.trends.is_empty() {
        lines.push(format!("Trend: {}", counts_line(&output.trends)));
    }
    lines.push(format!("Open review flags: {}", output.open_flags));

    for info in &output.readiness {
        let note = info
            .note
            .as_deref()
            .map(|n| format!(" ({})", n))
            .unwrap_or_default();
        lines.push(format!("  ready? {}: {}{}", info.skill, info.readiness, note));
    }

    lines.join("\n")
}

fn counts_line(counts: &BTreeMap<String, usize>) -> String {
    counts
        .iter()
        .map(|(name, count)| format!("{}={}", name, count))
        .collect::<Vec<_>>()
        .join("  ")
}
