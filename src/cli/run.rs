//! Run command: one full engine pass over the ledger.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::cli::open_store;
use crate::config::Config;
use crate::core::EvidenceObservation;
use crate::engine::pipeline;
use crate::error::{FailOpen, Result, TallyError};
use crate::report::{ChangeReport, GateReport};
use crate::store::SkillStore;
use crate::util::read_to_string_limited;

/// Options for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Ledger directory override.
    pub ledger_dir: Option<PathBuf>,
    /// JSON file holding the pass's evidence observations.
    pub observations: Option<PathBuf>,
    /// Compute and report without persisting.
    pub dry_run: bool,
    /// Date override for the pass; defaults to the local date.
    pub today: Option<NaiveDate>,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output of the run command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// False when any skill failed its level gate this pass.
    pub success: bool,
    pub dry_run: bool,
    pub skills: usize,
    pub observations: usize,
    pub report: ChangeReport,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub gate_failures: Vec<GateReport>,
}

/// Execute one pass.
pub fn execute(options: &RunOptions) -> Result<RunOutput> {
    let config = Config::load();
    let store = open_store(&options.ledger_dir)?;
    let mut ledger = store.load()?;

    let observations = match &options.observations {
        Some(path) => load_observations(path)?,
        None => Vec::new(),
    };
    let today = options.today.unwrap_or_else(|| Local::now().date_naive());

    let outcome = pipeline::run_pass(&mut ledger, &observations, today, &config);

    if !options.dry_run {
        store.save(&ledger)?;
        // The report is a derived artifact; failing to write it should not
        // fail a pass whose ledger already saved.
        persist_report(store.dir(), &outcome.report).fail_open_default("persisting change report");
    }

    let gate_failures: Vec<GateReport> = outcome
        .gates
        .into_iter()
        .filter(|g| g.verdict == crate::engine::Verdict::Fail)
        .collect();

    Ok(RunOutput {
        success: gate_failures.is_empty(),
        dry_run: options.dry_run,
        skills: ledger.len(),
        observations: observations.len(),
        report: outcome.report,
        gate_failures,
    })
}

fn load_observations(path: &Path) -> Result<Vec<EvidenceObservation>> {
    let content = read_to_string_limited(path)?;
    serde_json::from_str(&content)
        .map_err(|e| TallyError::serde(format!("{}: {}", path.display(), e)))
}

/// Persist the change report as a dated document under `reports/`.
fn persist_report(dir: &Path, report: &ChangeReport) -> Result<()> {
    let reports_dir = dir.join("reports");
    fs::create_dir_all(&reports_dir).map_err(|e| TallyError::storage(&reports_dir, e))?;

    let path = reports_dir.join(format!("{}.json", report.document_name()));
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    fs::write(&path, json).map_err(|e| TallyError::storage(&path, e))
}

/// Render output for the terminal.
pub fn render(output: &RunOutput, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = Vec::new();
    let report = &output.report;
    lines.push(format!(
        "Pass complete ({} skills, {} observations){}",
        output.skills,
        output.observations,
        if output.dry_run { " [dry run]" } else { "" }
    ));
    lines.push(format!(
        "  created: {}  promoted: {}  demoted: {}  decayed: {}  restored: {}",
        report.created.len(),
        report.promotions.len(),
        report.demotions.len(),
        report.decayed.len(),
        report.restored.len()
    ));
    for entry in &report.ambiguous {
        lines.push(format!("  ambiguous: {} ({})", entry.skill, entry.reason));
    }
    for gate in &output.gate_failures {
        lines.push(format!(
            "  gate FAIL: {} (level {}): {}",
            gate.skill,
            gate.level,
            gate.messages.join("; ")
        ));
    }
    for warning in &report.warnings {
        lines.push(format!("  warning: {}", warning));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        EvidenceQuality, Frequency, SkillRecord, TemporalMetadata, Tier, Trend,
    };
    use crate::store::{FileStore, Ledger};
    use serial_test::serial;
    use tempfile::TempDir;

    fn observation_file(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("observations.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    #[serial]
    fn test_run_creates_records_and_persists() {
        let temp = TempDir::new().unwrap();
        let obs_path = observation_file(
            temp.path(),
            r#"[{"skill_name":"Rust","session_id":"s-1","date":"2025-06-01"}]"#,
        );

        let options = RunOptions {
            ledger_dir: Some(temp.path().join("ledger")),
            observations: Some(obs_path),
            today: Some(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()),
            ..RunOptions::default()
        };
        let output = execute(&options).unwrap();

        assert!(output.success);
        assert_eq!(output.report.created.len(), 1);
        assert!(temp.path().join("ledger").join("active.json").exists());
        assert!(temp
            .path()
            .join("ledger")
            .join("reports")
            .join("skill_status_changes_20250602.json")
            .exists());
    }

    #[test]
    #[serial]
    fn test_dry_run_does_not_persist() {
        let temp = TempDir::new().unwrap();
        let obs_path = observation_file(
            temp.path(),
            r#"[{"skill_name":"Rust","session_id":"s-1","date":"2025-06-01"}]"#,
        );

        let options = RunOptions {
            ledger_dir: Some(temp.path().join("ledger")),
            observations: Some(obs_path),
            dry_run: true,
            today: Some(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()),
            ..RunOptions::default()
        };
        let output = execute(&options).unwrap();

        assert!(output.dry_run);
        assert_eq!(output.report.created.len(), 1);
        // Store directory is created but the documents are not written
        assert!(!temp.path().join("ledger").join("active.json").exists());
    }

    #[test]
    #[serial]
    fn test_malformed_observations_file_errors() {
        let temp = TempDir::new().unwrap();
        let obs_path = observation_file(temp.path(), "not json");

        let options = RunOptions {
            ledger_dir: Some(temp.path().join("ledger")),
            observations: Some(obs_path),
            ..RunOptions::default()
        };
        assert!(execute(&options).is_err());
    }

    #[test]
    #[serial]
    fn test_gate_failure_makes_pass_unsuccessful() {
        let temp = TempDir::new().unwrap();
        let ledger_dir = temp.path().join("ledger");

        // Seed a single-session skill holding level 2
        let store = FileStore::with_dir(&ledger_dir).unwrap();
        let mut record = SkillRecord::new("X", Tier::Orchestration);
        record.level = 2;
        record.temporal = Some(TemporalMetadata {
            first_seen: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            last_seen: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            session_count: 1,
            frequency: Frequency::SingleSession,
            trend: Trend::Learning,
            confidence_score: 60,
            evidence_quality: EvidenceQuality::Moderate,
            decay_applied: None,
            promoted_date: None,
            demoted_date: None,
        });
        let ledger: Ledger = [record].into_iter().collect();
        store.save(&ledger).unwrap();

        let options = RunOptions {
            ledger_dir: Some(ledger_dir),
            today: Some(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()),
            ..RunOptions::default()
        };
        let output = execute(&options).unwrap();

        assert!(!output.success);
        assert_eq!(output.gate_failures.len(), 1);
        assert_eq!(output.gate_failures[0].skill, "X");
    }

    #[test]
    fn test_render_human_summary() {
        let output = RunOutput {
            success: true,
            dry_run: false,
            skills: 3,
            observations: 2,
            report: ChangeReport::new(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()),
            gate_failures: Vec::new(),
        };
        let text = render(&output, false);
        assert!(text.contains("3 skills"));
        assert!(text.contains("created: 0"));
    }
}
