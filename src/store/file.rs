//! File-based ledger storage.
//!
//! The ledger persists as two JSON documents under the ledger directory:
//! `active.json` and `history.json`. Each document nests tech-stack skills
//! under their category and keeps orchestration skills as a flat list.
//! Writes are atomic via the temp file + rename pattern, and the BTreeMap
//! ordering makes repeated saves of unchanged state byte-identical.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ledger_dir;
use crate::core::{Partition, SkillRecord, Tier};
use crate::error::{Result, TallyError};
use crate::store::{Ledger, SkillStore};
use crate::util::read_to_string_limited;

const ACTIVE_FILE: &str = "active.json";
const HISTORY_FILE: &str = "history.json";

/// Serialized shape of one partition document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PartitionDocument {
    #[serde(default)]
    tech_stack: BTreeMap<String, Vec<SkillRecord>>,
    #[serde(default)]
    orchestration: Vec<SkillRecord>,
}

impl PartitionDocument {
    fn from_ledger(ledger: &Ledger, partition: Partition) -> Self {
        let mut doc = PartitionDocument::default();
        for record in ledger.partition(partition) {
            match &record.tier {
                Tier::TechStack { category } => doc
                    .tech_stack
                    .entry(category.clone())
                    .or_default()
                    .push(record.clone()),
                Tier::Orchestration => doc.orchestration.push(record.clone()),
            }
        }
        doc
    }

    /// Reattach the positional tier and partition, then hand records to
    /// the ledger. A name already present (duplicated across documents)
    /// keeps its first occurrence.
    fn drain_into(self, ledger: &mut Ledger, partition: Partition) {
        let tagged = self
            .tech_stack
            .into_iter()
            .flat_map(|(category, records)| {
                records
                    .into_iter()
                    .map(move |r| (Tier::TechStack { category: category.clone() }, r))
            })
            .chain(
                self.orchestration
                    .into_iter()
                    .map(|r| (Tier::Orchestration, r)),
            );

        for (tier, mut record) in tagged {
            if ledger.contains(&record.name) {
                warn!(
                    skill = %record.name,
                    "duplicate skill across partitions, keeping first occurrence"
                );
                continue;
            }
            record.tier = tier;
            record.partition = partition;
            ledger.insert(record);
        }
    }
}

/// File-backed skill store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store at the default ledger directory
    /// (`~/.tally/ledger` or `$TALLY_LEDGER_DIR`).
    pub fn new() -> Result<Self> {
        let dir = ledger_dir().ok_or_else(|| {
            TallyError::config("Could not determine ledger directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a store at a custom directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| TallyError::storage(&dir, e))?;
        }
        Ok(Self { dir })
    }

    /// Directory this store persists into.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn load_document(&self, file: &str) -> Result<PartitionDocument> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(PartitionDocument::default());
        }
        let content = read_to_string_limited(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| TallyError::serde(format!("{}: {}", path.display(), e)))
    }

    fn write_document(&self, file: &str, doc: &PartitionDocument) -> Result<()> {
        let final_path = self.dir.join(file);
        let temp_path = self.dir.join(format!(".{}.tmp", file));

        let mut json = serde_json::to_string_pretty(doc)?;
        json.push('\n');

        {
            let mut temp = fs::File::create(&temp_path)
                .map_err(|e| TallyError::storage(&temp_path, e))?;
            temp.write_all(json.as_bytes())
                .map_err(|e| TallyError::storage(&temp_path, e))?;
            temp.sync_all().map_err(|e| TallyError::storage(&temp_path, e))?;
        }

        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            TallyError::storage(&final_path, e)
        })
    }
}

impl SkillStore for FileStore {
    fn load(&self) -> Result<Ledger> {
        let mut ledger = Ledger::new();
        self.load_document(ACTIVE_FILE)?
            .drain_into(&mut ledger, Partition::Active);
        self.load_document(HISTORY_FILE)?
            .drain_into(&mut ledger, Partition::Historical);
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let active = PartitionDocument::from_ledger(ledger, Partition::Active);
        let history = PartitionDocument::from_ledger(ledger, Partition::Historical);
        self.write_document(ACTIVE_FILE, &active)?;
        self.write_document(HISTORY_FILE, &history)
    }
}
