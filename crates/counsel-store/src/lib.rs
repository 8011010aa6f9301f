//! counsel-store — durable flat-file research storage
//!
//! One JSON document maps a lowercased topic key to an ordered list of
//! career records. Every mutation is a full read-modify-write of the
//! file. That is fine for the single-writer setup this system runs as;
//! concurrent writer processes would lose updates (scalability gap,
//! intentionally not papered over here — a real multi-writer deployment
//! needs a transactional store).

pub mod tools;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub use tools::{LookupCareerInfoTool, SaveCareerInfoTool};

/// Errors on the write path. Reads never fail: a missing or unparsable
/// file reads as an empty store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write research store: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize research store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One saved research finding. Records are append-only: never updated,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerRecord {
    pub career_title: String,
    pub description: String,
    #[serde(default)]
    pub salary_range: String,
    #[serde(default)]
    pub skills: String,
    pub saved_at: DateTime<Utc>,
}

type StoreDocument = BTreeMap<String, Vec<CareerRecord>>;

/// Flat-file store of career research, keyed by lowercased interest.
pub struct ResearchStore {
    path: PathBuf,
}

impl ResearchStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record under `interest` and return a human-readable
    /// confirmation.
    pub fn save(
        &self,
        interest: &str,
        career_title: &str,
        description: &str,
        salary_range: &str,
        skills: &str,
    ) -> Result<String, StoreError> {
        info!("Saving career info: {} for '{}'", career_title, interest);

        let mut document = self.load();
        let key = interest.to_lowercase();

        document.entry(key).or_default().push(CareerRecord {
            career_title: career_title.to_string(),
            description: description.to_string(),
            salary_range: salary_range.to_string(),
            skills: skills.to_string(),
            saved_at: Utc::now(),
        });

        self.write(&document)?;

        let result = format!("Saved: {career_title} for interest '{interest}'");
        info!("{}", result);
        Ok(result)
    }

    /// Look up every record saved under `interest` (case-insensitive) and
    /// format a report. The "not found" message keeps the caller's
    /// original casing.
    pub fn lookup(&self, interest: &str) -> String {
        info!("Looking up career info for: '{}'", interest);

        let document = self.load();
        let key = interest.to_lowercase();

        let records = match document.get(&key) {
            Some(records) if !records.is_empty() => records,
            _ => {
                let result = format!("No saved career data found for interest: {interest}");
                info!("{}", result);
                return result;
            }
        };

        let mut output = format!(
            "Found {} saved career(s) for '{}':\n",
            records.len(),
            interest
        );
        for (i, record) in records.iter().enumerate() {
            output.push_str(&format!("\n{}. {}\n", i + 1, record.career_title));
            output.push_str(&format!("   Description: {}\n", record.description));
            if !record.salary_range.is_empty() {
                output.push_str(&format!("   Salary: {}\n", record.salary_range));
            }
            if !record.skills.is_empty() {
                output.push_str(&format!("   Skills: {}\n", record.skills));
            }
        }

        info!("Found {} results", records.len());
        output
    }

    /// Load the full document. A missing file is an empty store; a
    /// corrupt file is logged and treated as empty rather than failing
    /// the operation (lossy but available).
    fn load(&self) -> StoreDocument {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return StoreDocument::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    "Research store {} is unreadable ({}); treating as empty",
                    self.path.display(),
                    e
                );
                StoreDocument::new()
            }
        }
    }

    fn write(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(document)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}
