//! Reference catalog of patent records.
//!
//! The catalog is immutable once built. It is either the built-in mock set or a JSON array of
//! records read from disk; both go through the same id/score validation.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::{PatentRecord, PatentStatus, MAX_RELEVANCE};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate patent id `{id}`")]
    DuplicateId { id: String },
    #[error("relevance score {score} for `{id}` is out of range (0-100)")]
    ScoreOutOfRange { id: String, score: u8 },
    #[error("failed to read catalog {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse catalog {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    records: Vec<PatentRecord>,
}

impl Catalog {
    pub fn new(records: Vec<PatentRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(CatalogError::DuplicateId { id: record.id.clone() });
            }
            if record.relevance_score > MAX_RELEVANCE {
                return Err(CatalogError::ScoreOutOfRange {
                    id: record.id.clone(),
                    score: record.relevance_score,
                });
            }
        }
        Ok(Self { records })
    }

    pub fn builtin() -> Self {
        Self {
            records: vec![
                PatentRecord::new(
                    "P001",
                    "Vaping Device with Removable Pouch",
                    "TechVape Inc.",
                    "2023-06-15",
                    PatentStatus::Active,
                    85,
                ),
                PatentRecord::new(
                    "P002",
                    "Tobacco-Free Nicotine Delivery System",
                    "InnoNictech",
                    "2023-05-22",
                    PatentStatus::Pending,
                    72,
                ),
                PatentRecord::new(
                    "P003",
                    "Advanced Heating Element for E-Cigarettes",
                    "SmartSmoke Technologies",
                    "2023-07-01",
                    PatentStatus::Active,
                    65,
                ),
            ],
        }
    }

    pub fn load_json_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        let records: Vec<PatentRecord> = serde_json::from_str(&contents)
            .map_err(|source| CatalogError::Json { path: path.to_path_buf(), source })?;
        Self::new(records)
    }

    pub fn records(&self) -> &[PatentRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&PatentRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct company names in first-seen order.
    pub fn companies(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| record.company.as_str())
            .filter(|company| seen.insert(*company))
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
