//! Per-document and per-batch counters.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Counters for one injection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionStats {
    /// Switches whose key matched a dictionary entry
    pub processed_switches: usize,
    pub inserted_translations: usize,
    pub updated_translations: usize,
    /// Existing variants left alone, including overwrites with identical text
    pub skipped_translations: usize,
    pub nested_files_error: bool,
}

impl InjectionStats {
    /// Whether the document differs from its input in translated content.
    pub fn has_changes(&self) -> bool {
        self.inserted_translations + self.updated_translations > 0
    }
}

/// Outcome row for one file of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    #[serde(flatten)]
    pub stats: InjectionStats,
    /// Error token from [`crate::SvgError::kind`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Aggregate over a batch of independent files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Files written with at least one inserted or updated translation
    pub saved_done: usize,
    /// Files that failed for any reason other than structure
    pub no_save: usize,
    /// Files rejected for segment-count mismatch
    pub nested_files: usize,
    /// Files that transformed cleanly but gained nothing
    pub no_changes: usize,
    /// Keyed by file name
    pub files: BTreeMap<String, FileReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }
}
