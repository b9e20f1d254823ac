use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gpa::CalculationResult;

pub const HISTORY_VERSION: u32 = 1;

/// On-disk history: every saved calculation, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    pub version: u32,
    #[serde(default)]
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub result: CalculationResult,
}

impl HistoryEntry {
    pub fn new(result: CalculationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            saved_at: Utc::now(),
            result,
        }
    }

    /// First block of the id, enough to pick an entry out of a listing
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryFile {
    pub fn new() -> Self {
        Self {
            version: HISTORY_VERSION,
            entries: Vec::new(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Remove an entry, keeping the order of the rest.
    /// Returns true if the entry existed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }
}

/// Find the single entry whose id starts with `prefix` (hyphens ignored).
///
/// Returns None when nothing matches or the prefix is ambiguous.
pub fn find_by_prefix<'a>(entries: &'a [HistoryEntry], prefix: &str) -> Option<&'a HistoryEntry> {
    let needle = prefix.trim().replace('-', "").to_ascii_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut matches = entries
        .iter()
        .filter(|e| e.id.simple().to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(entry), None) => Some(entry),
        _ => None,
    }
}
