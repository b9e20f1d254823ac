use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;
use tracing::{debug, info};
use uuid::Uuid;

use super::location::{resolve_location, DirProbe, FsProbe, StorageLocations, StorageScope};
use super::types::{HistoryEntry, HistoryFile, HISTORY_VERSION};
use crate::error::HistoryError;
use crate::gpa::CalculationResult;

pub const HISTORY_FILE_NAME: &str = "history.json";

/// Saved calculation history, kept in a single JSON file.
///
/// Every change rewrites the whole file through `atomic-write-file`, so a
/// crash mid-write leaves the previous complete history in place.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    scope: StorageScope,
}

impl HistoryStore {
    /// Open the store at the first usable location on the real filesystem.
    pub fn open(locations: &StorageLocations) -> Result<Self, HistoryError> {
        Self::open_with_probe(locations, &FsProbe)
    }

    pub fn open_with_probe(
        locations: &StorageLocations,
        probe: &dyn DirProbe,
    ) -> Result<Self, HistoryError> {
        let resolved = resolve_location(locations, probe)?;
        let path = resolved.dir.join(HISTORY_FILE_NAME);
        info!(path = %path.display(), scope = %resolved.scope, "history store ready");
        Ok(Self {
            path,
            scope: resolved.scope,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scope(&self) -> StorageScope {
        self.scope
    }

    /// Save a result as a new entry and return it.
    pub fn append(&self, result: CalculationResult) -> Result<HistoryEntry, HistoryError> {
        let mut file = self.read()?;
        let entry = HistoryEntry::new(result);
        file.entries.push(entry.clone());
        self.write(&file)?;

        info!(id = %entry.id, total = file.entries.len(), "saved history entry");
        Ok(entry)
    }

    /// All entries, oldest first. A missing or empty file is an empty history.
    pub fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.read()?.entries)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self.read()?.get(id).cloned())
    }

    /// Delete one entry. Returns true if it existed.
    pub fn remove(&self, id: Uuid) -> Result<bool, HistoryError> {
        let mut file = self.read()?;
        if !file.remove(id) {
            debug!(id = %id, "no history entry to remove");
            return Ok(false);
        }
        self.write(&file)?;

        info!(id = %id, remaining = file.entries.len(), "removed history entry");
        Ok(true)
    }

    /// Delete every entry. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, HistoryError> {
        let file = self.read()?;
        let removed = file.entries.len();
        if removed > 0 {
            self.write(&HistoryFile::new())?;
        }

        info!(removed, "cleared history");
        Ok(removed)
    }

    fn read(&self) -> Result<HistoryFile, HistoryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HistoryFile::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        if content.trim().is_empty() {
            return Ok(HistoryFile::new());
        }

        let file: HistoryFile =
            serde_json::from_str(&content).map_err(|source| HistoryError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        if file.version != HISTORY_VERSION {
            return Err(HistoryError::UnsupportedVersion(file.version));
        }

        Ok(file)
    }

    fn write(&self, file: &HistoryFile) -> Result<(), HistoryError> {
        let mut out = AtomicWriteFile::open(&self.path).map_err(|e| self.io_error(e))?;

        serde_json::to_writer_pretty(&mut out, file)?;

        out.commit().map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpa::CourseGradePoint;
    use chrono::{TimeZone, Utc};

    fn store_in(dir: &Path) -> HistoryStore {
        HistoryStore::open(&StorageLocations {
            primary: dir.join("data"),
            fallback: dir.join("fallback"),
        })
        .unwrap()
    }

    fn sample_result(label: &str) -> CalculationResult {
        CalculationResult {
            source_label: label.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
            weighted_average_score: 86.333_333_333_333_33,
            weighted_average_grade_point: 3.633_333_333_333_333,
            total_credits: 7.5,
            per_course_grade_points: vec![CourseGradePoint {
                course: "线性代数".to_string(),
                score: 87.0,
                credit: 4.0,
                grade_point: 3.7,
            }],
            skipped_rows: 1,
        }
    }

    #[test]
    fn test_list_missing_file_returns_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());

        assert_eq!(store.scope(), StorageScope::Primary);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_empty_file_returns_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        fs::write(store.path(), "  \n").unwrap();

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_list_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        let result = sample_result("fall.csv");

        let entry = store.append(result.clone()).unwrap();
        let listed = store.list().unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, entry.id);
        assert_eq!(listed[0].result, result);
    }

    #[test]
    fn test_entries_stay_in_append_order() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());

        for label in ["one", "two", "three"] {
            store.append(sample_result(label)).unwrap();
        }

        let labels: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|e| e.result.source_label)
            .collect();
        assert_eq!(labels, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_remove() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        let first = store.append(sample_result("one")).unwrap();
        let second = store.append(sample_result("two")).unwrap();

        assert!(store.remove(first.id).unwrap());
        assert!(!store.remove(first.id).unwrap());

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, second.id);
        assert!(store.get(first.id).unwrap().is_none());
        assert!(store.get(second.id).unwrap().is_some());
    }

    #[test]
    fn test_clear() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        store.append(sample_result("one")).unwrap();
        store.append(sample_result("two")).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_corrupt_file_is_reported_and_left_alone() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        fs::write(store.path(), "{\"version\": 1, \"entries\": [").unwrap();

        assert!(matches!(store.list(), Err(HistoryError::Corrupt { .. })));
        assert!(store.append(sample_result("x")).is_err());
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "{\"version\": 1, \"entries\": ["
        );
    }

    #[test]
    fn test_unsupported_version() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        fs::write(store.path(), "{\"version\": 7, \"entries\": []}").unwrap();

        assert!(matches!(
            store.list(),
            Err(HistoryError::UnsupportedVersion(7))
        ));
    }
}
