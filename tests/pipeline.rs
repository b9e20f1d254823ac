use std::io;
use std::path::{Path, PathBuf};

use gpa_tally::error::{CalcError, HistoryError, NoDataReason};
use gpa_tally::gpa::{calculate, calculate_report};
use gpa_tally::grading::{ColumnRoles, GradingConfig};
use gpa_tally::history::{DirProbe, FsProbe, HistoryStore, StorageLocations, StorageScope};
use gpa_tally::table::{load, LoadStatus, Table};

const TRANSCRIPT: &str = "\
No,Course,Score,Credit
1,Math,95,4
2,History,excellent,2
";

fn grading() -> GradingConfig {
    GradingConfig::default()
}

/// Refuses one directory, otherwise behaves like the real filesystem.
struct ReadOnlyDir(PathBuf);

impl DirProbe for ReadOnlyDir {
    fn prepare(&self, dir: &Path) -> io::Result<()> {
        if dir == self.0 {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only install directory",
            ));
        }
        FsProbe.prepare(dir)
    }
}

#[test]
fn test_mixed_transcript_from_csv() {
    let table = Table::from_reader(TRANSCRIPT.as_bytes()).unwrap();
    let grading = grading();

    let report = load(&table, &grading, &grading.columns);
    assert_eq!(report.status(), LoadStatus::Clean);

    let result = calculate_report(&report, &grading, "transcript.csv").unwrap();
    assert_eq!(result.weighted_average_score, 95.0);
    assert_eq!(result.weighted_average_grade_point, 4.5);
    assert_eq!(result.total_credits, 6.0);
    let points: Vec<_> = result
        .per_course_grade_points
        .iter()
        .map(|c| (c.course.as_str(), c.grade_point))
        .collect();
    assert_eq!(points, vec![("Math", 4.5), ("History", 4.5)]);
}

#[test]
fn test_mixed_transcript_from_workbook() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/transcript.xlsx");
    let table = Table::from_path(&path).unwrap();
    let grading = grading();

    let report = load(&table, &grading, &grading.columns);
    assert_eq!(report.status(), LoadStatus::Partial { skipped: 1 });
    assert_eq!(report.diagnostics[0].row, 4);
    assert_eq!(report.diagnostics[0].course.as_deref(), Some("01 Seminar"));

    let result = calculate_report(&report, &grading, "transcript.xlsx").unwrap();
    assert_eq!(result.weighted_average_score, 95.0);
    assert_eq!(result.total_credits, 6.0);
    let courses: Vec<_> = result
        .per_course_grade_points
        .iter()
        .map(|c| (c.course.as_str(), c.score, c.credit))
        .collect();
    assert_eq!(courses, vec![("Math", 95.0, 4.0), ("History", 95.0, 2.0)]);
}

#[test]
fn test_zero_credit_row_skipped_rest_computed() {
    let csv = "No,Course,Score,Credit\n1,Math,90,3\n2,Seminar,80,0\n3,Physics,70,1\n";
    let table = Table::from_reader(csv.as_bytes()).unwrap();
    let grading = grading();

    let report = load(&table, &grading, &grading.columns);
    assert_eq!(report.status(), LoadStatus::Partial { skipped: 1 });
    assert!(report.diagnostics[0]
        .reason
        .to_string()
        .starts_with("invalid credit"));

    let result = calculate_report(&report, &grading, "t.csv").unwrap();
    assert_eq!(result.skipped_rows, 1);
    assert_eq!(result.course_count(), 2);
    assert!((result.weighted_average_score - 85.0).abs() < 1e-9);
}

#[test]
fn test_all_rows_invalid_is_no_usable_data() {
    let csv = "No,Course,Score,Credit\n1,Math,101,3\n2,Art,stellar,2\n3,Gym,80,-1\n";
    let table = Table::from_reader(csv.as_bytes()).unwrap();
    let grading = grading();

    let report = load(&table, &grading, &grading.columns);
    assert_eq!(report.status(), LoadStatus::NoUsableData { skipped: 3 });

    let err = calculate(&report.records, &grading, "t.csv").unwrap_err();
    assert_eq!(err, CalcError::NoUsableData(NoDataReason::NoRecords));
}

#[test]
fn test_custom_columns_without_header() {
    let csv = "Math,4,92\nHistory,2,good\n";
    let table = Table::from_reader(csv.as_bytes()).unwrap();
    let grading = grading();
    let columns = ColumnRoles {
        name: 0,
        credit: 1,
        score: 2,
        header_rows: 0,
    };

    let report = load(&table, &grading, &columns);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[1].score, 85.0);
    assert_eq!(report.records[1].row, 2);
}

#[test]
fn test_saved_result_reads_back_unchanged() {
    let temp = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(&StorageLocations {
        primary: temp.path().join("data"),
        fallback: temp.path().join("fallback"),
    })
    .unwrap();

    let csv = "No,Course,Score,Credit\n1,Analysis,87.5,3.5\n2,Optics,良好,2\n3,Lab,73,1\n";
    let table = Table::from_reader(csv.as_bytes()).unwrap();
    let grading = grading();
    let report = load(&table, &grading, &grading.columns);
    let result = calculate_report(&report, &grading, "spring.csv").unwrap();

    let entry = store.append(result.clone()).unwrap();
    let listed = store.list().unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, entry.id);
    assert_eq!(listed[0].result, result);
}

#[test]
fn test_history_falls_back_when_primary_read_only() {
    let temp = tempfile::tempdir().unwrap();
    let locations = StorageLocations {
        primary: temp.path().join("install").join("data"),
        fallback: temp.path().join("tmp").join("data"),
    };
    let probe = ReadOnlyDir(locations.primary.clone());

    let store = HistoryStore::open_with_probe(&locations, &probe).unwrap();
    assert_eq!(store.scope(), StorageScope::Fallback);
    assert!(store.path().starts_with(&locations.fallback));

    let table = Table::from_reader(TRANSCRIPT.as_bytes()).unwrap();
    let grading = grading();
    let report = load(&table, &grading, &grading.columns);
    let result = calculate_report(&report, &grading, "transcript.csv").unwrap();

    let entry = store.append(result).unwrap();

    let reopened = HistoryStore::open_with_probe(&locations, &probe).unwrap();
    let listed = reopened.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, entry.id);
    assert!(!locations.primary.exists());
}

#[test]
fn test_storage_unavailable_does_not_block_calculation() {
    struct Nowhere;
    impl DirProbe for Nowhere {
        fn prepare(&self, _dir: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    let table = Table::from_reader(TRANSCRIPT.as_bytes()).unwrap();
    let grading = grading();
    let report = load(&table, &grading, &grading.columns);
    let result = calculate_report(&report, &grading, "transcript.csv");
    assert!(result.is_ok());

    let locations = StorageLocations {
        primary: PathBuf::from("/nonexistent/primary"),
        fallback: PathBuf::from("/nonexistent/fallback"),
    };
    let err = HistoryStore::open_with_probe(&locations, &Nowhere).unwrap_err();
    assert!(matches!(err, HistoryError::StorageUnavailable { .. }));
}
