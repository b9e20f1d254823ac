use chrono::{DateTime, Utc};
use tracing::debug;

use super::result::{CalculationResult, CourseGradePoint};
use crate::error::{CalcError, NoDataReason};
use crate::grading::{FailPolicy, GradingConfig};
use crate::table::{CourseRecord, LoadReport};

pub const MAX_GRADE_POINT: f64 = 5.0;

/// Grade point for a percentage score: `score / 10 - 5`, clamped to 0-5.
///
/// Anything at or below 50 earns 0 and 100 earns the full 5.
pub fn grade_point(score: f64) -> f64 {
    (score / 10.0 - 5.0).clamp(0.0, MAX_GRADE_POINT)
}

/// Sum of credits, or `NoUsableData` when there is nothing to divide by.
pub fn total_credits(records: &[CourseRecord]) -> Result<f64, CalcError> {
    if records.is_empty() {
        return Err(CalcError::NoUsableData(NoDataReason::NoRecords));
    }
    let total: f64 = records.iter().map(|r| r.credit).sum();
    // Negative totals can only come from hand-built records; treat them like zero.
    if total <= 0.0 {
        return Err(CalcError::NoUsableData(NoDataReason::ZeroCredit));
    }
    Ok(total)
}

/// Σ(score × credit) / Σ(credit), with failed scores substituted when a
/// fail policy is given.
pub fn weighted_average_score(
    records: &[CourseRecord],
    fail_policy: Option<&FailPolicy>,
) -> Result<f64, CalcError> {
    weighted_average(records, |r| match fail_policy {
        Some(policy) => policy.adjust(r.score),
        None => r.score,
    })
}

/// Σ(grade point × credit) / Σ(credit)
pub fn weighted_average_grade_point(records: &[CourseRecord]) -> Result<f64, CalcError> {
    weighted_average(records, |r| grade_point(r.score))
}

fn weighted_average<F>(records: &[CourseRecord], value: F) -> Result<f64, CalcError>
where
    F: Fn(&CourseRecord) -> f64,
{
    let total = total_credits(records)?;
    let weighted: f64 = records.iter().map(|r| value(r) * r.credit).sum();
    Ok(weighted / total)
}

/// Calculate with the current time as the result timestamp.
pub fn calculate(
    records: &[CourseRecord],
    grading: &GradingConfig,
    source_label: &str,
) -> Result<CalculationResult, CalcError> {
    calculate_at(records, grading, source_label, Utc::now())
}

/// Calculate every metric for `records`.
///
/// A pure function of its arguments: the same input always produces an
/// identical result.
pub fn calculate_at(
    records: &[CourseRecord],
    grading: &GradingConfig,
    source_label: &str,
    timestamp: DateTime<Utc>,
) -> Result<CalculationResult, CalcError> {
    let total_credits = total_credits(records)?;
    let weighted_average_score = weighted_average_score(records, grading.fail_policy.as_ref())?;
    let weighted_average_grade_point = weighted_average_grade_point(records)?;

    let per_course_grade_points = records
        .iter()
        .map(|r| CourseGradePoint {
            course: r.name.clone(),
            score: r.score,
            credit: r.credit,
            grade_point: grade_point(r.score),
        })
        .collect();

    debug!(
        courses = records.len(),
        total_credits, weighted_average_score, weighted_average_grade_point, "calculated GPA"
    );

    Ok(CalculationResult {
        source_label: source_label.to_string(),
        timestamp,
        weighted_average_score,
        weighted_average_grade_point,
        total_credits,
        per_course_grade_points,
        skipped_rows: 0,
    })
}

/// Calculate from a loader report, carrying its skipped-row count into the result.
pub fn calculate_report(
    report: &LoadReport,
    grading: &GradingConfig,
    source_label: &str,
) -> Result<CalculationResult, CalcError> {
    let result = calculate(&report.records, grading, source_label)?;
    Ok(CalculationResult {
        skipped_rows: report.diagnostics.len(),
        ..result
    })
}
