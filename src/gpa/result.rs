use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One course's contribution to a calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseGradePoint {
    pub course: String,
    /// Percentage score the grade point was derived from
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub credit: f64,
    pub grade_point: f64,
}

/// Output of one GPA calculation.
///
/// Values are stored unrounded; rounding is a presentation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Where the courses came from, usually the table's file name
    pub source_label: String,
    pub timestamp: DateTime<Utc>,
    pub weighted_average_score: f64,
    pub weighted_average_grade_point: f64,
    pub total_credits: f64,
    /// In input order
    pub per_course_grade_points: Vec<CourseGradePoint>,
    /// Rows the loader dropped before this calculation
    #[serde(default)]
    pub skipped_rows: usize,
}

impl CalculationResult {
    pub fn course_count(&self) -> usize {
        self.per_course_grade_points.len()
    }
}
