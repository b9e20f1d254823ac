pub mod engine;
pub mod result;

pub use engine::{
    calculate, calculate_at, calculate_report, grade_point, total_credits,
    weighted_average_grade_point, weighted_average_score, MAX_GRADE_POINT,
};
pub use result::{CalculationResult, CourseGradePoint};
