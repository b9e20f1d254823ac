pub mod loader;
pub mod source;

pub use loader::{load, CourseRecord, Diagnostic, LoadReport, LoadStatus, ScoreSource};
pub use source::{Cell, Table};
