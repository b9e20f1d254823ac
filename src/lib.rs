//! Grade-point calculation for course tables.
//!
//! The pipeline is [`table::load`] → [`gpa::calculate`] → [`history::HistoryStore`],
//! with [`grading::GradingConfig`] passed to each step that needs it.

pub mod config;
pub mod error;
pub mod gpa;
pub mod grading;
pub mod history;
pub mod output;
pub mod table;
