pub mod formatter;

pub use formatter::{
    format_age, format_average, format_diagnostics, format_entry_detail, format_grade_point,
    format_history_list, format_result, should_use_colors,
};
