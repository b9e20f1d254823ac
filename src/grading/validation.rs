use std::collections::HashSet;

use super::config::GradingConfig;

/// Validate grading configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_grading(config: &GradingConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.categories.is_empty() {
        errors.push("grading.categories: at least one category is required".to_string());
    }

    let mut seen = HashSet::new();
    for (i, category) in config.categories.iter().enumerate() {
        if category.label.trim().is_empty() {
            errors.push(format!("grading.categories[{}].label: must not be empty", i));
        }
        if !(0.0..=100.0).contains(&category.score) {
            errors.push(format!(
                "grading.categories[{}].score: {} is outside 0-100",
                i, category.score
            ));
        }
        for name in category.names() {
            let key = name.trim().to_ascii_lowercase();
            if key.is_empty() {
                continue;
            }
            if !seen.insert(key) {
                errors.push(format!(
                    "grading.categories[{}]: '{}' is already used by another category",
                    i, name
                ));
            }
        }
    }

    let columns = &config.columns;
    if columns.name == columns.score
        || columns.name == columns.credit
        || columns.score == columns.credit
    {
        errors.push(format!(
            "grading.columns: name ({}), score ({}) and credit ({}) must be distinct",
            columns.name, columns.score, columns.credit
        ));
    }

    if let Some(policy) = config.fail_policy {
        if !(0.0..=100.0).contains(&policy.threshold) {
            errors.push(format!(
                "grading.fail_policy.threshold: {} is outside 0-100",
                policy.threshold
            ));
        }
        if !(0.0..=100.0).contains(&policy.average_score_value) {
            errors.push(format!(
                "grading.fail_policy.average_score_value: {} is outside 0-100",
                policy.average_score_value
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
