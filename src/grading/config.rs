use serde::{Deserialize, Serialize};

/// Grading configuration shared by the loader and the calculator.
///
/// Built once at startup (from defaults or the `grading` section of the config
/// file) and only ever borrowed afterwards.
///
/// Example YAML:
/// ```yaml
/// grading:
///   categories:
///     - { label: excellent, score: 95, aliases: ["优秀", "A"] }
///     - { label: pass, score: 65 }
///   columns:
///     name: 0
///     score: 1
///     credit: 2
///     header_rows: 1
///   fail_policy:
///     threshold: 60
///     average_score_value: 40
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GradingConfig {
    /// Categorical grades in order, best first
    pub categories: Vec<GradeCategory>,

    /// Which columns of a course table hold name, score and credit
    pub columns: ColumnRoles,

    /// Optional substitution for failed courses in the weighted average score
    pub fail_policy: Option<FailPolicy>,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                GradeCategory::new("excellent", 95.0, &["优秀"]),
                GradeCategory::new("good", 85.0, &["良好"]),
                GradeCategory::new("medium", 75.0, &["中等"]),
                GradeCategory::new("pass", 65.0, &["及格"]),
                GradeCategory::new("fail", 0.0, &["不及格"]),
            ],
            columns: ColumnRoles::default(),
            fail_policy: None,
        }
    }
}

impl GradingConfig {
    /// Look up a categorical grade by label or alias.
    ///
    /// Surrounding whitespace is ignored and ASCII letters match case-insensitively.
    pub fn resolve_category(&self, label: &str) -> Option<&GradeCategory> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        self.categories.iter().find(|c| c.matches(label))
    }
}

/// A categorical grade and the percentage score it stands for.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GradeCategory {
    pub label: String,

    /// Representative percentage score, 0-100
    pub score: f64,

    /// Other spellings accepted for this category
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl GradeCategory {
    pub fn new(label: &str, score: f64, aliases: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            score,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// All spellings of this category, label first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.label.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    fn matches(&self, label: &str) -> bool {
        self.names().any(|name| name.trim().eq_ignore_ascii_case(label))
    }
}

/// Column positions (0-based) in a course table.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnRoles {
    pub name: usize,
    pub score: usize,
    pub credit: usize,

    /// Number of leading rows to skip before course rows start
    pub header_rows: usize,
}

impl Default for ColumnRoles {
    // Transcript exports put a sequence number in the first column.
    fn default() -> Self {
        Self {
            name: 1,
            score: 2,
            credit: 3,
            header_rows: 1,
        }
    }
}

impl ColumnRoles {
    /// Return a copy with any caller-supplied positions swapped in.
    pub fn overridden(&self, overrides: &ColumnOverrides) -> Self {
        Self {
            name: overrides.name.unwrap_or(self.name),
            score: overrides.score.unwrap_or(self.score),
            credit: overrides.credit.unwrap_or(self.credit),
            header_rows: overrides.header_rows.unwrap_or(self.header_rows),
        }
    }
}

/// Per-invocation column overrides, usually from command-line flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnOverrides {
    pub name: Option<usize>,
    pub score: Option<usize>,
    pub credit: Option<usize>,
    pub header_rows: Option<usize>,
}

/// Failed courses count as `average_score_value` in the weighted average score.
///
/// Grade points are unaffected; the clamp already maps low scores to 0.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FailPolicy {
    /// Scores strictly below this are failures
    pub threshold: f64,
    pub average_score_value: f64,
}

impl Default for FailPolicy {
    fn default() -> Self {
        Self {
            threshold: 60.0,
            average_score_value: 40.0,
        }
    }
}

impl FailPolicy {
    pub fn adjust(&self, score: f64) -> f64 {
        if score < self.threshold {
            self.average_score_value
        } else {
            score
        }
    }
}
