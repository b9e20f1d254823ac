use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::grading::GradingConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub grading: GradingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Primary history directory (defaults to `data/` next to the executable)
    pub dir: Option<PathBuf>,
}
