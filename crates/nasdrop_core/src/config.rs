use serde::{Deserialize, Serialize};

use crate::rule::DomainRule;

/// Largest number of URLs sent in a single task-creation call.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// How the plan is pushed to the download service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmitMode {
    /// One folder batch, then chunked task batches per destination.
    #[default]
    Batched,
    /// One remote call per folder and per URL.
    PerFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Every destination lives below this folder on the NAS.
    pub base_download_dir: String,
    /// Checked in order; the first matching rule wins.
    pub domain_rules: Vec<DomainRule>,
    pub submit_mode: SubmitMode,
    pub batch_size: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            base_download_dir: "downloads".to_string(),
            domain_rules: Vec::new(),
            submit_mode: SubmitMode::Batched,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl PlanConfig {
    pub fn with_rules(base_download_dir: impl Into<String>, domain_rules: Vec<DomainRule>) -> Self {
        Self {
            base_download_dir: base_download_dir.into(),
            domain_rules,
            ..Self::default()
        }
    }

    /// Batch size clamped to at least one URL per call.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}
