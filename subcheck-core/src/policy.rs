use serde::{Deserialize, Serialize};

/// Limits applied while unpacking an uploaded archive.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractPolicy {
    pub max_entries: Option<u64>,
    /// Sum of declared uncompressed member sizes.
    pub max_uncompressed: Option<u64>,
    /// Skip `__MACOSX/` resource-fork members added by Finder.
    pub skip_resource_forks: bool,
}

impl Default for ExtractPolicy {
    fn default() -> Self {
        Self {
            max_entries: Some(1_000),
            max_uncompressed: Some(512 * 1024 * 1024),
            skip_resource_forks: true,
        }
    }
}

impl ExtractPolicy {
    pub fn unlimited() -> Self {
        Self {
            max_entries: None,
            max_uncompressed: None,
            skip_resource_forks: true,
        }
    }
}
