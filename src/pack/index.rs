use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::HashFormat;
use crate::runtime::Runtime;

/// The pack index: every tracked file, raw or metafile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    #[serde(rename = "hash-format")]
    pub hash_format: HashFormat,
    #[serde(default)]
    pub files: Vec<IndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Path relative to the index file, forward slashes.
    pub file: String,
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(
        rename = "hash-format",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hash_format: Option<HashFormat>,
    /// The entry is a metadata record pointing at an externally hosted file.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub metafile: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub preserve: bool,
}

impl Index {
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse index file {}", path.display()))
    }
}
