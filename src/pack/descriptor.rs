use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::HashFormat;
use crate::runtime::Runtime;

const FORMAT_PREFIX: &str = "packwiz:";
const SUPPORTED_MAJOR: u64 = 1;

/// The top level `pack.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "pack-format", default = "default_pack_format")]
    pub pack_format: String,
    pub index: IndexRef,
    pub versions: Versions,
}

/// Where the index lives, relative to the pack file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRef {
    pub file: String,
    #[serde(rename = "hash-format")]
    pub hash_format: HashFormat,
    pub hash: String,
}

/// Component versions; `minecraft` plus whichever loaders the pack uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versions {
    pub minecraft: String,
    #[serde(flatten)]
    pub loaders: BTreeMap<String, String>,
}

fn default_pack_format() -> String {
    format!("{}1.0.0", FORMAT_PREFIX)
}

impl PackDescriptor {
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        let descriptor: PackDescriptor = toml::from_str(&content)
            .with_context(|| format!("Failed to parse pack file {}", path.display()))?;
        descriptor.check_format()?;
        Ok(descriptor)
    }

    /// Refuse packs written for a newer major format than this tool understands.
    pub fn check_format(&self) -> Result<()> {
        let version = self
            .pack_format
            .strip_prefix(FORMAT_PREFIX)
            .with_context(|| {
                format!(
                    "Unsupported pack-format {:?}: expected a {:?} prefix",
                    self.pack_format, FORMAT_PREFIX
                )
            })?;
        let version = semver::Version::parse(version)
            .with_context(|| format!("Invalid pack-format version {:?}", version))?;
        if version.major > SUPPORTED_MAJOR {
            anyhow::bail!(
                "pack-format {} is newer than the supported {}{}.x",
                self.pack_format,
                FORMAT_PREFIX,
                SUPPORTED_MAJOR
            );
        }
        Ok(())
    }
}
