use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::runtime::Runtime;

/// `download.mode` of a record whose direct URL has not been resolved yet.
pub const PROVISIONAL_MODE: &str = "metadata:curseforge";

/// Which physical installation a file applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Both,
    Client,
    Server,
}

/// Hash algorithms a pack may record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFormat {
    Sha256,
    Sha512,
    Sha1,
    Md5,
    Murmur2,
}

impl HashFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashFormat::Sha256 => "sha256",
            HashFormat::Sha512 => "sha512",
            HashFormat::Sha1 => "sha1",
            HashFormat::Md5 => "md5",
            HashFormat::Murmur2 => "murmur2",
        }
    }
}

impl fmt::Display for HashFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metadata record (`*.pw.toml`) describing an externally hosted file.
///
/// Only the fields this tool reconciles are typed; everything else in the
/// file is carried through `extra` so a rewrite never drops user data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModMetadata {
    pub name: String,
    pub filename: String,
    /// Absent means both; an absent key stays absent on rewrite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    pub download: Download,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<ModOption>,
    #[serde(default, skip_serializing_if = "Update::is_empty")]
    pub update: Update,
    #[serde(flatten)]
    pub extra: toml::Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Download {
    #[serde(rename = "hash-format")]
    pub hash_format: HashFormat,
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModOption {
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Update {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curseforge: Option<CurseForgeSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modrinth: Option<ModrinthSource>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Update {
    pub fn is_empty(&self) -> bool {
        self.curseforge.is_none() && self.modrinth.is_none() && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CurseForgeSource {
    pub file_id: u64,
    pub project_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModrinthSource {
    pub mod_id: String,
    pub version: String,
}

impl ModMetadata {
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse metadata file {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize metadata")
    }

    pub fn side(&self) -> Side {
        self.side.unwrap_or_default()
    }

    /// True while the record still waits for its direct URL.
    pub fn is_provisional(&self) -> bool {
        self.download.url.is_none()
    }

    /// Records linked to both catalogs with a cached URL are never queried again.
    pub fn is_fully_resolved(&self) -> bool {
        self.update.curseforge.is_some()
            && self.update.modrinth.is_some()
            && self.download.url.is_some()
    }

    /// Store a resolved direct URL. Returns whether the record changed.
    pub fn cache_url(&mut self, url: &str) -> bool {
        let mut changed = false;

        if self.download.url.as_deref() != Some(url) {
            self.download.url = Some(url.to_string());
            changed = true;
        }
        if self.download.mode.take().is_some() {
            changed = true;
        }

        changed
    }

    /// Attach a Modrinth update source, its download URL and side.
    /// Name, option and any other user-authored field are left alone.
    /// Returns whether the record changed.
    pub fn link_modrinth(&mut self, source: ModrinthSource, url: &str, side: Side) -> bool {
        let mut changed = self.cache_url(url);

        if self.update.modrinth.as_ref() != Some(&source) {
            self.update.modrinth = Some(source);
            changed = true;
        }
        if self.side() != side {
            self.side = Some(side);
            changed = true;
        }

        changed
    }
}
