//! Batch Lookup Client.
//!
//! One trait per remote catalog, each method one batched request. Callers
//! send every digest or id of a phase in a single call; nothing is chunked
//! or retried here.

mod curseforge;
mod modrinth;

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use crate::pack::HashFormat;

pub use curseforge::{
    CurseForgeClient, CurseForgeFile, CurseForgeFileSummary, DEFAULT_CURSEFORGE_API_URL,
    DownloadUrl, FileHash, FileModule, HASH_ALGO_SHA1,
};
pub use modrinth::{
    DEFAULT_MODRINTH_API_URL, ModrinthClient, Project, SideSupport, Version, VersionFile,
};

/// CurseForge lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurseForgeApi: Send + Sync {
    /// Exact fingerprint matches for a batch of fingerprints.
    async fn fingerprint_matches(&self, fingerprints: &[u32]) -> Result<Vec<CurseForgeFile>>;

    /// File details (including the direct URL when distribution is allowed).
    async fn files(&self, file_ids: &[u64]) -> Result<Vec<CurseForgeFileSummary>>;

    /// Direct URL of a single file.
    async fn download_url(&self, project_id: u64, file_id: u64) -> Result<DownloadUrl>;
}

/// Modrinth lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModrinthApi: Send + Sync {
    /// Versions keyed by the requested hash; unknown hashes are simply absent.
    async fn versions_from_hashes(
        &self,
        hashes: &[String],
        algorithm: HashFormat,
    ) -> Result<HashMap<String, Version>>;

    /// Project details for a batch of project ids.
    async fn projects(&self, ids: &[String]) -> Result<Vec<Project>>;
}

/// Decode one item of a response list. A malformed item is logged and
/// dropped so the rest of the batch still resolves.
fn decode_item<T: DeserializeOwned>(kind: &str, item: Value) -> Option<T> {
    match serde_json::from_value(item) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Skipping malformed {}: {}", kind, e);
            None
        }
    }
}
