//! Detect: raw files found in a catalog become managed records.

use anyhow::Result;
use log::debug;

use crate::catalog::{CurseForgeApi, ModrinthApi};
use crate::digest::{Fingerprint, Sha1Hex};
use crate::pack::HashFormat;
use crate::resolve::{
    MatchResult, ModrinthMatch, match_versions, project_ids, resolve_curseforge, resolve_projects,
};
use crate::runtime::Runtime;

use super::Reconciler;

impl<R: Runtime + 'static> Reconciler<'_, R> {
    /// Look up raw files by fingerprint and replace matches with
    /// provisional CurseForge records.
    #[tracing::instrument(skip_all)]
    pub async fn detect_curseforge(&self, api: &dyn CurseForgeApi) -> Result<usize> {
        let raw = self.raw_files()?;
        let index = self.engine.index::<Fingerprint>(&raw).await?;
        println!("checking {} files", index.len());
        if index.is_empty() {
            return Ok(0);
        }

        let candidates = api.fingerprint_matches(&index.digests()).await?;
        debug!("CurseForge returned {} candidates", candidates.len());
        let matches = resolve_curseforge(candidates, &index);
        println!("found {} matches", matches.len());

        self.coordinator.convert(&matches)
    }

    /// Look up raw files by SHA-1 and replace matches with final Modrinth
    /// records.
    #[tracing::instrument(skip_all)]
    pub async fn detect_modrinth(&self, api: &dyn ModrinthApi) -> Result<usize> {
        let raw = self.raw_files()?;
        let index = self.engine.index::<Sha1Hex>(&raw).await?;
        println!("checking {} files", index.len());
        if index.is_empty() {
            return Ok(0);
        }

        let versions = api
            .versions_from_hashes(&index.digests(), HashFormat::Sha1)
            .await?;
        let versions = match_versions(versions, &index, HashFormat::Sha1);
        let matches: Vec<MatchResult> = if versions.is_empty() {
            Vec::new()
        } else {
            let projects = api.projects(&project_ids(&versions)).await?;
            resolve_projects(versions, projects)
                .into_iter()
                .map(ModrinthMatch::into_result)
                .collect()
        };
        println!("found {} matches", matches.len());

        self.coordinator.convert(&matches)
    }
}
