//! Merge: link existing records to Modrinth and infer their side.

use anyhow::Result;
use log::debug;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalog::ModrinthApi;
use crate::digest::FingerprintIndex;
use crate::pack::{EntryState, HashFormat, ModMetadata};
use crate::resolve::{match_versions, project_ids, resolve_projects};
use crate::runtime::Runtime;

use super::Reconciler;

/// Hash formats the Modrinth version lookup accepts.
const LOOKUP_FORMATS: [HashFormat; 2] = [HashFormat::Sha1, HashFormat::Sha512];

impl<R: Runtime + 'static> Reconciler<'_, R> {
    /// Attach a Modrinth update source to every record Modrinth knows by
    /// its existing hash. Only the source, URL, mode and side change.
    #[tracing::instrument(skip_all)]
    pub async fn merge_modrinth(&self, api: &dyn ModrinthApi) -> Result<usize> {
        let mut records: BTreeMap<PathBuf, ModMetadata> = self
            .records_in(&[EntryState::Detected, EntryState::UrlCached])?
            .into_iter()
            .filter(|(_, metadata)| metadata.update.modrinth.is_none())
            .collect();
        if records.is_empty() {
            return Ok(0);
        }
        println!("checking {} files", records.len());

        let mut by_format: BTreeMap<HashFormat, FingerprintIndex<String>> = BTreeMap::new();
        for (path, metadata) in &records {
            let format = metadata.download.hash_format;
            if LOOKUP_FORMATS.contains(&format) {
                by_format
                    .entry(format)
                    .or_default()
                    .insert(metadata.download.hash.to_lowercase(), path.clone());
            } else {
                debug!("Skipping {}: {} hashes cannot be looked up", path.display(), format);
            }
        }

        let mut versions = Vec::new();
        for (format, index) in &by_format {
            let found = api.versions_from_hashes(&index.digests(), *format).await?;
            versions.extend(match_versions(found, index, *format));
        }
        if versions.is_empty() {
            println!("found 0 matches");
            return Ok(0);
        }

        let projects = api.projects(&project_ids(&versions)).await?;
        let matches = resolve_projects(versions, projects);
        println!("found {} matches", matches.len());

        let mut updates = Vec::new();
        for m in matches {
            let Some(mut metadata) = records.remove(&m.path) else {
                continue;
            };
            if metadata.link_modrinth(m.source, &m.file.url, m.side) {
                updates.push((m.path, metadata));
            }
        }

        self.coordinator.rewrite(&updates)
    }
}
