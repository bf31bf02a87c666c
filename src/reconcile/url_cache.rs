//! URL-cache: provisional CurseForge records get their direct URL.

use anyhow::Result;
use log::{debug, warn};
use std::collections::HashMap;

use crate::catalog::{CurseForgeApi, DownloadUrl};
use crate::pack::EntryState;
use crate::runtime::Runtime;

use super::Reconciler;

impl<R: Runtime + 'static> Reconciler<'_, R> {
    /// Resolve direct URLs for every provisional record. Files whose
    /// author disallows redistribution are left untouched.
    #[tracing::instrument(skip_all)]
    pub async fn cache_urls(&self, api: &dyn CurseForgeApi) -> Result<usize> {
        let records: Vec<_> = self
            .records_in(&[EntryState::Detected])?
            .into_iter()
            .filter(|(_, metadata)| metadata.update.curseforge.is_some())
            .collect();
        if records.is_empty() {
            return Ok(0);
        }
        println!("checking {} files", records.len());

        let mut file_ids: Vec<u64> = records
            .iter()
            .filter_map(|(_, metadata)| metadata.update.curseforge.map(|s| s.file_id))
            .collect();
        file_ids.sort_unstable();
        file_ids.dedup();

        let mut urls: HashMap<u64, DownloadUrl> = HashMap::new();
        for file in api.files(&file_ids).await? {
            if file_ids.binary_search(&file.id).is_err() {
                debug!("Ignoring unsolicited file {}", file.id);
                continue;
            }
            let url = match file.download_url {
                Some(url) => DownloadUrl::Available(url),
                None => DownloadUrl::Restricted,
            };
            urls.insert(file.id, url);
        }

        let mut updates = Vec::new();
        for (path, mut metadata) in records {
            let Some(source) = metadata.update.curseforge else {
                continue;
            };
            let url = match urls.get(&source.file_id) {
                Some(url) => url.clone(),
                None => {
                    debug!("File {} missing from batch response", source.file_id);
                    let url = api.download_url(source.project_id, source.file_id).await?;
                    urls.insert(source.file_id, url.clone());
                    url
                }
            };

            match url {
                DownloadUrl::Restricted => {
                    warn!("third party downloads disabled for {}", metadata.name);
                }
                DownloadUrl::Available(url) => {
                    println!("caching url for {}", metadata.name);
                    if metadata.cache_url(&url) {
                        updates.push((path, metadata));
                    }
                }
            }
        }

        self.coordinator.rewrite(&updates)
    }
}
