use log::{debug, warn};
use std::collections::HashSet;

use crate::catalog::{CurseForgeFile, HASH_ALGO_SHA1};
use crate::digest::FingerprintIndex;
use crate::pack::{
    CurseForgeSource, Download, HashFormat, ModMetadata, PROVISIONAL_MODE, Side, Update,
};

use super::MatchResult;

/// Resolve fingerprint candidates against the fingerprints that were sent.
///
/// Only a hit on the primary fingerprint counts. Each fingerprint resolves
/// at most once, so there are never more results than submitted digests.
pub fn resolve_curseforge(
    candidates: Vec<CurseForgeFile>,
    index: &FingerprintIndex<u32>,
) -> Vec<MatchResult> {
    let mut resolved = HashSet::new();
    let mut results = Vec::new();

    for file in candidates {
        let Some(path) = index.get(&file.file_fingerprint) else {
            if let Some(module) = file.modules.iter().find(|m| index.contains(&m.fingerprint)) {
                debug!(
                    "Ignoring {} (file {}): only bundled content {} matched, probably a false positive",
                    file.file_name, file.id, module.fingerprint
                );
            } else {
                debug!(
                    "Ignoring unsolicited file {} with fingerprint {}",
                    file.id, file.file_fingerprint
                );
            }
            continue;
        };

        if !resolved.insert(file.file_fingerprint) {
            debug!(
                "Fingerprint {} already resolved, ignoring file {}",
                file.file_fingerprint, file.id
            );
            continue;
        }

        let Some(sha1) = file.hashes.iter().find(|h| h.algo == HASH_ALGO_SHA1) else {
            warn!("no sha1 hash for {}, skipping", file.file_name);
            continue;
        };

        results.push(MatchResult {
            path: path.clone(),
            metadata: ModMetadata {
                name: file.display_name,
                filename: file.file_name,
                side: Some(Side::Both),
                download: Download {
                    hash_format: HashFormat::Sha1,
                    hash: sha1.value.to_lowercase(),
                    url: None,
                    mode: Some(PROVISIONAL_MODE.to_string()),
                    extra: Default::default(),
                },
                option: None,
                update: Update {
                    curseforge: Some(CurseForgeSource {
                        file_id: file.id,
                        project_id: file.mod_id,
                    }),
                    ..Default::default()
                },
                extra: Default::default(),
            },
        });
    }

    results
}
