use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::catalog::{Project, Version, VersionFile};
use crate::digest::FingerprintIndex;
use crate::pack::{Download, HashFormat, ModMetadata, ModrinthSource, Side, Update};

use super::{MatchResult, infer_side};

/// A version returned for one of the submitted hashes.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionMatch {
    pub path: PathBuf,
    pub algorithm: HashFormat,
    pub hash: String,
    pub version: Version,
}

/// A version match confirmed through its project details.
#[derive(Debug, Clone, PartialEq)]
pub struct ModrinthMatch {
    pub path: PathBuf,
    pub title: String,
    pub source: ModrinthSource,
    pub file: VersionFile,
    pub side: Side,
    pub algorithm: HashFormat,
    pub hash: String,
}

impl ModrinthMatch {
    /// Final metadata for a raw file found on Modrinth.
    pub fn into_result(self) -> MatchResult {
        MatchResult {
            path: self.path,
            metadata: ModMetadata {
                name: self.title,
                filename: self.file.filename,
                side: Some(self.side),
                download: Download {
                    hash_format: self.algorithm,
                    hash: self.hash,
                    url: Some(self.file.url),
                    mode: None,
                    extra: Default::default(),
                },
                option: None,
                update: Update {
                    modrinth: Some(self.source),
                    ..Default::default()
                },
                extra: Default::default(),
            },
        }
    }
}

/// Keep only versions keyed by a hash that was actually sent.
pub fn match_versions(
    versions: HashMap<String, Version>,
    index: &FingerprintIndex<String>,
    algorithm: HashFormat,
) -> Vec<VersionMatch> {
    let mut matches: Vec<VersionMatch> = versions
        .into_iter()
        .filter_map(|(hash, version)| match index.get(&hash) {
            Some(path) => Some(VersionMatch {
                path: path.clone(),
                algorithm,
                hash,
                version,
            }),
            None => {
                debug!("Ignoring unsolicited version {} for hash {}", version.id, hash);
                None
            }
        })
        .collect();
    matches.sort_by(|a, b| a.path.cmp(&b.path));
    matches
}

/// Distinct project ids of a set of version matches.
pub fn project_ids(matches: &[VersionMatch]) -> Vec<String> {
    let mut ids: Vec<String> = matches
        .iter()
        .map(|m| m.version.project_id.clone())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Join version matches with the project details fetched for them.
///
/// Several local files may belong to one project; all of them resolve.
/// Projects nobody asked for and projects with conflicting side flags are
/// skipped.
pub fn resolve_projects(matches: Vec<VersionMatch>, projects: Vec<Project>) -> Vec<ModrinthMatch> {
    let mut by_project: BTreeMap<String, Vec<VersionMatch>> = BTreeMap::new();
    for m in matches {
        by_project
            .entry(m.version.project_id.clone())
            .or_default()
            .push(m);
    }

    let mut results = Vec::new();
    for project in projects {
        let Some(matches) = by_project.remove(&project.id) else {
            debug!("Ignoring unsolicited project {}", project.id);
            continue;
        };

        let side = match infer_side(&project) {
            Ok(side) => side,
            Err(e) => {
                warn!("{}, skipping {}", e, project.title);
                continue;
            }
        };

        for m in matches {
            let Some(file) = m.version.file_with_hash(m.algorithm, &m.hash) else {
                warn!(
                    "version {} of {} has no file with {} {}, skipping",
                    m.version.id, project.title, m.algorithm, m.hash
                );
                continue;
            };
            results.push(ModrinthMatch {
                title: project.title.clone(),
                source: ModrinthSource {
                    mod_id: project.id.clone(),
                    version: m.version.id.clone(),
                },
                file: file.clone(),
                side,
                algorithm: m.algorithm,
                hash: m.hash,
                path: m.path,
            });
        }
    }

    for id in by_project.keys() {
        debug!("No details returned for project {}", id);
    }

    results
}
