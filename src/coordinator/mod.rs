//! Side-Effect Coordinator.
//!
//! The only place that deletes pack files or asks the external tool to
//! change the pack. A raw file is removed only after its managed record
//! exists; the first failure aborts the rest of the batch, leaving completed
//! conversions in place.

mod packwiz;

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::pack::{ModMetadata, PackRepository};
use crate::resolve::MatchResult;
use crate::runtime::{Runtime, relative_path_from_dir};

pub use packwiz::{PackTool, Packwiz};

#[cfg(test)]
pub use packwiz::MockPackTool;

/// How a detected file becomes a managed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Materialize {
    /// Ask the external tool to add it.
    #[default]
    Tool,
    /// Write `<stem>.pw.toml` next to the raw file.
    Direct,
}

pub struct Coordinator<'a, R: Runtime> {
    repo: &'a PackRepository<'a, R>,
    tool: &'a dyn PackTool,
    materialize: Materialize,
}

impl<'a, R: Runtime> Coordinator<'a, R> {
    pub fn new(
        repo: &'a PackRepository<'a, R>,
        tool: &'a dyn PackTool,
        materialize: Materialize,
    ) -> Self {
        Self {
            repo,
            tool,
            materialize,
        }
    }

    pub fn refresh(&self) -> Result<()> {
        self.tool.refresh()
    }

    /// Replace each matched raw file with its managed record, then refresh
    /// the index once. Returns the number of files converted.
    #[tracing::instrument(skip_all, fields(matches = matches.len()))]
    pub fn convert(&self, matches: &[MatchResult]) -> Result<usize> {
        let mut converted = 0;
        for result in matches {
            self.materialize(result)?;
            self.repo.remove_file(&result.path).with_context(|| {
                format!(
                    "Managed record for {} was created but the file could not be removed",
                    result.path.display()
                )
            })?;
            info!("Converted {}", result.path.display());
            converted += 1;
        }

        if converted > 0 {
            self.refresh()?;
        }
        Ok(converted)
    }

    /// Rewrite changed records, then refresh the index once.
    #[tracing::instrument(skip_all, fields(records = records.len()))]
    pub fn rewrite(&self, records: &[(PathBuf, ModMetadata)]) -> Result<usize> {
        for (path, metadata) in records {
            self.repo.save_metadata(path, metadata)?;
            debug!("Rewrote {}", path.display());
        }

        if !records.is_empty() {
            self.refresh()?;
        }
        Ok(records.len())
    }

    fn materialize(&self, result: &MatchResult) -> Result<()> {
        match self.materialize {
            Materialize::Direct => {
                let path = metadata_path(&result.path);
                self.repo.create_metadata(&path, &result.metadata)
            }
            Materialize::Tool => {
                let metadata = &result.metadata;
                if let Some(source) = &metadata.update.curseforge {
                    let folder = self.meta_folder(&result.path);
                    self.tool.add_curseforge(source, &folder)
                } else if let Some(url) = &metadata.download.url {
                    self.tool.add_url(url)
                } else {
                    anyhow::bail!(
                        "Nothing to add for {}: no update source or URL",
                        result.path.display()
                    )
                }
            }
        }
    }

    /// Directory of `path` relative to the pack root.
    fn meta_folder(&self, path: &Path) -> PathBuf {
        let dir = path.parent().unwrap_or(Path::new(""));
        relative_path_from_dir(self.repo.root(), dir)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// `mods/jei-1.20.jar` → `mods/jei-1.20.pw.toml`.
fn metadata_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}.pw.toml", stem))
}
