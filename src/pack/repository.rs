//! Reads the pack from disk and writes metadata records back.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::runtime::{Runtime, is_path_under, normalize_path};

use super::{Index, IndexEntry, ModMetadata, PackDescriptor};

/// An index entry together with its location on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    pub entry: IndexEntry,
    /// `entry.file` resolved against the index directory.
    pub path: PathBuf,
}

impl TrackedFile {
    pub fn is_metafile(&self) -> bool {
        self.entry.metafile
    }
}

/// Access to one pack rooted at the directory containing its `pack.toml`.
pub struct PackRepository<'a, R: Runtime> {
    runtime: &'a R,
    pack_file: PathBuf,
    root: PathBuf,
}

impl<'a, R: Runtime> PackRepository<'a, R> {
    pub fn new(runtime: &'a R, pack_file: impl Into<PathBuf>) -> Self {
        let pack_file = pack_file.into();
        let root = match pack_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            runtime,
            pack_file,
            root,
        }
    }

    /// Directory containing the pack file.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pack_file(&self) -> &Path {
        &self.pack_file
    }

    pub fn load_descriptor(&self) -> Result<PackDescriptor> {
        PackDescriptor::load(self.runtime, &self.pack_file)
    }

    /// Enumerate every entry of the index, freshly read from disk.
    ///
    /// Entries that would resolve outside the pack root are dropped with a warning.
    #[tracing::instrument(skip(self))]
    pub fn tracked_files(&self) -> Result<Vec<TrackedFile>> {
        let descriptor = self.load_descriptor()?;
        let index_path = self.contained(&descriptor.index.file)?;
        debug!("Loading index from {}", index_path.display());

        let index = Index::load(self.runtime, &index_path)?;
        if index.files.is_empty() {
            warn!("{} has no files indexed", index_path.display());
        }

        let index_dir = index_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        let mut tracked = Vec::with_capacity(index.files.len());
        for entry in index.files {
            let path = index_dir.join(&entry.file);
            if !is_path_under(&path, &self.root) {
                warn!(
                    "{}",
                    Error::PathEscapesRoot {
                        path: path.clone(),
                        root: self.root.clone()
                    }
                );
                continue;
            }
            tracked.push(TrackedFile {
                entry,
                path: normalize_path(&path),
            });
        }

        Ok(tracked)
    }

    fn contained(&self, relative: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if !is_path_under(&path, &self.root) {
            return Err(Error::PathEscapesRoot {
                path,
                root: self.root.clone(),
            }
            .into());
        }
        Ok(normalize_path(&path))
    }

    pub fn load_metadata(&self, path: &Path) -> Result<ModMetadata> {
        ModMetadata::load(self.runtime, path)
    }

    /// Rewrite a metadata record in one write.
    pub fn save_metadata(&self, path: &Path, metadata: &ModMetadata) -> Result<()> {
        let content = metadata.to_toml_string()?;
        self.runtime
            .write(path, content.as_bytes())
            .with_context(|| format!("Failed to save metadata to {}", path.display()))
    }

    /// Create a new metadata record, refusing to replace an existing file.
    pub fn create_metadata(&self, path: &Path, metadata: &ModMetadata) -> Result<()> {
        if self.runtime.exists(path) {
            anyhow::bail!("{} already exists", path.display());
        }
        self.save_metadata(path, metadata)
    }

    pub fn remove_file(&self, path: &Path) -> Result<()> {
        self.runtime.remove_file(path)
    }
}
