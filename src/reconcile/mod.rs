//! Metadata Reconciler.
//!
//! Each mode derives its input from what is on disk right now (see
//! [`EntryState`]), so a run that stopped halfway is picked up by the next
//! one and settled records are never looked up again.

mod detect;
mod merge;
mod url_cache;

use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::coordinator::Coordinator;
use crate::digest::DigestEngine;
use crate::pack::{EntryState, ModMetadata, PackRepository, TrackedFile};
use crate::runtime::Runtime;

#[cfg(test)]
mod testing;

pub struct Reconciler<'a, R: Runtime + 'static> {
    repo: &'a PackRepository<'a, R>,
    engine: &'a DigestEngine<R>,
    coordinator: &'a Coordinator<'a, R>,
}

impl<'a, R: Runtime + 'static> Reconciler<'a, R> {
    pub fn new(
        repo: &'a PackRepository<'a, R>,
        engine: &'a DigestEngine<R>,
        coordinator: &'a Coordinator<'a, R>,
    ) -> Self {
        Self {
            repo,
            engine,
            coordinator,
        }
    }

    /// Raw files of the pack.
    fn raw_files(&self) -> Result<Vec<TrackedFile>> {
        Ok(self
            .repo
            .tracked_files()?
            .into_iter()
            .filter(|file| EntryState::of(&file.entry, None) == EntryState::Unresolved)
            .collect())
    }

    /// Metadata records currently in one of `states`.
    fn records_in(&self, states: &[EntryState]) -> Result<Vec<(PathBuf, ModMetadata)>> {
        let mut records = Vec::new();
        for file in self.repo.tracked_files()? {
            if !file.is_metafile() {
                continue;
            }
            let metadata = self.repo.load_metadata(&file.path)?;
            let state = EntryState::of(&file.entry, Some(&metadata));
            if state.is_terminal() {
                debug!("{} is fully resolved", file.path.display());
            } else if states.contains(&state) {
                records.push((file.path, metadata));
            }
        }
        Ok(records)
    }
}
