use super::{IndexEntry, ModMetadata};

/// Where a tracked file is in its conversion lifecycle, derived from disk.
///
/// `Unresolved` → `Detected` → `UrlCached` → `CrossLinked`. A later run
/// re-derives the state, so nothing needs to be checkpointed in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    /// A raw file stored in the pack.
    Unresolved,
    /// A metadata record still waiting for its direct URL.
    Detected,
    /// A metadata record with a direct URL and a single update source.
    UrlCached,
    /// Linked to both catalogs with a cached URL; terminal.
    CrossLinked,
}

impl EntryState {
    /// `record` is the parsed metadata for metafile entries and ignored otherwise.
    pub fn of(entry: &IndexEntry, record: Option<&ModMetadata>) -> Self {
        if !entry.metafile {
            return EntryState::Unresolved;
        }
        match record {
            Some(meta) if meta.is_fully_resolved() => EntryState::CrossLinked,
            Some(meta) if meta.is_provisional() => EntryState::Detected,
            _ => EntryState::UrlCached,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EntryState::CrossLinked)
    }
}
