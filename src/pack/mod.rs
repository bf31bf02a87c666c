//! Pack data model: the pack descriptor, its index, and per-file metadata
//! records, plus the repository that reads and rewrites them.

mod descriptor;
mod index;
mod metadata;
mod repository;
mod state;

pub use descriptor::{IndexRef, PackDescriptor, Versions};
pub use index::{Index, IndexEntry};
pub use metadata::{
    CurseForgeSource, Download, HashFormat, ModMetadata, ModOption, ModrinthSource,
    PROVISIONAL_MODE, Side, Update,
};
pub use repository::{PackRepository, TrackedFile};
pub use state::EntryState;
