//! Match Resolver.
//!
//! Turns catalog answers into [`MatchResult`]s, each tied to exactly one
//! local path from the phase's [`FingerprintIndex`](crate::digest::FingerprintIndex).

mod curseforge;
mod modrinth;
mod side;

use std::path::PathBuf;

use crate::pack::ModMetadata;

pub use curseforge::resolve_curseforge;
pub use modrinth::{ModrinthMatch, VersionMatch, match_versions, project_ids, resolve_projects};
pub use side::infer_side;

/// A remote record resolved to one local file, projected into the
/// metadata it implies.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub path: PathBuf,
    pub metadata: ModMetadata,
}
