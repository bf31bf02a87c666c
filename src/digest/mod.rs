//! Digest Engine.
//!
//! Reads every raw file of the pack on a bounded pool of blocking workers and
//! builds a [`FingerprintIndex`] for one phase. The stage returns only after
//! every scheduled read+hash has finished; any read failure aborts it.

mod murmur2;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use futures_util::stream;
use log::debug;
use sha1::{Digest as _, Sha1};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;

use crate::pack::TrackedFile;
use crate::runtime::Runtime;

pub use murmur2::{fingerprint, murmur2, normalize};

/// Files below this size are never submitted to a catalog.
pub const DEFAULT_MIN_SIZE: u64 = 4096;

/// A content digest understood by one of the catalogs.
pub trait DigestKind: Send + Sync + 'static {
    type Output: Eq + Hash + Clone + Debug + Send + 'static;

    /// Label used in log lines.
    const NAME: &'static str;

    /// `None` excludes the file from the batch.
    fn digest(content: &[u8]) -> Option<Self::Output>;
}

/// CurseForge's whitespace-normalized MurmurHash2 fingerprint.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprint;

impl DigestKind for Fingerprint {
    type Output = u32;
    const NAME: &'static str = "fingerprint";

    fn digest(content: &[u8]) -> Option<u32> {
        let normalized = normalize(content);
        // Whitespace-only content collapses onto the empty-input fingerprint.
        if normalized.is_empty() {
            return None;
        }
        Some(murmur2(&normalized, 1))
    }
}

/// Lowercase hex SHA-1, as used by Modrinth.
#[derive(Debug, Clone, Copy)]
pub struct Sha1Hex;

impl DigestKind for Sha1Hex {
    type Output = String;
    const NAME: &'static str = "sha1";

    fn digest(content: &[u8]) -> Option<String> {
        Some(hex::encode(Sha1::digest(content)))
    }
}

/// Digest → originating file, rebuilt for each phase.
///
/// Two files with the same digest collide: the one inserted last wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintIndex<K: Eq + Hash> {
    entries: HashMap<K, PathBuf>,
}

impl<K: Eq + Hash> Default for FingerprintIndex<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FingerprintIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, digest: K, path: PathBuf) -> Option<PathBuf> {
        self.entries.insert(digest, path)
    }

    pub fn get(&self, digest: &K) -> Option<&PathBuf> {
        self.entries.get(digest)
    }

    pub fn contains(&self, digest: &K) -> bool {
        self.entries.contains_key(digest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every digest, in no particular order.
    pub fn digests(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &PathBuf)> {
        self.entries.iter()
    }
}

impl<K: Eq + Hash> FromIterator<(K, PathBuf)> for FingerprintIndex<K> {
    fn from_iter<I: IntoIterator<Item = (K, PathBuf)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Worker pool that digests raw pack files.
pub struct DigestEngine<R: Runtime> {
    runtime: Arc<R>,
    min_size: u64,
    workers: usize,
}

impl<R: Runtime + 'static> DigestEngine<R> {
    /// `workers` of `None` uses the runtime's available parallelism.
    pub fn new(runtime: Arc<R>, min_size: u64, workers: Option<usize>) -> Self {
        let workers = workers.unwrap_or_else(|| runtime.available_parallelism()).max(1);
        Self {
            runtime,
            min_size,
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Digest every non-metafile entry and index the results.
    #[tracing::instrument(skip(self, files), fields(kind = K::NAME))]
    pub async fn index<K: DigestKind>(
        &self,
        files: &[TrackedFile],
    ) -> Result<FingerprintIndex<K::Output>> {
        let raw: Vec<PathBuf> = files
            .iter()
            .filter(|file| !file.is_metafile())
            .map(|file| file.path.clone())
            .collect();
        debug!(
            "Digesting {} files ({}) on {} workers",
            raw.len(),
            K::NAME,
            self.workers
        );

        let min_size = self.min_size;
        let mut tasks = stream::iter(raw)
            .map(|path| {
                let runtime = Arc::clone(&self.runtime);
                tokio::task::spawn_blocking(move || digest_file::<K, R>(&*runtime, path, min_size))
            })
            .buffer_unordered(self.workers);

        let mut index = FingerprintIndex::new();
        let mut excluded = 0usize;
        while let Some(joined) = tasks.next().await {
            match joined.context("Digest worker panicked")?? {
                Some((digest, path)) => {
                    index.insert(digest, path);
                }
                None => excluded += 1,
            }
        }

        debug!(
            "Indexed {} {} digests, excluded {} files",
            index.len(),
            K::NAME,
            excluded
        );
        Ok(index)
    }
}

fn digest_file<K: DigestKind, R: Runtime>(
    runtime: &R,
    path: PathBuf,
    min_size: u64,
) -> Result<Option<(K::Output, PathBuf)>> {
    let content = runtime
        .read(&path)
        .with_context(|| format!("Failed to digest {}", path.display()))?;
    if (content.len() as u64) < min_size {
        return Ok(None);
    }
    Ok(K::digest(&content).map(|digest| (digest, path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::IndexEntry;
    use crate::runtime::MockRuntime;
    use std::path::Path;

    fn tracked(path: &str, metafile: bool) -> TrackedFile {
        TrackedFile {
            entry: IndexEntry {
                file: path.trim_start_matches("/pack/").to_string(),
                hash: String::new(),
                alias: None,
                hash_format: None,
                metafile,
                preserve: false,
            },
            path: PathBuf::from(path),
        }
    }

    fn content_of(path: &Path) -> Vec<u8> {
        match path.to_str().unwrap() {
            "/pack/mods/big.jar" => vec![b'x'; 50 * 1024],
            "/pack/mods/other.jar" => vec![b'y'; 8192],
            "/pack/config/tiny.cfg" => b"0123456789".to_vec(),
            "/pack/mods/blank.jar" => vec![b' '; 8192],
            other => panic!("unexpected read of {}", other),
        }
    }

    #[test]
    fn test_sha1_hex() {
        assert_eq!(
            Sha1Hex::digest(b"abc").unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_fingerprint_excludes_whitespace_only_content() {
        assert_eq!(Fingerprint::digest(b" \n\t\r"), None);
        assert_eq!(Fingerprint::digest(b"abc"), Some(1621425345));
    }

    #[test]
    fn test_index_keeps_last_insert_on_collision() {
        let mut index = FingerprintIndex::new();
        assert_eq!(index.insert(7u32, PathBuf::from("a.jar")), None);
        assert_eq!(
            index.insert(7u32, PathBuf::from("b.jar")),
            Some(PathBuf::from("a.jar"))
        );
        assert_eq!(index.get(&7), Some(&PathBuf::from("b.jar")));
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_small_files_and_metafiles_never_indexed() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read().returning(|p| Ok(content_of(p)));

        let engine = DigestEngine::new(Arc::new(runtime), DEFAULT_MIN_SIZE, Some(2));
        let files = vec![
            tracked("/pack/mods/big.jar", false),
            tracked("/pack/config/tiny.cfg", false),
            tracked("/pack/mods/sodium.pw.toml", true),
        ];

        let index = engine.index::<Sha1Hex>(&files).await.unwrap();

        assert_eq!(index.len(), 1);
        let (_, path) = index.iter().next().unwrap();
        assert_eq!(path, &PathBuf::from("/pack/mods/big.jar"));
    }

    #[tokio::test]
    async fn test_fingerprint_index_skips_blank_content() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read().returning(|p| Ok(content_of(p)));

        let engine = DigestEngine::new(Arc::new(runtime), DEFAULT_MIN_SIZE, Some(4));
        let files = vec![
            tracked("/pack/mods/big.jar", false),
            tracked("/pack/mods/other.jar", false),
            tracked("/pack/mods/blank.jar", false),
        ];

        let index = engine.index::<Fingerprint>(&files).await.unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get(&fingerprint(&vec![b'x'; 50 * 1024])),
            Some(&PathBuf::from("/pack/mods/big.jar"))
        );
        assert!(!index.iter().any(|(_, p)| p.ends_with("blank.jar")));
    }

    #[tokio::test]
    async fn test_read_failure_is_fatal() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read().returning(|p| {
            if p.ends_with("other.jar") {
                anyhow::bail!("permission denied")
            }
            Ok(content_of(p))
        });

        let engine = DigestEngine::new(Arc::new(runtime), DEFAULT_MIN_SIZE, Some(1));
        let files = vec![
            tracked("/pack/mods/big.jar", false),
            tracked("/pack/mods/other.jar", false),
        ];

        let err = engine.index::<Sha1Hex>(&files).await.unwrap_err();
        assert!(format!("{:#}", err).contains("other.jar"));
    }

    #[test]
    fn test_workers_default_to_parallelism() {
        let mut runtime = MockRuntime::new();
        runtime.expect_available_parallelism().returning(|| 6);
        let engine = DigestEngine::new(Arc::new(runtime), DEFAULT_MIN_SIZE, None);
        assert_eq!(engine.workers(), 6);

        let mut runtime = MockRuntime::new();
        runtime.expect_available_parallelism().never();
        let engine = DigestEngine::new(Arc::new(runtime), DEFAULT_MIN_SIZE, Some(0));
        assert_eq!(engine.workers(), 1);
    }
}
