//! Content digests for cache invalidation.
//!
//! A search directory's digest covers the relative name and contents of
//! every shard-bearing `.js` file, walked in sorted order so the value is
//! deterministic across platforms and directory iteration orders. The term
//! index cache stores the digest it was built from; a mismatch on load
//! triggers a rebuild.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

/// Digests every `.js` file directly under `dir`.
pub fn digest_directory(dir: &Path) -> Result<u64> {
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());

    let mut files: Vec<_> = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .build()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("js"))
        .collect();
    files.sort();

    let mut hasher = Xxh3::new();
    for path in files {
        // Relative names keep the digest stable when the tree moves.
        if let Ok(rel) = path.strip_prefix(dir) {
            hasher.update(rel.to_string_lossy().as_bytes());
            hasher.update(&[0]);
        }
        let content = std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        hasher.update(&content);
        hasher.update(&[0]);
    }

    Ok(hasher.digest())
}
