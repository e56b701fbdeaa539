//! Persisted term-index cache.
//!
//! Building the term index walks every record in the corpus, so the result
//! is stored beside the shards and reused while the directory's content
//! digest is unchanged. The cache file is a postcard envelope of digest plus
//! index; a digest mismatch deletes the stale file and rebuilds.

use crate::corpus::Corpus;
use crate::digest::digest_directory;
use crate::error::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::terms::TermIndex;

/// Cache file name, stored inside the search directory.
pub const CACHE_FILE: &str = "terms.idx";

#[derive(Serialize, Deserialize)]
struct Envelope {
    digest: u64,
    index: TermIndex,
}

/// Loads the cached term index for a corpus, or builds and stores it.
pub async fn load_or_build(corpus: &Corpus) -> Result<TermIndex> {
    let path = corpus.root.join(CACHE_FILE);

    let digest = {
        let root = corpus.root.clone();
        tokio::task::spawn_blocking(move || digest_directory(&root))
            .await
            .context("digest task panicked")??
    };

    if let Some(index) = load(&path, digest).await {
        tracing::debug!(
            "Loaded cached term index ({} terms, {} documents)",
            index.term_count(),
            index.document_count()
        );
        return Ok(index);
    }

    let start = std::time::Instant::now();
    let index = TermIndex::build(corpus);
    tracing::debug!("Term index built in {:?}", start.elapsed());

    store(&path, digest, &index).await;
    Ok(index)
}

/// Loads a cache file whose stored digest matches `digest`.
async fn load(path: &Path, digest: u64) -> Option<TermIndex> {
    if tokio::fs::metadata(path).await.is_err() {
        return None;
    }

    let path_buf = path.to_path_buf();
    // Deserialize off the runtime; the envelope can be large.
    let envelope = tokio::task::spawn_blocking(move || -> Option<Envelope> {
        let bytes = std::fs::read(&path_buf).ok()?;
        match postcard::from_bytes(&bytes) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                tracing::warn!("Failed to deserialize term cache {}: {}", path_buf.display(), e);
                None
            }
        }
    })
    .await
    .ok()??;

    if envelope.digest == digest {
        Some(envelope.index)
    } else {
        tracing::info!(
            "Term cache stale, rebuilding (file: {})",
            path.display()
        );
        let _ = tokio::fs::remove_file(path).await;
        None
    }
}

/// Stores the index; failures are logged, never fatal.
async fn store(path: &Path, digest: u64, index: &TermIndex) {
    let path: PathBuf = path.to_path_buf();
    let envelope = Envelope {
        digest,
        index: index.clone(),
    };

    let outcome = tokio::task::spawn_blocking(move || {
        let bytes = postcard::to_stdvec(&envelope)?;
        std::fs::write(&path, bytes)?;
        Ok::<PathBuf, anyhow::Error>(path)
    })
    .await;

    match outcome {
        Ok(Ok(path)) => tracing::debug!("Cached term index to {}", path.display()),
        Ok(Err(e)) => tracing::warn!("Failed to write term cache: {}", e),
        Err(e) => tracing::warn!("Term cache task panicked: {}", e),
    }
}
