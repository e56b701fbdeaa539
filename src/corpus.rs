//! Loading a search directory into memory.
//!
//! A corpus is the parsed form of one search directory: the master index
//! (when present) and every shard file whose name matches the
//! `<section>_<bucket>.js` convention. Shards parse on blocking threads so
//! a large directory does not stall the runtime.

use crate::error::LoadError;
use crate::parse::parse_shard;
use crate::record::{SearchRecord, Shard};
use crate::sections::{MasterIndex, Section, parse_master};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;

/// One shard file on disk.
#[derive(Debug, Clone)]
pub struct ShardFile {
    pub path: PathBuf,
    pub file_name: String,
    pub section: Section,
    /// Bucket token from the file name (`a`, `7e`, ...).
    pub bucket: String,
    pub shard: Shard,
}

/// An entire search directory: master index plus every recognized shard.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub root: PathBuf,
    pub master: Option<MasterIndex>,
    /// Shards sorted by file name for deterministic iteration.
    pub shards: Vec<ShardFile>,
}

impl Corpus {
    /// Reads and parses a search directory.
    ///
    /// Files that are not shards (the UI script, unknown sections) are
    /// skipped; a shard that fails to parse fails the whole load, with the
    /// offending file named in the error chain.
    pub async fn load(dir: &Path) -> Result<Self> {
        let root = dir.to_path_buf();

        let paths = {
            let dir = root.clone();
            tokio::task::spawn_blocking(move || collect_js_files(&dir))
                .await
                .context("directory scan task panicked")??
        };

        let master_path = root.join(MasterIndex::FILE_NAME);
        let master = match tokio::fs::read_to_string(&master_path).await {
            Ok(text) => Some(parse_master(&text).with_context(|| {
                format!("failed to parse master index {}", master_path.display())
            })?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", master_path.display()));
            }
        };

        let mut tasks = JoinSet::new();
        for path in paths {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some((section, bucket)) = shard_name_parts(file_name) else {
                tracing::debug!("Skipping non-shard file {}", file_name);
                continue;
            };
            let file_name = file_name.to_string();
            tasks.spawn_blocking(move || -> Result<ShardFile> {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let shard = parse_shard(&text).map_err(|e| LoadError::ParseError {
                    path: path.clone(),
                    error: e.to_string(),
                })?;
                Ok(ShardFile {
                    path,
                    file_name,
                    section,
                    bucket,
                    shard,
                })
            });
        }

        let mut shards = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            shards.push(joined.context("shard parse task panicked")??);
        }
        shards.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        tracing::info!(
            "Loaded {} shards ({} records) from {}",
            shards.len(),
            shards.iter().map(|s| s.shard.records.len()).sum::<usize>(),
            root.display()
        );

        Ok(Self {
            root,
            master,
            shards,
        })
    }

    /// All records of one section, in shard order.
    pub fn section_records(&self, section: Section) -> impl Iterator<Item = &SearchRecord> {
        self.shards
            .iter()
            .filter(move |s| s.section == section)
            .flat_map(|s| s.shard.records.iter())
    }

    pub fn record_count(&self) -> usize {
        self.shards.iter().map(|s| s.shard.records.len()).sum()
    }
}

/// Splits `all_a.js` into its section and bucket token.
pub(crate) fn shard_name_parts(file_name: &str) -> Option<(Section, String)> {
    let stem = file_name.strip_suffix(".js")?;
    let (id, token) = stem.split_once('_')?;
    let section = Section::from_id(id)?;
    if token.is_empty() {
        return None;
    }
    Some((section, token.to_string()))
}

fn collect_js_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LoadError::NotFound {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let mut out = Vec::new();
    for entry in WalkBuilder::new(dir).max_depth(Some(1)).build() {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("js") {
            out.push(path.to_path_buf());
        }
    }
    out.sort();
    Ok(out)
}
