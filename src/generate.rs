//! Generating a search directory from a symbol table.
//!
//! Input is a flat JSON array of documented symbols. Symbols fan out into
//! their category section plus `all`, land in first-character buckets, and
//! identical labels within a shard merge their references into one record.
//! Output is deterministic for identical input: shards sort records by
//! mangled stem, keys get ordinal suffixes in final array order, and the
//! master index lists sections in their fixed order.

use crate::config::GenerateConfig;
use crate::corpus::shard_name_parts;
use crate::emit::emit_shard;
use crate::escape;
use crate::record::{FragmentUrl, SearchRecord, SearchRef, Shard};
use crate::sections::{MasterIndex, MasterSection, Section, emit_master};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Symbol categories accepted in the input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Class,
    Struct,
    Namespace,
    File,
    Function,
    Variable,
    Typedef,
    Enum,
    EnumValue,
    Friend,
    Define,
    Group,
    Page,
}

impl SymbolKind {
    /// Section a kind's symbols are listed under, besides `all`.
    fn section(self) -> Section {
        match self {
            Self::Class | Self::Struct => Section::Classes,
            Self::Namespace => Section::Namespaces,
            Self::File => Section::Files,
            Self::Function => Section::Functions,
            Self::Variable => Section::Variables,
            Self::Typedef => Section::Typedefs,
            Self::Enum => Section::Enums,
            Self::EnumValue => Section::EnumValues,
            Self::Friend => Section::Related,
            Self::Define => Section::Defines,
            Self::Group => Section::Groups,
            Self::Page => Section::Pages,
        }
    }
}

/// One documented symbol from the input table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Display name, e.g. `accept_stat`.
    pub name: String,
    pub kind: SymbolKind,
    /// Label of the containing scope, empty for file-level symbols.
    #[serde(default)]
    pub scope: String,
    /// Page the symbol is documented on.
    pub page: String,
    /// In-page anchor of the symbol.
    pub anchor: String,
}

/// The complete output of one generation run, keyed by file name.
#[derive(Debug, Clone)]
pub struct SearchTree {
    pub shards: BTreeMap<String, Shard>,
    pub master: MasterIndex,
}

impl SearchTree {
    pub fn record_count(&self) -> usize {
        self.shards.values().map(|s| s.records.len()).sum()
    }
}

/// Reads the JSON symbol table.
pub fn read_symbols(path: &Path) -> Result<Vec<Symbol>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read symbol table {}", path.display()))?;
    let symbols: Vec<Symbol> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse symbol table {}", path.display()))?;
    tracing::info!("Read {} symbols from {}", symbols.len(), path.display());
    Ok(symbols)
}

/// Builds every shard and the master index from a symbol table.
pub fn build_tree(symbols: &[Symbol], config: &GenerateConfig) -> Result<SearchTree> {
    // (section, bucket) -> label -> refs in input order
    type Buckets = BTreeMap<(Section, char), BTreeMap<String, Vec<SearchRef>>>;
    let mut buckets: Buckets = BTreeMap::new();

    for (position, symbol) in symbols.iter().enumerate() {
        anyhow::ensure!(
            !symbol.name.is_empty(),
            "symbol {} has an empty name",
            position
        );

        let stem = escape::encode_stem(&symbol.name);
        let key = escape::bucket_key(&stem)
            .with_context(|| format!("symbol '{}' has no bucket character", symbol.name))?;

        for section in [Section::All, symbol.kind.section()] {
            if !section_enabled(section, config) {
                continue;
            }
            buckets
                .entry((section, key))
                .or_default()
                .entry(symbol.name.clone())
                .or_default()
                .push(SearchRef::new(
                    FragmentUrl::new(symbol.page.clone(), symbol.anchor.clone()),
                    symbol.scope.clone(),
                ));
        }
    }

    let mut shards = BTreeMap::new();
    let mut contents: BTreeMap<Section, Vec<char>> = BTreeMap::new();

    for ((section, key), labels) in buckets {
        // Records sort by (stem, label); insertion order only orders refs
        // inside a record, so output is stable for identical input.
        let mut entries: Vec<(String, Vec<SearchRef>)> = labels.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| {
            escape::encode_stem(a)
                .cmp(&escape::encode_stem(b))
                .then_with(|| a.cmp(b))
        });

        let records = entries
            .into_iter()
            .enumerate()
            .map(|(index, (label, refs))| SearchRecord {
                key: escape::encode_key(&label, index),
                label,
                refs,
            })
            .collect();

        let file_name = format!("{}_{}.js", section.id(), escape::bucket_token(key));
        shards.insert(
            file_name,
            Shard {
                variable: config.variable.clone(),
                records,
            },
        );
        contents.entry(section).or_default().push(key);
    }

    let sections = Section::ALL
        .into_iter()
        .filter_map(|section| {
            let keys = contents.get(&section)?;
            Some(MasterSection {
                id: section.id().to_string(),
                label: section.label().to_string(),
                contents: keys.iter().collect(),
            })
        })
        .collect();

    Ok(SearchTree {
        shards,
        master: MasterIndex { sections },
    })
}

/// Writes a tree into `out_dir`, replacing previous output wholesale.
///
/// Stale shard files from an earlier run that no current shard replaces are
/// deleted, so the directory always reflects exactly one build.
pub async fn write_tree(tree: &SearchTree, out_dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    remove_stale(tree, out_dir).await?;

    for (file_name, shard) in &tree.shards {
        let path = out_dir.join(file_name);
        tokio::fs::write(&path, emit_shard(shard))
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let master_path = out_dir.join(MasterIndex::FILE_NAME);
    tokio::fs::write(&master_path, emit_master(&tree.master))
        .await
        .with_context(|| format!("failed to write {}", master_path.display()))?;

    tracing::info!(
        "Wrote {} shards ({} records) to {}",
        tree.shards.len(),
        tree.record_count(),
        out_dir.display()
    );
    Ok(())
}

async fn remove_stale(tree: &SearchTree, out_dir: &Path) -> Result<()> {
    let mut entries = tokio::fs::read_dir(out_dir)
        .await
        .with_context(|| format!("failed to scan {}", out_dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_shard = shard_name_parts(&name).is_some();
        if is_shard && !tree.shards.contains_key(&name) {
            tracing::debug!("Removing stale shard {}", name);
            tokio::fs::remove_file(entry.path())
                .await
                .with_context(|| format!("failed to remove stale shard {}", name))?;
        }
    }
    Ok(())
}

fn section_enabled(section: Section, config: &GenerateConfig) -> bool {
    // `all` always stays: it is the UI's default search scope.
    if section == Section::All {
        return true;
    }
    match &config.sections {
        Some(enabled) => enabled.contains(&section),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    fn symbol(name: &str, kind: SymbolKind, scope: &str, page: &str, anchor: &str) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            scope: scope.to_string(),
            page: page.to_string(),
            anchor: anchor.to_string(),
        }
    }

    fn sample_symbols() -> Vec<Symbol> {
        vec![
            symbol(
                "abs",
                SymbolKind::Function,
                "stan::agrad",
                "namespacestan_1_1agrad.html",
                "a01",
            ),
            symbol(
                "abs",
                SymbolKind::Function,
                "stan::math",
                "namespacestan_1_1math.html",
                "a02",
            ),
            symbol(
                "chains",
                SymbolKind::Class,
                "stan::mcmc",
                "classstan_1_1mcmc_1_1chains.html",
                "a03",
            ),
            symbol(
                "accept_stat",
                SymbolKind::Variable,
                "stan::mcmc::sample",
                "classstan_1_1mcmc_1_1sample.html",
                "a04",
            ),
        ]
    }

    #[test]
    fn test_shard_file_names() {
        let tree = build_tree(&sample_symbols(), &GenerateConfig::default()).unwrap();
        let names: Vec<&str> = tree.shards.keys().map(String::as_str).collect();
        check!(
            names
                == vec![
                    "all_a.js",
                    "all_c.js",
                    "classes_c.js",
                    "functions_a.js",
                    "variables_a.js"
                ]
        );
    }

    #[test]
    fn test_same_label_merges_refs_in_input_order() {
        let tree = build_tree(&sample_symbols(), &GenerateConfig::default()).unwrap();
        let shard = &tree.shards["all_a.js"];

        let abs = shard.records.iter().find(|r| r.label == "abs").unwrap();
        check!(abs.refs.len() == 2);
        check!(abs.refs[0].scope == "stan::agrad");
        check!(abs.refs[1].scope == "stan::math");
    }

    #[test]
    fn test_keys_follow_array_order() {
        let tree = build_tree(&sample_symbols(), &GenerateConfig::default()).unwrap();
        let shard = &tree.shards["all_a.js"];

        // Sorted by stem: abs before accept_stat.
        check!(shard.records[0].key == "abs_0");
        check!(shard.records[1].key == "accept_5fstat_1");
    }

    #[test]
    fn test_master_lists_sections_in_fixed_order() {
        let tree = build_tree(&sample_symbols(), &GenerateConfig::default()).unwrap();
        let ids: Vec<&str> = tree.master.sections.iter().map(|s| s.id.as_str()).collect();
        check!(ids == vec!["all", "classes", "functions", "variables"]);
        check!(tree.master.sections[0].contents == "ac");
    }

    #[test]
    fn test_section_subset_keeps_all() {
        let config = GenerateConfig {
            sections: Some(vec![Section::Classes]),
            ..GenerateConfig::default()
        };
        let tree = build_tree(&sample_symbols(), &config).unwrap();
        let names: Vec<&str> = tree.shards.keys().map(String::as_str).collect();
        check!(names == vec!["all_a.js", "all_c.js", "classes_c.js"]);
    }

    #[test]
    fn test_destructor_bucket_uses_hex_token() {
        let symbols = vec![symbol(
            "~chains",
            SymbolKind::Function,
            "stan::mcmc::chains",
            "classstan_1_1mcmc_1_1chains.html",
            "a05",
        )];
        let tree = build_tree(&symbols, &GenerateConfig::default()).unwrap();
        check!(tree.shards.contains_key("all_7e.js"));
        check!(tree.shards.contains_key("functions_7e.js"));
        let_assert!(Some(row) = tree.master.get(Section::All));
        check!(row.contents == "~");
    }

    #[test]
    fn test_empty_name_rejected() {
        let symbols = vec![symbol("", SymbolKind::Function, "", "p.html", "a")];
        let_assert!(Err(_) = build_tree(&symbols, &GenerateConfig::default()));
    }

    #[test]
    fn test_generated_tree_passes_checks() {
        let tree = build_tree(&sample_symbols(), &GenerateConfig::default()).unwrap();
        for shard in tree.shards.values() {
            check!(crate::validate::check_shard(shard).is_empty());
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_write_tree_removes_stale_shards() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("typedefs_z.js"),
            "var searchData=\n[\n];\n",
        )
        .unwrap();

        let tree = build_tree(&sample_symbols(), &GenerateConfig::default()).unwrap();
        write_tree(&tree, dir.path()).await.unwrap();

        check!(!dir.path().join("typedefs_z.js").exists());
        check!(dir.path().join("all_a.js").exists());
        check!(dir.path().join("searchdata.js").exists());
    }
}
